use engine::{Tilemap, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct TileId(pub u16);

impl TileId {
    #[allow(dead_code)]
    pub(crate) const EMPTY: TileId = TileId(0);
    pub(crate) const DIRT_TOP_LEFT: TileId = TileId(1);
    pub(crate) const DIRT_TOP: TileId = TileId(2);
    pub(crate) const DIRT_TOP_RIGHT: TileId = TileId(3);
    pub(crate) const DIRT_LEFT: TileId = TileId(4);
    pub(crate) const DIRT_CENTER: TileId = TileId(5);
    pub(crate) const DIRT_RIGHT: TileId = TileId(6);
    pub(crate) const DIRT_BOTTOM_LEFT: TileId = TileId(7);
    pub(crate) const DIRT_BOTTOM: TileId = TileId(8);
    pub(crate) const DIRT_BOTTOM_RIGHT: TileId = TileId(9);
    #[allow(dead_code)]
    pub(crate) const GRASS_DECORATION: TileId = TileId(10);
    pub(crate) const STONE_HORIZONTAL_LEFT: TileId = TileId(11);
    pub(crate) const STONE_HORIZONTAL_MIDDLE: TileId = TileId(12);
    pub(crate) const STONE_HORIZONTAL_RIGHT: TileId = TileId(13);
    pub(crate) const STONE_VERTICAL_TOP: TileId = TileId(14);
    pub(crate) const STONE_VERTICAL_MIDDLE: TileId = TileId(15);
    pub(crate) const STONE_VERTICAL_BOTTOM: TileId = TileId(16);
    #[allow(dead_code)]
    pub(crate) const BUSH_DECORATION: TileId = TileId(17);
    pub(crate) const PLASTIC_BLOCK: TileId = TileId(18);
    #[allow(dead_code)]
    pub(crate) const CHECKPOINT_FLAG: TileId = TileId(19);
    pub(crate) const INVISIBLE_BARRIER: TileId = TileId(20);

    pub(crate) fn is_solid(self) -> bool {
        matches!(
            self,
            TileId::DIRT_TOP_LEFT
                | TileId::DIRT_TOP
                | TileId::DIRT_TOP_RIGHT
                | TileId::DIRT_LEFT
                | TileId::DIRT_CENTER
                | TileId::DIRT_RIGHT
                | TileId::DIRT_BOTTOM_LEFT
                | TileId::DIRT_BOTTOM
                | TileId::DIRT_BOTTOM_RIGHT
                | TileId::STONE_HORIZONTAL_LEFT
                | TileId::STONE_HORIZONTAL_MIDDLE
                | TileId::STONE_HORIZONTAL_RIGHT
                | TileId::STONE_VERTICAL_TOP
                | TileId::STONE_VERTICAL_MIDDLE
                | TileId::STONE_VERTICAL_BOTTOM
                | TileId::PLASTIC_BLOCK
                | TileId::INVISIBLE_BARRIER
        )
    }
}

/// Whether the tile under `position` blocks movement. Points outside the map
/// are not solid; callers bounds-check first.
pub(crate) fn does_collide(position: Vec2, tilemap: &Tilemap) -> bool {
    tilemap
        .world_tile(position)
        .is_some_and(|id| TileId(id).is_solid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_ground_block_is_solid() {
        let solid = [
            TileId::DIRT_TOP_LEFT,
            TileId::DIRT_TOP,
            TileId::DIRT_TOP_RIGHT,
            TileId::DIRT_LEFT,
            TileId::DIRT_CENTER,
            TileId::DIRT_RIGHT,
            TileId::DIRT_BOTTOM_LEFT,
            TileId::DIRT_BOTTOM,
            TileId::DIRT_BOTTOM_RIGHT,
            TileId::STONE_HORIZONTAL_LEFT,
            TileId::STONE_HORIZONTAL_MIDDLE,
            TileId::STONE_HORIZONTAL_RIGHT,
            TileId::STONE_VERTICAL_TOP,
            TileId::STONE_VERTICAL_MIDDLE,
            TileId::STONE_VERTICAL_BOTTOM,
            TileId::PLASTIC_BLOCK,
            TileId::INVISIBLE_BARRIER,
        ];
        for id in solid {
            assert!(id.is_solid(), "id={id:?}");
        }
    }

    #[test]
    fn ids_adjacent_to_solid_ranges_are_not_solid() {
        for id in [
            TileId::EMPTY,
            TileId::GRASS_DECORATION,
            TileId::BUSH_DECORATION,
            TileId::CHECKPOINT_FLAG,
            TileId(21),
            TileId(u16::MAX),
        ] {
            assert!(!id.is_solid(), "id={id:?}");
        }
    }

    #[test]
    fn does_collide_looks_up_tile_under_point() {
        let tilemap = Tilemap::new(
            3,
            1,
            Vec2::ZERO,
            Vec2::new(32.0, 32.0),
            vec![
                TileId::EMPTY.0,
                TileId::STONE_VERTICAL_BOTTOM.0,
                TileId::BUSH_DECORATION.0,
            ],
        )
        .expect("tilemap");

        assert!(!does_collide(Vec2::new(16.0, 16.0), &tilemap));
        assert!(does_collide(Vec2::new(32.0, 0.0), &tilemap));
        assert!(does_collide(Vec2::new(63.999, 31.999), &tilemap));
        assert!(!does_collide(Vec2::new(64.0, 16.0), &tilemap));
        assert!(!does_collide(Vec2::new(200.0, 16.0), &tilemap));
    }
}
