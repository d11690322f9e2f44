use thiserror::Error;

use super::scene::Vec2;

/// Tilemap origin convention:
/// - `origin` is the world position of the top-left corner of tile (0,0).
/// - World y grows downward, so tile row `y + 1` lies below row `y`.
/// - Tile (x,y) covers `origin + (x, y) * tile_size` up to, but excluding,
///   `origin + (x + 1, y + 1) * tile_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    origin: Vec2,
    tile_size: Vec2,
    tiles: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("tile size must be finite and positive, got {width}x{height}")]
    InvalidTileSize { width: f32, height: f32 },
}

impl Tilemap {
    pub fn new(
        width: u32,
        height: u32,
        origin: Vec2,
        tile_size: Vec2,
        tiles: Vec<u16>,
    ) -> Result<Self, TilemapError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        let valid_size = tile_size.is_finite() && tile_size.x > 0.0 && tile_size.y > 0.0;
        if !valid_size {
            return Err(TilemapError::InvalidTileSize {
                width: tile_size.x,
                height: tile_size.y,
            });
        }
        Ok(Self {
            width,
            height,
            origin,
            tile_size,
            tiles,
        })
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * self.tile_size.x,
            self.height as f32 * self.tile_size.y,
        )
    }

    fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<u16> {
        self.index_of(x, y)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub fn is_within_world_bounds(&self, point: Vec2) -> bool {
        if !point.is_finite() {
            return false;
        }
        let local = point - self.origin;
        let size = self.world_size();
        local.x >= 0.0 && local.y >= 0.0 && local.x < size.x && local.y < size.y
    }

    pub fn world_to_tile(&self, point: Vec2) -> Option<(u32, u32)> {
        if !self.is_within_world_bounds(point) {
            return None;
        }
        let local = point - self.origin;
        let x = (local.x / self.tile_size.x).floor() as u32;
        let y = (local.y / self.tile_size.y).floor() as u32;
        // Float rounding right at the far edge can land one past the last tile.
        Some((x.min(self.width - 1), y.min(self.height - 1)))
    }

    pub fn world_tile(&self, point: Vec2) -> Option<u16> {
        let (x, y) = self.world_to_tile(point)?;
        self.tile_at(x, y)
    }
}
