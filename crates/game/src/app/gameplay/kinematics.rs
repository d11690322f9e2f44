use engine::{Tilemap, Vec2};

use super::tile_id::does_collide;

pub(crate) const GRAVITY_PER_TICK: f32 = 1.0;

/// Corner samples are pulled this far inside the box so that an edge lying
/// exactly on a tile boundary does not register the neighbouring tile.
const EDGE_INSET: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TileMove {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) hit_left_wall: bool,
    pub(crate) hit_right_wall: bool,
    pub(crate) hit_ceiling: bool,
    pub(crate) is_on_ground: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum MoveOutcome {
    Moved(TileMove),
    /// A corner sample left the map. Nothing was resolved.
    LeftWorld,
}

/// Moves a box centred at `old_pos` by `velocity` against the solid tiles of
/// `tilemap`, resolving x before y.
///
/// Horizontal corners are sampled at the new x and the old y; vertical
/// corners use the corrected x and the new y. Each blocked axis snaps the
/// box flush to the tile face it ran into and zeroes that velocity component.
pub(crate) fn resolve_tile_move(
    old_pos: Vec2,
    velocity: Vec2,
    half_size: Vec2,
    tilemap: &Tilemap,
) -> MoveOutcome {
    let tile = tilemap.tile_size();
    let origin = tilemap.origin();
    let inset = Vec2::new(half_size.x - EDGE_INSET, half_size.y - EDGE_INSET);

    let mut velocity = velocity;
    let mut new_pos = old_pos + velocity;
    let mut hit_left_wall = false;
    let mut hit_right_wall = false;
    let mut hit_ceiling = false;

    let top_left = Vec2::new(new_pos.x - inset.x, old_pos.y - inset.y);
    let bottom_left = Vec2::new(new_pos.x - inset.x, old_pos.y + inset.y);
    if !all_within_bounds(tilemap, [top_left, bottom_left]) {
        return MoveOutcome::LeftWorld;
    }
    if velocity.x < 0.0 && any_solid(tilemap, [top_left, bottom_left]) {
        new_pos.x = snap_to_next_line(top_left.x, origin.x, tile.x) + half_size.x;
        velocity.x = 0.0;
        hit_left_wall = true;
    }

    let top_right = Vec2::new(new_pos.x + inset.x, old_pos.y - inset.y);
    let bottom_right = Vec2::new(new_pos.x + inset.x, old_pos.y + inset.y);
    if !all_within_bounds(tilemap, [top_right, bottom_right]) {
        return MoveOutcome::LeftWorld;
    }
    if velocity.x > 0.0 && any_solid(tilemap, [top_right, bottom_right]) {
        new_pos.x = snap_to_previous_line(top_right.x, origin.x, tile.x) - half_size.x;
        velocity.x = 0.0;
        hit_right_wall = true;
    }

    let top_left = Vec2::new(new_pos.x - inset.x, new_pos.y - inset.y);
    let top_right = Vec2::new(new_pos.x + inset.x, new_pos.y - inset.y);
    if !all_within_bounds(tilemap, [top_left, top_right]) {
        return MoveOutcome::LeftWorld;
    }
    if velocity.y < 0.0 && any_solid(tilemap, [top_left, top_right]) {
        new_pos.y = snap_to_next_line(top_left.y, origin.y, tile.y) + half_size.y;
        velocity.y = 0.0;
        hit_ceiling = true;
    }

    let bottom_left = Vec2::new(new_pos.x - inset.x, new_pos.y + inset.y);
    let bottom_right = Vec2::new(new_pos.x + inset.x, new_pos.y + inset.y);
    if !all_within_bounds(tilemap, [bottom_left, bottom_right]) {
        return MoveOutcome::LeftWorld;
    }
    let is_on_ground = velocity.y > 0.0 && any_solid(tilemap, [bottom_left, bottom_right]);
    if is_on_ground {
        new_pos.y = snap_to_previous_line(bottom_left.y, origin.y, tile.y) - half_size.y;
        velocity.y = 0.0;
    }

    MoveOutcome::Moved(TileMove {
        position: new_pos,
        velocity,
        hit_left_wall,
        hit_right_wall,
        hit_ceiling,
        is_on_ground,
    })
}

fn all_within_bounds(tilemap: &Tilemap, samples: [Vec2; 2]) -> bool {
    samples
        .iter()
        .all(|sample| tilemap.is_within_world_bounds(*sample))
}

fn any_solid(tilemap: &Tilemap, samples: [Vec2; 2]) -> bool {
    samples.iter().any(|sample| does_collide(*sample, tilemap))
}

/// Nearest grid line at or after `value` along one axis.
fn snap_to_next_line(value: f32, origin: f32, tile: f32) -> f32 {
    origin + ((value - origin) / tile).ceil() * tile
}

/// Nearest grid line at or before `value` along one axis.
fn snap_to_previous_line(value: f32, origin: f32, tile: f32) -> f32 {
    origin + ((value - origin) / tile).floor() * tile
}
