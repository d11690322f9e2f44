use super::scene::{Transform, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_center(center: Vec2, half_size: Vec2) -> Self {
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Axis-aligned box collider attached to an entity at a fixed local offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleCollider {
    size: Vec2,
    pub local_position: Vec2,
}

impl RectangleCollider {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            local_position: Vec2::ZERO,
        }
    }

    pub fn with_local_position(mut self, local_position: Vec2) -> Self {
        self.local_position = local_position;
        self
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn half_size(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn global_position(&self, parent: &Transform) -> Vec2 {
        parent.position + self.local_position
    }

    pub fn global_bounds(&self, parent: &Transform) -> Rect {
        Rect::from_center(self.global_position(parent), self.half_size())
    }

    /// Parent position that places this collider's centre at `collider_position`.
    pub fn parent_position_for(&self, collider_position: Vec2) -> Vec2 {
        collider_position - self.local_position
    }
}
