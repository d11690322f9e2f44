use super::animation::{IntRect, Sprite};
use super::scene::{Transform, Vec2};

pub trait DrawTarget {
    fn begin_frame(&mut self) {}
    fn draw_sprite(&mut self, sprite: &Sprite, transform: &Transform);
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub texture_key: Option<String>,
    pub texture_rect: IntRect,
    pub origin: Vec2,
    pub scale: Vec2,
    pub position: Vec2,
}

/// Draw target that records the frame's commands instead of rasterizing.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    frames_begun: u64,
}

impl DrawList {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn frames_begun(&self) -> u64 {
        self.frames_begun
    }
}

impl DrawTarget for DrawList {
    fn begin_frame(&mut self) {
        self.commands.clear();
        self.frames_begun = self.frames_begun.saturating_add(1);
    }

    fn draw_sprite(&mut self, sprite: &Sprite, transform: &Transform) {
        self.commands.push(DrawCommand {
            texture_key: sprite
                .texture
                .as_ref()
                .map(|texture| texture.key().to_string()),
            texture_rect: sprite.texture_rect,
            origin: sprite.origin,
            scale: sprite.scale,
            position: transform.position,
        });
    }
}
