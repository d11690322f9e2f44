use super::resources::TextureHandle;
use super::scene::Vec2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl IntRect {
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Textured quad. `origin` is in texture pixels and is the point placed at
/// the draw transform; `scale` may be negative to mirror.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub texture: Option<TextureHandle>,
    pub texture_rect: IntRect,
    pub origin: Vec2,
    pub scale: Vec2,
}

impl Sprite {
    pub fn new(texture: TextureHandle) -> Self {
        let texture_rect = IntRect::new(0, 0, texture.width(), texture.height());
        Self {
            texture: Some(texture),
            texture_rect,
            origin: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

/// Steps through a horizontal strip of equally sized frames.
///
/// The animation loops. `is_finished` latches once the last frame has been
/// shown for its full duration and stays set until the next `start`.
#[derive(Debug, Clone)]
pub struct SpriteSheetAnimation {
    texture: TextureHandle,
    frame_width: u32,
    frame_height: u32,
    frame_count: u32,
    ticks_per_frame: u32,
    tick: u32,
    frame: u32,
    finished: bool,
}

impl SpriteSheetAnimation {
    pub fn new(
        texture: TextureHandle,
        frame_width: u32,
        frame_height: u32,
        ticks_per_frame: u32,
    ) -> Self {
        let frame_width = frame_width.max(1);
        let frame_count = (texture.width() / frame_width).max(1);
        Self {
            texture,
            frame_width,
            frame_height: frame_height.max(1),
            frame_count,
            ticks_per_frame: ticks_per_frame.max(1),
            tick: 0,
            frame: 0,
            finished: false,
        }
    }

    pub fn start(&mut self) {
        self.tick = 0;
        self.frame = 0;
        self.finished = false;
    }

    pub fn update(&mut self) {
        self.tick += 1;
        if self.tick < self.ticks_per_frame {
            return;
        }
        self.tick = 0;
        self.frame += 1;
        if self.frame >= self.frame_count {
            self.frame = 0;
            self.finished = true;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[cfg(test)]
    fn frame(&self) -> u32 {
        self.frame
    }

    #[cfg(test)]
    fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn frame_rect(&self) -> IntRect {
        IntRect::new(
            self.frame * self.frame_width,
            0,
            self.frame_width,
            self.frame_height,
        )
    }

    pub fn apply_to(&self, sprite: &mut Sprite) {
        sprite.texture = Some(self.texture.clone());
        sprite.texture_rect = self.frame_rect();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::resources::Texture;

    fn strip(frames: u32) -> TextureHandle {
        Arc::new(Texture::solid("strip", frames * 32, 32, [0; 4]))
    }

    #[test]
    fn frame_count_comes_from_texture_width() {
        let animation = SpriteSheetAnimation::new(strip(16), 32, 32, 4);
        assert_eq!(animation.frame_count(), 16);
        let narrow = SpriteSheetAnimation::new(Arc::new(Texture::solid("n", 8, 8, [0; 4])), 32, 32, 4);
        assert_eq!(narrow.frame_count(), 1);
    }

    #[test]
    fn advances_one_frame_per_ticks_per_frame_updates() {
        let mut animation = SpriteSheetAnimation::new(strip(3), 32, 32, 4);
        animation.start();
        for _ in 0..3 {
            animation.update();
        }
        assert_eq!(animation.frame(), 0);
        animation.update();
        assert_eq!(animation.frame(), 1);
        assert_eq!(animation.frame_rect(), IntRect::new(32, 0, 32, 32));
    }

    #[test]
    fn finishes_after_full_cycle_and_loops() {
        let mut animation = SpriteSheetAnimation::new(strip(5), 32, 32, 4);
        animation.start();
        for _ in 0..19 {
            animation.update();
            assert!(!animation.is_finished());
        }
        animation.update();
        assert!(animation.is_finished());
        assert_eq!(animation.frame(), 0);

        animation.update();
        assert!(animation.is_finished());

        animation.start();
        assert!(!animation.is_finished());
    }

    #[test]
    fn apply_to_copies_texture_and_frame() {
        let texture = strip(2);
        let mut animation = SpriteSheetAnimation::new(Arc::clone(&texture), 32, 32, 1);
        let mut sprite = Sprite::new(Arc::new(Texture::solid("other", 1, 1, [0; 4])));
        animation.update();
        animation.apply_to(&mut sprite);

        assert!(Arc::ptr_eq(sprite.texture.as_ref().expect("texture"), &texture));
        assert_eq!(sprite.texture_rect, IntRect::new(32, 0, 32, 32));
    }
}
