use tracing::debug;

use super::resources::SoundBufferHandle;

/// A playable instance of a sound buffer. There is no mixer behind it: a
/// play request is recorded and logged for whichever backend drains it.
#[derive(Debug, Clone)]
pub struct Sound {
    buffer: SoundBufferHandle,
    play_count: u32,
}

impl Sound {
    pub fn new(buffer: SoundBufferHandle) -> Self {
        Self {
            buffer,
            play_count: 0,
        }
    }

    pub fn play(&mut self) {
        self.play_count = self.play_count.saturating_add(1);
        debug!(
            sound = self.buffer.key(),
            silent = self.buffer.is_silent(),
            play_count = self.play_count,
            "sound_play"
        );
    }

    pub fn play_count(&self) -> u32 {
        self.play_count
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::resources::SoundBuffer;

    #[test]
    fn play_records_each_request() {
        let buffer = Arc::new(SoundBuffer::new("hit", vec![1, 2, 3]));
        let mut sound = Sound::new(buffer);
        assert_eq!(sound.play_count(), 0);

        sound.play();
        sound.play();
        assert_eq!(sound.play_count(), 2);
    }
}
