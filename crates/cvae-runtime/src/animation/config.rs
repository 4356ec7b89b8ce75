use std::time::Duration;

pub const DEFAULT_FRAME_COUNT: usize = 100;
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(50);
pub const DEFAULT_WALK_RATE: f32 = 0.2;

/// Pacing of multi-frame sequences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    /// Frames produced by one animation run.
    pub frame_count: usize,
    /// Wait inserted between two consecutive frames.
    pub frame_delay: Duration,
    /// Fraction of the way a free walk moves toward each new random target.
    pub walk_rate: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_FRAME_COUNT,
            frame_delay: DEFAULT_FRAME_DELAY,
            walk_rate: DEFAULT_WALK_RATE,
        }
    }
}

impl AnimationConfig {
    pub fn with_frame_count(mut self, frame_count: usize) -> Self {
        self.frame_count = frame_count;
        self
    }

    pub fn with_frame_delay(mut self, frame_delay: Duration) -> Self {
        self.frame_delay = frame_delay;
        self
    }

    pub fn with_walk_rate(mut self, walk_rate: f32) -> Self {
        self.walk_rate = walk_rate;
        self
    }
}
