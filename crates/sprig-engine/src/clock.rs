use std::time::{Duration, Instant};

use crate::types::Clip;

/// Frame cursor for the active clip.
///
/// Each [`step`](Self::step) adds the wall time since the previous step to
/// an accumulator and advances through as many frames as that covers,
/// looping at the end of the clip. Catches up if several frames have
/// elapsed since the last step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame_index: usize,
    elapsed: Duration,
    last_step: Instant,
}

impl FrameClock {
    /// Start at frame 0 with an empty accumulator.
    pub fn new(now: Instant) -> Self {
        Self {
            frame_index: 0,
            elapsed: Duration::ZERO,
            last_step: now,
        }
    }

    /// Rewind to frame 0 and clear the accumulator.
    pub fn restart(&mut self, now: Instant) {
        self.frame_index = 0;
        self.elapsed = Duration::ZERO;
        self.last_step = now;
    }

    /// Advance through `clip` by the time elapsed since the last step.
    ///
    /// A `now` earlier than the previous step adds nothing.
    pub fn step(&mut self, now: Instant, clip: &Clip) {
        if let Some(dt) = now.checked_duration_since(self.last_step) {
            self.elapsed += dt;
            self.last_step = now;
        }

        let len = clip.frame_count();
        if len == 0 {
            self.frame_index = 0;
            self.elapsed = Duration::ZERO;
            return;
        }
        if self.frame_index >= len {
            self.frame_index = 0;
        }

        // A whole loop lands back on the same frame.
        let cycle = clip.cycle_duration();
        if !cycle.is_zero() && self.elapsed >= cycle {
            let rem = self.elapsed.as_nanos() % cycle.as_nanos();
            self.elapsed = Duration::from_nanos(rem as u64);
        }

        loop {
            let duration = clip.frames[self.frame_index].duration;
            if duration.is_zero() || self.elapsed < duration {
                break;
            }
            self.elapsed -= duration;
            self.frame_index = (self.frame_index + 1) % len;
        }
    }

    /// Index of the frame currently on screen.
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Time accumulated toward the current frame.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
