use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::FrameClock;
use crate::graph::StateId;
use crate::motion::{Position, Size};

/// A pending-click flag that may be set from another thread.
///
/// Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct ClickLatch(Arc<AtomicBool>);

impl ClickLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a click as pending.
    pub fn press(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether a click was pending.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_pressed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Mutable per-sprite runtime state.
///
/// Refers to the active state by [`StateId`] only; clip data stays in the
/// library.
#[derive(Debug, Clone)]
pub struct SpriteInstance {
    pub(crate) position: Position,
    pub(crate) size: Size,
    pub(crate) state: Option<StateId>,
    pub(crate) clock: FrameClock,
    pub(crate) entered_at: Instant,
    /// Sampled `randomInterval` delays for the current state entry, keyed by
    /// condition group index.
    pub(crate) random_delays: HashMap<usize, Duration>,
    pub(crate) clicks: ClickLatch,
}

impl SpriteInstance {
    pub fn new(now: Instant) -> Self {
        Self {
            position: Position::default(),
            size: Size::default(),
            state: None,
            clock: FrameClock::new(now),
            entered_at: now,
            random_delays: HashMap::new(),
            clicks: ClickLatch::new(),
        }
    }

    /// Make `state` current and reset everything scoped to a state entry.
    pub(crate) fn enter(&mut self, state: StateId, now: Instant) {
        self.state = Some(state);
        self.clock.restart(now);
        self.entered_at = now;
        self.random_delays.clear();
    }

    /// Time spent in the current state.
    pub(crate) fn since_entry(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.entered_at)
    }

    /// Whether `(px, py)` lies inside the sprite's bounds, edges included.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        let Position { x, y } = self.position;
        px >= x
            && px <= x.saturating_add(self.size.width)
            && py >= y
            && py <= y.saturating_add(self.size.height)
    }

    pub fn frame_index(&self) -> usize {
        self.clock.frame_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_is_consumed_once() {
        let latch = ClickLatch::new();
        assert!(!latch.take());
        latch.press();
        assert!(latch.is_pressed());
        assert!(latch.take());
        assert!(!latch.take());
    }

    #[test]
    fn cloned_latch_shares_flag_across_threads() {
        let latch = ClickLatch::new();
        let remote = latch.clone();
        std::thread::spawn(move || remote.press()).join().unwrap();
        assert!(latch.take());
    }

    #[test]
    fn contains_includes_edges() {
        let mut sprite = SpriteInstance::new(Instant::now());
        sprite.position = Position { x: 10, y: 20 };
        sprite.size = Size {
            width: 30,
            height: 40,
        };
        assert!(sprite.contains(10, 20));
        assert!(sprite.contains(40, 60));
        assert!(sprite.contains(25, 35));
        assert!(!sprite.contains(9, 30));
        assert!(!sprite.contains(41, 30));
        assert!(!sprite.contains(20, 61));
    }

    #[test]
    fn enter_resets_entry_scoped_state() {
        let now = Instant::now();
        let mut sprite = SpriteInstance::new(now);
        sprite.random_delays.insert(0, Duration::from_millis(5));

        let later = now + Duration::from_millis(500);
        sprite.enter(StateId(1), later);
        assert_eq!(sprite.state, Some(StateId(1)));
        assert!(sprite.random_delays.is_empty());
        assert_eq!(sprite.frame_index(), 0);
        assert_eq!(sprite.since_entry(later + Duration::from_millis(7)), Duration::from_millis(7));
    }
}
