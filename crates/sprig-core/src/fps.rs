use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Ticks-per-second over a sliding window.
///
/// Call [`tick`](TickCounter::tick) once per host tick and read
/// [`tps`](TickCounter::tps) for the HUD.
#[derive(Debug)]
pub struct TickCounter {
    timestamps: VecDeque<Instant>,
    window: Duration,
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl TickCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            timestamps: VecDeque::new(),
            window,
        }
    }

    /// Record a tick at `now` and forget ticks older than the window.
    pub fn tick(&mut self, now: Instant) {
        self.timestamps.push_back(now);
        let Some(cutoff) = now.checked_sub(self.window) else {
            return;
        };
        while self.timestamps.front().is_some_and(|&t| t < cutoff) {
            self.timestamps.pop_front();
        }
    }

    /// Current rate; `0.0` until two ticks have been seen.
    pub fn tps(&self) -> f64 {
        if self.timestamps.len() < 2 || self.window.is_zero() {
            return 0.0;
        }
        self.timestamps.len() as f64 / self.window.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fewer_than_two_ticks_reads_zero() {
        let mut counter = TickCounter::default();
        assert_eq!(counter.tps(), 0.0);
        counter.tick(Instant::now());
        assert_eq!(counter.tps(), 0.0);
    }

    #[test]
    fn steady_ten_hz() {
        let mut counter = TickCounter::new(Duration::from_secs(1));
        let base = Instant::now();
        for i in 0..10 {
            counter.tick(base + Duration::from_millis(i * 100));
        }
        let tps = counter.tps();
        assert!(tps > 9.0 && tps < 11.0, "tps was {tps}");
    }

    #[test]
    fn old_ticks_leave_the_window() {
        let mut counter = TickCounter::new(Duration::from_secs(1));
        let base = Instant::now();
        for i in 0..5 {
            counter.tick(base + Duration::from_millis(i * 200));
        }
        for i in 0..3 {
            counter.tick(base + Duration::from_millis(2000 + i * 300));
        }
        assert_eq!(counter.timestamps.len(), 3);
    }
}
