//! Revolution counting and engine-speed derivation.
//!
//! [`PulseCounter`] is the only state shared with the edge-signal side. The
//! edge handler calls [`PulseCounter::record_edge`] and nothing else; the
//! main cycle reads and resets it through [`Tachometer::poll`].

use log::{debug, info};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Default number of pulses between engine-speed recomputations
pub const DEFAULT_PULSE_THRESHOLD: u32 = 30;

/// Shared pulse count, incremented from the edge-signal context
#[derive(Debug, Clone, Default)]
pub struct PulseCounter(Arc<AtomicU32>);

impl PulseCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one qualifying edge. Safe to call from any thread.
    pub fn record_edge(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Atomically read and zero the count
    pub fn take(&self) -> u32 {
        self.0.swap(0, Ordering::AcqRel)
    }
}

/// Turns pulse counts into an engine-speed figure
#[derive(Debug)]
pub struct Tachometer {
    counter: PulseCounter,
    threshold: u32,
    /// Start of the current measurement window, unset until first poll
    window_start_us: Option<u64>,
}

impl Tachometer {
    #[must_use]
    pub fn new(counter: PulseCounter, threshold: u32) -> Self {
        Self {
            counter,
            threshold: threshold.max(1),
            window_start_us: None,
        }
    }

    /// Recompute engine speed once `threshold` pulses have arrived.
    ///
    /// Returns `None` between threshold crossings; the caller keeps its
    /// previous value.
    pub fn poll(&mut self, now_us: u64) -> Option<f32> {
        let Some(start) = self.window_start_us else {
            self.counter.take();
            self.window_start_us = Some(now_us);
            return None;
        };

        if self.counter.count() < self.threshold {
            return None;
        }

        let pulses = self.counter.take();
        let elapsed_us = now_us.saturating_sub(start).max(1);
        self.window_start_us = Some(now_us);

        let threshold = f64::from(self.threshold);
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let speed = (threshold * 1_000_000.0 / elapsed_us as f64 * threshold) as f32;
        debug!("Tachometer: {pulses} pulses in {elapsed_us}us -> {speed:.0}");
        Some(speed)
    }

    /// Zero the count and restart the measurement window
    pub fn reset(&mut self) {
        info!("Tachometer reset");
        self.counter.take();
        self.window_start_us = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulses(counter: &PulseCounter, n: u32) {
        for _ in 0..n {
            counter.record_edge();
        }
    }

    #[test]
    fn test_first_poll_starts_window() {
        let counter = PulseCounter::new();
        let mut tach = Tachometer::new(counter.clone(), 30);
        pulses(&counter, 40);
        assert_eq!(tach.poll(1_000), None);
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_speed_formula() {
        let counter = PulseCounter::new();
        let mut tach = Tachometer::new(counter.clone(), 30);
        assert_eq!(tach.poll(0), None);

        pulses(&counter, 30);
        // 30 pulses in 0.5s: (30 * 1e6 / 500000) * 30
        assert_eq!(tach.poll(500_000), Some(1800.0));
        assert_eq!(counter.count(), 0);

        pulses(&counter, 30);
        assert_eq!(tach.poll(1_500_000), Some(900.0));
    }

    #[test]
    fn test_below_threshold_keeps_count() {
        let counter = PulseCounter::new();
        let mut tach = Tachometer::new(counter.clone(), 30);
        tach.poll(0);
        pulses(&counter, 29);
        assert_eq!(tach.poll(10_000), None);
        assert_eq!(counter.count(), 29);
    }

    #[test]
    fn test_zero_elapsed_does_not_divide_by_zero() {
        let counter = PulseCounter::new();
        let mut tach = Tachometer::new(counter.clone(), 1);
        tach.poll(5);
        pulses(&counter, 1);
        assert_eq!(tach.poll(5), Some(1_000_000.0));
    }

    #[test]
    fn test_reset_clears_count() {
        let counter = PulseCounter::new();
        let mut tach = Tachometer::new(counter.clone(), 30);
        tach.poll(0);
        pulses(&counter, 31);
        tach.reset();
        assert_eq!(counter.count(), 0);
        assert_eq!(tach.poll(100), None);
    }

    #[test]
    fn test_edges_from_another_thread() {
        let counter = PulseCounter::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = counter.clone();
                std::thread::spawn(move || pulses(&c, 1000))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counter.take(), 4000);
    }
}
