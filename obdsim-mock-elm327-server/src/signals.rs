//! Simulated sensor hardware: the ignition-pulse source feeding the
//! revolution counter, and the analog input line.

use log::info;
use obdsim_elm327_lib::{AnalogInput, PulseCounter};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Engine speed profile: ramp up, hold, ramp down, idle, repeat
#[derive(Debug, Clone, Copy)]
pub struct RpmRamp {
    pub min_rpm: f32,
    pub max_rpm: f32,
    /// Seconds spent ramping in each direction
    pub ramp_time: f32,
    /// Seconds spent at each end
    pub hold_time: f32,
}

impl Default for RpmRamp {
    fn default() -> Self {
        Self {
            min_rpm: 800.0,
            max_rpm: 3500.0,
            ramp_time: 4.0,
            hold_time: 3.0,
        }
    }
}

impl RpmRamp {
    /// Engine speed `elapsed` seconds into the profile
    #[must_use]
    pub fn rpm_at(&self, elapsed: f32) -> f32 {
        let cycle_time = 2.0 * (self.ramp_time + self.hold_time);
        let phase = elapsed % cycle_time;
        let span = self.max_rpm - self.min_rpm;

        if phase < self.ramp_time {
            self.min_rpm + span * (phase / self.ramp_time)
        } else if phase < self.ramp_time + self.hold_time {
            self.max_rpm
        } else if phase < 2.0 * self.ramp_time + self.hold_time {
            let ramp_phase = phase - self.ramp_time - self.hold_time;
            self.max_rpm - span * (ramp_phase / self.ramp_time)
        } else {
            self.min_rpm
        }
    }

    /// Gap between pulses that makes the tachometer read `rpm`.
    ///
    /// The tachometer reports `pulses_per_second * threshold`.
    #[must_use]
    pub fn pulse_interval(rpm: f32, threshold: u32) -> Duration {
        #[allow(clippy::cast_precision_loss)]
        let pulses_per_second = rpm / threshold as f32;
        if pulses_per_second <= 0.0 {
            return Duration::from_secs(1);
        }
        Duration::from_secs_f32(1.0 / pulses_per_second)
    }
}

/// Spawn the edge source. The thread only ever records edges.
pub fn spawn_pulse_source(counter: PulseCounter, ramp: RpmRamp, threshold: u32) -> JoinHandle<()> {
    info!(
        "Pulse source: {:.0}-{:.0} rpm, threshold {threshold}",
        ramp.min_rpm, ramp.max_rpm
    );
    std::thread::spawn(move || {
        let start = Instant::now();
        loop {
            let rpm = ramp.rpm_at(start.elapsed().as_secs_f32());
            std::thread::sleep(RpmRamp::pulse_interval(rpm, threshold));
            counter.record_edge();
        }
    })
}

/// A slowly oscillating 10-bit reading
#[derive(Debug)]
pub struct SimulatedAnalog {
    start: Instant,
}

impl SimulatedAnalog {
    pub const MAX: u16 = 1023;

    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    #[must_use]
    pub fn sample_at(elapsed: f32) -> u16 {
        let level = (elapsed * 0.5).sin() * 0.5 + 0.5;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let raw = (level * f32::from(Self::MAX)) as u16;
        raw.min(Self::MAX)
    }
}

impl Default for SimulatedAnalog {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogInput for SimulatedAnalog {
    fn read(&mut self) -> u16 {
        Self::sample_at(self.start.elapsed().as_secs_f32())
    }
}
