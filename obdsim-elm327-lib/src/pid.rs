//! PID tables mapping sub-identifiers to measurements and encodings.
//!
//! Both request families share one shape: a two-character PID maps to a
//! [`Source`] (a live measurement or a constant), a [`Transform`], and a
//! payload [`ByteWidth`].

use crate::frame::ByteWidth;
use crate::store::{Measurement, ValueStore};

/// How a raw measurement becomes the integer placed on the wire
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Identity,
    /// Add a fixed offset (the +40 temperature bias)
    Offset(f32),
    /// Multiply by a factor (×4 engine speed)
    Scale(f32),
    /// Map `0..=from` onto `0..=to`.
    ///
    /// Unlike the other transforms this rounds to the nearest step before
    /// the integer cast, for every input: 89% fuel is sent as `E3` (227,
    /// from 226.95) and 50.1% as 128, where plain truncation would give
    /// `E2` and 127.
    Rescale { from: f32, to: f32 },
}

impl Transform {
    /// Apply the transform and truncate to an unsigned integer. `Rescale`
    /// rounds before truncating.
    ///
    /// Negative and NaN results clamp to zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply(self, value: f32) -> u32 {
        let out = match self {
            Self::Identity => value,
            Self::Offset(offset) => value + offset,
            Self::Scale(factor) => value * factor,
            Self::Rescale { from, to } => (value / from * to).round(),
        };
        // `as` truncates toward zero and saturates
        out as u32
    }
}

/// Where a PID's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Measurement(Measurement),
    /// Supported-PID bitmap for the range starting at this PID
    SupportedBitmap(u8),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidEntry {
    pub pid: &'static str,
    pub source: Source,
    pub transform: Transform,
    pub width: ByteWidth,
}

const TEMPERATURE_OFFSET: Transform = Transform::Offset(40.0);

const fn measured(pid: &'static str, m: Measurement, transform: Transform, width: ByteWidth) -> PidEntry {
    PidEntry {
        pid,
        source: Source::Measurement(m),
        transform,
        width,
    }
}

const fn bitmap(pid: &'static str, base: u8) -> PidEntry {
    PidEntry {
        pid,
        source: Source::SupportedBitmap(base),
        transform: Transform::Identity,
        width: ByteWidth::Four,
    }
}

/// Mode 01 (current data) PIDs
pub const STANDARD_PIDS: &[PidEntry] = &[
    bitmap("00", 0x00),
    measured("05", Measurement::CoolantTemp, TEMPERATURE_OFFSET, ByteWidth::One),
    measured("0B", Measurement::IntakeManifoldPressure, Transform::Identity, ByteWidth::One),
    measured("0C", Measurement::EngineSpeed, Transform::Scale(4.0), ByteWidth::Two),
    measured("0D", Measurement::VehicleSpeed, Transform::Identity, ByteWidth::One),
    bitmap("20", 0x20),
    measured(
        "2F",
        Measurement::FuelLevel,
        Transform::Rescale { from: 100.0, to: 255.0 },
        ByteWidth::One,
    ),
    bitmap("40", 0x40),
    measured("46", Measurement::AmbientAirTemp, TEMPERATURE_OFFSET, ByteWidth::One),
    measured("5C", Measurement::OilTemp, TEMPERATURE_OFFSET, ByteWidth::One),
];

/// Mode 21 (vendor) PIDs
pub const VENDOR_PIDS: &[PidEntry] = &[
    measured("01", Measurement::BoostPressure, Transform::Identity, ByteWidth::One),
    measured("02", Measurement::AnalogSensor, Transform::Identity, ByteWidth::Two),
    measured("03", Measurement::TransmissionTemp, TEMPERATURE_OFFSET, ByteWidth::One),
];

/// Reply used for PIDs missing from a table: zero in one byte
pub const FALLBACK_WIDTH: ByteWidth = ByteWidth::One;

/// Find the entry for `pid` in `table` (case-insensitive)
#[must_use]
pub fn lookup(table: &'static [PidEntry], pid: &str) -> Option<&'static PidEntry> {
    table.iter().find(|e| e.pid.eq_ignore_ascii_case(pid))
}

/// Supported-PID bitmap for `base + 1 ..= base + 32` over `table`.
///
/// PID `base + n` sets bit `32 - n`, so the most significant bit is the
/// first PID of the range and the low bit announces the next bitmap.
#[must_use]
pub fn supported_bitmap(table: &[PidEntry], base: u8) -> u32 {
    table
        .iter()
        .filter_map(|e| u8::from_str_radix(e.pid, 16).ok())
        .filter(|&pid| pid > base && u32::from(pid) <= u32::from(base) + 32)
        .fold(0, |acc, pid| acc | 1 << (32 - u32::from(pid - base)))
}

impl PidEntry {
    /// Value to encode for this entry, after the transform
    #[must_use]
    pub fn resolve(&self, table: &[PidEntry], store: &ValueStore) -> u32 {
        match self.source {
            Source::SupportedBitmap(base) => supported_bitmap(table, base),
            Source::Measurement(m) => self.transform.apply(store.get(m)),
        }
    }
}
