//! Hex payload encoding for data replies.
//!
//! Every data reply carries its value as upper-case hex, zero-padded to
//! twice the PID's byte width (`41 05` + `85` for a coolant reading of 93°C).

use derive_more::{Display, Error};
use log::warn;

/// Number of payload bytes a PID occupies on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum ByteWidth {
    #[display("1 byte")]
    One,
    #[display("2 bytes")]
    Two,
    #[display("3 bytes")]
    Three,
    #[display("4 bytes")]
    Four,
}

impl ByteWidth {
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Number of hex characters in a payload of this width
    #[must_use]
    pub const fn hex_len(self) -> usize {
        self.bytes() * 2
    }

    /// Largest value that fits without widening the payload
    #[must_use]
    pub const fn max_value(self) -> u32 {
        match self {
            Self::One => 0xFF,
            Self::Two => 0xFFFF,
            Self::Three => 0x00FF_FFFF,
            Self::Four => u32::MAX,
        }
    }
}

/// A value did not fit in the declared payload width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("value {value:#X} does not fit in {width}")]
pub struct FrameOverflow {
    pub value: u32,
    pub width: ByteWidth,
}

/// Encode `value` as upper-case hex, left-padded with zeros to `width`.
///
/// Values wider than `width` are emitted at their natural length rather
/// than truncated, so `encode(0x1234, ByteWidth::One)` yields `"1234"`.
/// Use [`encode_checked`] to reject those instead.
#[must_use]
pub fn encode(value: u32, width: ByteWidth) -> String {
    if value > width.max_value() {
        warn!("Payload {value:#X} wider than {width}, sending unpadded");
    }
    format!("{value:0len$X}", len = width.hex_len())
}

/// Like [`encode`], but fails when the value would widen the payload.
pub fn encode_checked(value: u32, width: ByteWidth) -> Result<String, FrameOverflow> {
    if value > width.max_value() {
        return Err(FrameOverflow { value, width });
    }
    Ok(format!("{value:0len$X}", len = width.hex_len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_to_width() {
        assert_eq!(encode(0x85, ByteWidth::One), "85");
        assert_eq!(encode(0x5, ByteWidth::One), "05");
        assert_eq!(encode(0x5460, ByteWidth::Two), "5460");
        assert_eq!(encode(0x1, ByteWidth::Three), "000001");
        assert_eq!(encode(0x0838_0001, ByteWidth::Four), "08380001");
        assert_eq!(encode(0, ByteWidth::Four), "00000000");
    }

    #[test]
    fn test_payload_length_matches_width() {
        for width in [ByteWidth::One, ByteWidth::Two, ByteWidth::Three, ByteWidth::Four] {
            assert_eq!(encode(0, width).len(), width.hex_len());
            assert_eq!(encode(width.max_value(), width).len(), width.hex_len());
        }
    }

    #[test]
    fn test_overflow_is_not_truncated() {
        assert_eq!(encode(0x1234, ByteWidth::One), "1234");
        assert_eq!(encode(0x1_0000, ByteWidth::Two), "10000");
    }

    #[test]
    fn test_checked_rejects_overflow() {
        assert_eq!(encode_checked(0xFF, ByteWidth::One).as_deref(), Ok("FF"));
        let err = encode_checked(0x100, ByteWidth::One).unwrap_err();
        assert_eq!(err, FrameOverflow { value: 0x100, width: ByteWidth::One });
        assert_eq!(err.to_string(), "value 0x100 does not fit in 1 byte");
    }
}
