//! Classification of request lines into request kinds.

/// A control (`AT`) command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand<'a> {
    /// `ATZ`: reset, reply with the version banner then `OK`
    Reset,
    /// `ATI`
    Identify,
    /// `AT@1`
    Describe,
    /// `ATDPN`
    ProtocolNumber,
    /// `ATRV`
    Voltage,
    /// `ATPC`
    Close,
    /// Settings the simulator accepts without acting on them
    Legacy(LegacyCommand),
    /// Any other `AT` token; acknowledged like the legacy set
    Other(&'a str),
}

/// Configuration commands a scan tool sends during its handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyCommand {
    /// `ATE0`: echo off
    EchoOff,
    /// `ATM0`: memory off
    MemoryOff,
    /// `ATL0`: linefeeds off
    LinefeedsOff,
    /// `ATST62`: response timeout
    Timeout,
    /// `ATS0`: spaces off
    SpacesOff,
    /// `ATH0`: headers off
    HeadersOff,
    /// `ATH1`: headers on
    HeadersOn,
    /// `ATAT1`: adaptive timing
    AdaptiveTiming,
    /// `ATSP0`: automatic protocol
    AutoProtocol,
}

impl<'a> ControlCommand<'a> {
    /// Parse the token following `AT`
    #[must_use]
    pub fn parse(token: &'a str) -> Self {
        match token {
            "Z" => Self::Reset,
            "I" => Self::Identify,
            "@1" => Self::Describe,
            "DPN" => Self::ProtocolNumber,
            "RV" => Self::Voltage,
            "PC" => Self::Close,
            "E0" => Self::Legacy(LegacyCommand::EchoOff),
            "M0" => Self::Legacy(LegacyCommand::MemoryOff),
            "L0" => Self::Legacy(LegacyCommand::LinefeedsOff),
            "ST62" => Self::Legacy(LegacyCommand::Timeout),
            "S0" => Self::Legacy(LegacyCommand::SpacesOff),
            "H0" => Self::Legacy(LegacyCommand::HeadersOff),
            "H1" => Self::Legacy(LegacyCommand::HeadersOn),
            "AT1" => Self::Legacy(LegacyCommand::AdaptiveTiming),
            "SP0" => Self::Legacy(LegacyCommand::AutoProtocol),
            other => Self::Other(other),
        }
    }
}

/// A data request's PID must be exactly two hex digits
fn pid_token(rest: &str) -> Option<&str> {
    (rest.len() == 2 && rest.bytes().all(|b| b.is_ascii_hexdigit())).then_some(rest)
}

/// A classified request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    /// `AT...`
    Control(ControlCommand<'a>),
    /// `01<pid>`
    Standard { pid: &'a str },
    /// `21<pid>`
    Vendor { pid: &'a str },
    Unrecognized,
}

impl<'a> Request<'a> {
    /// Classify a normalized (upper-case, whitespace-free) line.
    ///
    /// Data requests without a two-hex-digit PID (`01`, `010C0D`, `21XY`)
    /// are unrecognized.
    #[must_use]
    pub fn parse(line: &'a str) -> Self {
        if let Some(token) = line.strip_prefix("AT") {
            Self::Control(ControlCommand::parse(token))
        } else if let Some(rest) = line.strip_prefix("01") {
            pid_token(rest).map_or(Self::Unrecognized, |pid| Self::Standard { pid })
        } else if let Some(rest) = line.strip_prefix("21") {
            pid_token(rest).map_or(Self::Unrecognized, |pid| Self::Vendor { pid })
        } else {
            Self::Unrecognized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        assert_eq!(Request::parse("010C"), Request::Standard { pid: "0C" });
        assert_eq!(Request::parse("2102"), Request::Vendor { pid: "02" });
        assert_eq!(Request::parse("ATZ"), Request::Control(ControlCommand::Reset));
        assert_eq!(Request::parse("99AA"), Request::Unrecognized);
        assert_eq!(Request::parse("03"), Request::Unrecognized);
        assert_eq!(Request::parse("A"), Request::Unrecognized);
    }

    #[test]
    fn test_control_tokens() {
        let cases = [
            ("Z", ControlCommand::Reset),
            ("I", ControlCommand::Identify),
            ("@1", ControlCommand::Describe),
            ("DPN", ControlCommand::ProtocolNumber),
            ("RV", ControlCommand::Voltage),
            ("PC", ControlCommand::Close),
            ("E0", ControlCommand::Legacy(LegacyCommand::EchoOff)),
            ("M0", ControlCommand::Legacy(LegacyCommand::MemoryOff)),
            ("L0", ControlCommand::Legacy(LegacyCommand::LinefeedsOff)),
            ("ST62", ControlCommand::Legacy(LegacyCommand::Timeout)),
            ("S0", ControlCommand::Legacy(LegacyCommand::SpacesOff)),
            ("H0", ControlCommand::Legacy(LegacyCommand::HeadersOff)),
            ("H1", ControlCommand::Legacy(LegacyCommand::HeadersOn)),
            ("AT1", ControlCommand::Legacy(LegacyCommand::AdaptiveTiming)),
            ("SP0", ControlCommand::Legacy(LegacyCommand::AutoProtocol)),
        ];
        for (token, expected) in cases {
            assert_eq!(ControlCommand::parse(token), expected, "token {token}");
        }
        assert_eq!(ControlCommand::parse("SP6"), ControlCommand::Other("SP6"));
    }

    #[test]
    fn test_pid_must_be_two_hex_digits() {
        assert_eq!(Request::parse("01"), Request::Unrecognized);
        assert_eq!(Request::parse("010"), Request::Unrecognized);
        assert_eq!(Request::parse("010C0D"), Request::Unrecognized);
        assert_eq!(Request::parse("01ZZ"), Request::Unrecognized);
        assert_eq!(Request::parse("21"), Request::Unrecognized);
        assert_eq!(Request::parse("21XY"), Request::Unrecognized);
        assert_eq!(Request::parse("21FF"), Request::Vendor { pid: "FF" });
    }
}
