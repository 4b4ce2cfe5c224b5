//! Byte-at-a-time request line accumulator.

use log::warn;

/// Default bound on buffered request characters
pub const DEFAULT_MAX_LINE_LEN: usize = 32;

/// Something the lexer produced after a terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexEvent {
    /// A complete request, upper-cased, without whitespace or terminator
    Line(String),
    /// A request that exceeded the length bound and was discarded
    Overflowed,
}

/// Accumulates incoming bytes into request lines.
///
/// `\r` and `\n` terminate a line; empty lines are swallowed. Spaces and
/// other control bytes never reach the buffer.
#[derive(Debug, Clone)]
pub struct LineLexer {
    buffer: Vec<u8>,
    max_len: usize,
    overflowed: bool,
}

impl Default for LineLexer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

impl LineLexer {
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(max_len),
            max_len,
            overflowed: false,
        }
    }

    /// Number of characters currently buffered
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any partially received line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Feed one byte, returning an event if it completed a line
    pub fn push(&mut self, byte: u8) -> Option<LexEvent> {
        match byte {
            b'\r' | b'\n' => self.flush(),
            b if b.is_ascii_whitespace() || b.is_ascii_control() => None,
            _ if self.overflowed => None,
            b => {
                if self.buffer.len() >= self.max_len {
                    warn!(
                        "Request longer than {} characters, discarding until terminator",
                        self.max_len
                    );
                    self.buffer.clear();
                    self.overflowed = true;
                } else {
                    self.buffer.push(b);
                }
                None
            }
        }
    }

    /// Feed a run of bytes, yielding events lazily as terminators arrive
    pub fn feed<'a, I>(&'a mut self, bytes: I) -> impl Iterator<Item = LexEvent> + 'a
    where
        I: IntoIterator<Item = u8>,
        I::IntoIter: 'a,
    {
        bytes.into_iter().filter_map(move |b| self.push(b))
    }

    fn flush(&mut self) -> Option<LexEvent> {
        if self.overflowed {
            self.overflowed = false;
            return Some(LexEvent::Overflowed);
        }
        if self.buffer.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.buffer).to_ascii_uppercase();
        self.buffer.clear();
        Some(LexEvent::Line(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &[u8]) -> Vec<LexEvent> {
        let mut lexer = LineLexer::default();
        lexer.feed(input.iter().copied()).collect()
    }

    fn line(s: &str) -> LexEvent {
        LexEvent::Line(s.to_string())
    }

    #[test]
    fn test_single_line() {
        assert_eq!(lines(b"0105\r"), vec![line("0105")]);
    }

    #[test]
    fn test_leading_space_ignored() {
        assert_eq!(lines(b" 0105\r"), vec![line("0105")]);
        assert_eq!(lines(b"01 0C\r"), vec![line("010C")]);
    }

    #[test]
    fn test_empty_terminators_absorbed() {
        assert!(lines(b"\r\n").is_empty());
        assert!(lines(b"\r\r\n\n").is_empty());
    }

    #[test]
    fn test_crlf_yields_one_line() {
        assert_eq!(lines(b"ATZ\r\nATI\n"), vec![line("ATZ"), line("ATI")]);
    }

    #[test]
    fn test_uppercased() {
        assert_eq!(lines(b"at@1\r"), vec![line("AT@1")]);
        assert_eq!(lines(b"010c\r"), vec![line("010C")]);
    }

    #[test]
    fn test_control_bytes_dropped() {
        assert_eq!(lines(b"\t01\x0005\r"), vec![line("0105")]);
    }

    #[test]
    fn test_no_terminator_stays_pending() {
        let mut lexer = LineLexer::default();
        assert_eq!(lexer.feed(b"0105".iter().copied()).count(), 0);
        assert_eq!(lexer.pending(), 4);
        assert_eq!(lexer.push(b'\r'), Some(line("0105")));
        assert_eq!(lexer.pending(), 0);
    }

    #[test]
    fn test_reset_drops_partial_line() {
        let mut lexer = LineLexer::default();
        assert_eq!(lexer.feed(b"01".iter().copied()).count(), 0);
        lexer.reset();
        assert_eq!(lexer.pending(), 0);
        assert_eq!(lexer.feed(b"0C\r".iter().copied()).collect::<Vec<_>>(), vec![line("0C")]);
    }

    #[test]
    fn test_reset_clears_overflow() {
        let mut lexer = LineLexer::new(4);
        assert_eq!(lexer.feed(b"010C0D".iter().copied()).count(), 0);
        lexer.reset();
        assert_eq!(lexer.feed(b"ATI\r".iter().copied()).collect::<Vec<_>>(), vec![line("ATI")]);
    }

    #[test]
    fn test_overflow_discards_line() {
        let mut lexer = LineLexer::new(4);
        let events: Vec<_> = lexer.feed(b"010C0D\r0105\r".iter().copied()).collect();
        assert_eq!(events, vec![LexEvent::Overflowed, line("0105")]);
    }

    #[test]
    fn test_exactly_max_len_is_accepted() {
        let mut lexer = LineLexer::new(4);
        let events: Vec<_> = lexer.feed(b"0105\r".iter().copied()).collect();
        assert_eq!(events, vec![line("0105")]);
    }
}
