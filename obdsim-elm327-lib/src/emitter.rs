use derive_more::{Display, Error, From};
use log::debug;
use std::io::{self, Write};

/// Failed to write a reply line
#[derive(Debug, Display, Error, From)]
#[display("failed to write reply: {_0}")]
pub struct EmitError(io::Error);

impl EmitError {
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        self.0.kind()
    }
}

/// Writes reply lines to the transport, optionally copying them to a
/// diagnostic sink.
pub struct ReplyEmitter<W: Write> {
    primary: W,
    mirror: Option<Box<dyn Write + Send>>,
    line_ending: &'static str,
}

impl<W: Write> ReplyEmitter<W> {
    pub fn new(primary: W, line_ending: &'static str) -> Self {
        Self {
            primary,
            mirror: None,
            line_ending,
        }
    }

    /// Copy every line to `mirror` as well
    #[must_use]
    pub fn with_mirror(mut self, mirror: Box<dyn Write + Send>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    /// Write `line` followed by the line terminator
    pub fn emit(&mut self, line: &str) -> Result<(), EmitError> {
        debug!("TX: {line}");
        self.primary.write_all(line.as_bytes())?;
        self.primary.write_all(self.line_ending.as_bytes())?;
        self.primary.flush()?;

        if let Some(mirror) = self.mirror.as_mut() {
            // The echo channel is best-effort
            let _ = mirror
                .write_all(line.as_bytes())
                .and_then(|()| mirror.write_all(b"\n"));
        }
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.primary
    }

    pub fn into_inner(self) -> W {
        self.primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_emit_appends_line_ending() {
        let mut emitter = ReplyEmitter::new(Vec::new(), "\r\n");
        emitter.emit("OK").unwrap();
        emitter.emit(">").unwrap();
        assert_eq!(emitter.get_ref(), b"OK\r\n>\r\n");

        let mut emitter = ReplyEmitter::new(Vec::new(), "\r");
        emitter.emit("410D3C").unwrap();
        assert_eq!(emitter.into_inner(), b"410D3C\r");
    }

    #[test]
    fn test_mirror_receives_copy() {
        let sink = SharedSink::default();
        let mut emitter = ReplyEmitter::new(Vec::new(), "\r").with_mirror(Box::new(sink.clone()));
        emitter.emit("ELM327 v1.5").unwrap();
        assert_eq!(emitter.get_ref(), b"ELM327 v1.5\r");
        assert_eq!(sink.0.lock().unwrap().as_slice(), b"ELM327 v1.5\n");
    }

    #[test]
    fn test_primary_failure_is_reported() {
        let mut emitter = ReplyEmitter::new(BrokenPipe, "\r\n");
        let err = emitter.emit("OK").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_mirror_failure_is_ignored() {
        let mut emitter = ReplyEmitter::new(Vec::new(), "\r\n").with_mirror(Box::new(BrokenPipe));
        emitter.emit("OK").unwrap();
        assert_eq!(emitter.get_ref(), b"OK\r\n");
    }
}
