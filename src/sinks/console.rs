//! # Console sink: raw stdout/stderr destination.

use std::io::{self, Write};

use super::LogSink;

/// Which process stream a [`ConsoleSink`] appends to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConsoleStream {
    Stdout,
    Stderr,
}

/// [`LogSink`] writing to the process's own stdout or stderr.
///
/// This is the sink the supervisor builds when the configured log target is
/// a raw stream. Capture of that same stream is disabled at construction
/// time, so writes here cannot feed back into a redirector.
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    /// Sink appending to stdout.
    pub fn stdout() -> Self {
        Self {
            stream: ConsoleStream::Stdout,
        }
    }

    /// Sink appending to stderr.
    pub fn stderr() -> Self {
        Self {
            stream: ConsoleStream::Stderr,
        }
    }
}

impl LogSink for ConsoleSink {
    fn write(&self, line: &str) -> io::Result<()> {
        match self.stream {
            ConsoleStream::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.write_all(b"\n")
            }
            ConsoleStream::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(line.as_bytes())?;
                err.write_all(b"\n")
            }
        }
    }

    // A raw stream has nothing to rotate.
    fn reopen(&self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reopen_is_a_noop() {
        assert!(ConsoleSink::stdout().reopen().is_ok());
        assert!(ConsoleSink::stderr().reopen().is_ok());
    }
}
