//! # Stream redirector: captures stdout/stderr into the log sink.
//!
//! [`StreamRedirector::start`] swaps a process-level stream descriptor for
//! the write end of a fresh pipe, then pumps the read end line by line into
//! the [`LogSink`]. Anything worker code (or a third-party library) prints
//! is captured instead of interleaving with, or vanishing from, the real
//! terminal.
//!
//! ```text
//! println!/eprintln! ──► fd 1/2 ──► pipe ──► forwarding task ──► LogSink
//!                      (dup2'ed)          (spawn_blocking,       │
//!                                          line-buffered reads)  └─ errors → ErrorReporter
//! ```
//!
//! ## Rules
//! - One redirector per enabled stream for the lifetime of the process; the
//!   descriptor swap is never undone.
//! - Lines are forwarded in write order, one `LogSink::write` per line.
//! - A failed forward is reported to the [`ErrorReporter`] and the pump
//!   keeps going with the next line; nothing propagates into the run loop.
//! - The pump exits when the pipe reaches end-of-stream, which only happens
//!   at process teardown.

use std::io::BufRead;
#[cfg(unix)]
use std::sync::Arc;

use crate::diag::ErrorReporter;
use crate::sinks::LogSink;

/// A process-level output stream eligible for capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StdStream {
    Stdout,
    Stderr,
}

impl StdStream {
    /// Stable label for events and error reports.
    pub fn as_label(&self) -> &'static str {
        match self {
            StdStream::Stdout => "stdout",
            StdStream::Stderr => "stderr",
        }
    }

    #[cfg(unix)]
    fn raw_fd(&self) -> std::os::fd::RawFd {
        match self {
            StdStream::Stdout => 1,
            StdStream::Stderr => 2,
        }
    }
}

/// Owns one capture pipe and its forwarding task.
#[cfg(unix)]
#[derive(Debug)]
pub struct StreamRedirector {
    stream: StdStream,
    task: tokio::task::JoinHandle<()>,
}

#[cfg(unix)]
impl StreamRedirector {
    /// Which stream this redirector captures.
    pub fn stream(&self) -> StdStream {
        self.stream
    }

    /// True while the forwarding task is still pumping.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Redirects `stream` into `sink`.
    ///
    /// Creates the pipe, swaps the stream's descriptor for the pipe's write
    /// end, and spawns the forwarding task. Pipe reads block, so the pump
    /// runs on the blocking pool; must be called within a Tokio runtime.
    pub fn start(
        stream: StdStream,
        sink: Arc<dyn LogSink>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> std::io::Result<Self> {
        use std::os::fd::AsRawFd;

        let (read_end, write_end) = nix::unistd::pipe().map_err(std::io::Error::from)?;
        nix::unistd::dup2(write_end.as_raw_fd(), stream.raw_fd()).map_err(std::io::Error::from)?;
        // The dup'ed descriptor keeps the write side open; dropping the
        // original here means EOF arrives only when the process tears down.
        drop(write_end);

        let reader = std::io::BufReader::new(std::fs::File::from(read_end));
        let task =
            tokio::task::spawn_blocking(move || forward_lines(stream, reader, &*sink, &*reporter));
        Ok(Self { stream, task })
    }
}

/// Pumps `reader` into `sink` one line at a time until end-of-stream.
///
/// Forward failures are isolated per line: reported, then the next line is
/// read as usual. A read failure ends the pump (the pipe is unusable).
pub(crate) fn forward_lines(
    stream: StdStream,
    mut reader: impl BufRead,
    sink: &dyn LogSink,
    reporter: &dyn ErrorReporter,
) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                let line = String::from_utf8_lossy(&buf);
                if let Err(e) = sink.write(&line) {
                    reporter.report(stream.as_label(), &e);
                }
            }
            Err(e) => {
                reporter.report(stream.as_label(), &e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        lines: Mutex<Vec<String>>,
        fail_on: Option<usize>,
        calls: AtomicUsize,
    }

    impl RecordingSink {
        fn failing_on(line: usize) -> Self {
            Self {
                fail_on: Some(line),
                ..Self::default()
            }
        }

        fn lines(&self) -> Vec<String> {
            self.lines.lock().expect("lock").clone()
        }
    }

    impl LogSink for RecordingSink {
        fn write(&self, line: &str) -> io::Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on == Some(call) {
                return Err(io::Error::new(io::ErrorKind::Other, "sink unavailable"));
            }
            self.lines.lock().expect("lock").push(line.to_string());
            Ok(())
        }

        fn reopen(&self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingReporter {
        reports: AtomicUsize,
    }

    impl ErrorReporter for CountingReporter {
        fn report(&self, _scope: &str, _error: &(dyn std::error::Error + 'static)) {
            self.reports.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_lines_are_forwarded_in_order() {
        let sink = RecordingSink::default();
        let reporter = CountingReporter::default();

        forward_lines(
            StdStream::Stdout,
            Cursor::new(b"one\ntwo\nthree\n".to_vec()),
            &sink,
            &reporter,
        );

        assert_eq!(sink.lines(), vec!["one", "two", "three"]);
        assert_eq!(reporter.reports.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_partial_last_line_is_not_lost() {
        let sink = RecordingSink::default();
        let reporter = CountingReporter::default();

        forward_lines(
            StdStream::Stderr,
            Cursor::new(b"complete\ntruncated".to_vec()),
            &sink,
            &reporter,
        );

        assert_eq!(sink.lines(), vec!["complete", "truncated"]);
    }

    #[test]
    fn test_single_write_failure_does_not_stop_the_pump() {
        let sink = RecordingSink::failing_on(2);
        let reporter = CountingReporter::default();

        forward_lines(
            StdStream::Stdout,
            Cursor::new(b"a\nb\nc\n".to_vec()),
            &sink,
            &reporter,
        );

        assert_eq!(sink.lines(), vec!["a", "c"], "line b is lost, c still flows");
        assert_eq!(reporter.reports.load(Ordering::SeqCst), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pump_over_a_real_pipe() {
        use std::io::Write;

        let (read_end, write_end) = nix::unistd::pipe().expect("pipe");
        let sink = Arc::new(RecordingSink::default());
        let reporter = Arc::new(CountingReporter::default());

        let pump = {
            let sink = Arc::clone(&sink);
            let reporter = Arc::clone(&reporter);
            tokio::task::spawn_blocking(move || {
                let reader = std::io::BufReader::new(std::fs::File::from(read_end));
                forward_lines(StdStream::Stdout, reader, &*sink, &*reporter);
            })
        };

        let mut writer = std::fs::File::from(write_end);
        writer.write_all(b"hello\nworld\n").expect("write");
        drop(writer);

        pump.await.expect("pump joins on EOF");
        assert_eq!(sink.lines(), vec!["hello", "world"]);
    }
}
