//! Mock serial endpoints for testing without a microcontroller.
//!
//! [`MockSource`] replays a script of reads (data, timeouts, errors) through
//! [`std::io::Read`]. [`MockSink`] captures everything written to it and
//! exposes the captured lines through a cloneable [`MockSinkHandle`].

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted read result.
#[derive(Debug, Clone)]
enum ReadStep {
    Bytes(Vec<u8>),
    Timeout,
    Error(ErrorKind),
}

/// Scripted byte source.
///
/// # Examples
///
/// ```
/// use kiosk_hardware::EventReader;
/// use kiosk_hardware::mock::MockSource;
/// use kiosk_protocol::SerialEvent;
///
/// let source = MockSource::new().bytes(b"m:").timeout().bytes(b"3\n");
/// let events: Vec<_> = EventReader::new(source).collect();
/// assert_eq!(events, vec![SerialEvent::MoneyDeposited(3)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    steps: VecDeque<ReadStep>,

    /// Keep timing out instead of reporting end of stream when exhausted.
    hold_open: bool,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes returned by the next read.
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.steps.push_back(ReadStep::Bytes(data.to_vec()));
        self
    }

    /// Queue a line followed by `\r\n`.
    pub fn line(self, line: &str) -> Self {
        self.bytes(format!("{line}\r\n").as_bytes())
    }

    /// Queue a read timeout.
    pub fn timeout(mut self) -> Self {
        self.steps.push_back(ReadStep::Timeout);
        self
    }

    /// Queue a hard I/O error.
    pub fn error(mut self, kind: ErrorKind) -> Self {
        self.steps.push_back(ReadStep::Error(kind));
        self
    }

    /// Behave like an idle port once the script is exhausted.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }
}

impl Read for MockSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.steps.pop_front() {
            Some(ReadStep::Bytes(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    self.steps.push_front(ReadStep::Bytes(rest));
                }
                Ok(n)
            }
            Some(ReadStep::Timeout) => Err(io::Error::new(ErrorKind::TimedOut, "mock timeout")),
            Some(ReadStep::Error(kind)) => Err(io::Error::new(kind, "mock read error")),
            None if self.hold_open => {
                std::thread::sleep(Duration::from_millis(1));
                Err(io::Error::new(ErrorKind::TimedOut, "mock idle"))
            }
            None => Ok(0),
        }
    }
}

#[derive(Debug, Default)]
struct SinkState {
    written: Vec<u8>,
    fail_writes: bool,
}

/// Capturing byte sink.
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    state: Arc<Mutex<SinkState>>,
}

/// Inspection and control handle for a [`MockSink`].
#[derive(Debug, Clone)]
pub struct MockSinkHandle {
    state: Arc<Mutex<SinkState>>,
}

impl MockSink {
    /// Create a new sink and its handle.
    pub fn new() -> (Self, MockSinkHandle) {
        let sink = Self::default();
        let handle = MockSinkHandle {
            state: Arc::clone(&sink.state),
        };
        (sink, handle)
    }
}

impl Write for MockSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("mock sink poisoned"))?;
        if state.fail_writes {
            return Err(io::Error::new(ErrorKind::BrokenPipe, "mock write error"));
        }
        state.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MockSinkHandle {
    /// All bytes written so far.
    pub fn written(&self) -> Vec<u8> {
        self.state
            .lock()
            .map(|state| state.written.clone())
            .unwrap_or_default()
    }

    /// Written bytes split into lines, terminators removed.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written())
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_writes = fail;
        }
    }
}
