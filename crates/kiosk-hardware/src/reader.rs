//! Blocking serial event reader.
//!
//! [`EventReader`] turns any [`std::io::Read`] source into a lazy, infinite
//! iterator of [`SerialEvent`]s. The serial port is opened with a short read
//! timeout, so most reads return `TimedOut` or a handful of bytes; the reader
//! keeps polling until a full line arrives. The iterator only ends when the
//! source reports end of stream or a stop is requested, and it cannot be
//! restarted afterwards.
//!
//! # Examples
//!
//! ```
//! use kiosk_hardware::EventReader;
//! use kiosk_protocol::SerialEvent;
//!
//! let source = std::io::Cursor::new(b"m:5\r\nbogus\n".to_vec());
//! let events: Vec<_> = EventReader::new(source).collect();
//!
//! assert_eq!(events[0], SerialEvent::MoneyDeposited(5));
//! assert_eq!(events[1], SerialEvent::InvalidInput("bogus".to_string()));
//! ```

use std::io::{ErrorKind, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::BytesMut;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::Decoder;
use tracing::{debug, error, trace, warn};

use kiosk_protocol::{SerialEvent, SerialLineCodec};

use crate::Result;

/// Bytes requested per read call.
const READ_CHUNK_SIZE: usize = 64;

/// Pause after a hard read error before trying again.
const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Lazy iterator of serial events over a blocking byte source.
pub struct EventReader<R> {
    source: R,
    codec: SerialLineCodec,
    buffer: BytesMut,
    error_backoff: Duration,
    stop: Option<Arc<AtomicBool>>,
    finished: bool,
}

impl<R: Read> EventReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            codec: SerialLineCodec::new(),
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE * 2),
            error_backoff: DEFAULT_ERROR_BACKOFF,
            stop: None,
            finished: false,
        }
    }

    /// Set the pause applied after a hard read error.
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// End the iterator at the next read timeout once `stop` is set.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn finish(&mut self) -> Option<SerialEvent> {
        self.finished = true;
        match self.codec.decode_eof(&mut self.buffer) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Discarding trailing serial bytes");
                None
            }
        }
    }
}

impl<R: Read> Iterator for EventReader<R> {
    type Item = SerialEvent;

    fn next(&mut self) -> Option<SerialEvent> {
        if self.finished {
            return None;
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.codec.decode(&mut self.buffer) {
                Ok(Some(event)) => {
                    trace!(kind = event.kind(), "Serial event decoded");
                    return Some(event);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Serial decode failed, clearing buffer");
                    self.buffer.clear();
                }
            }

            if self.stop_requested() {
                debug!("Serial reader stop requested");
                self.finished = true;
                return None;
            }

            match self.source.read(&mut chunk) {
                Ok(0) => {
                    debug!("Serial source reached end of stream");
                    return self.finish();
                }
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) => {}
                Err(e) => {
                    error!(error = %e, "Serial read failed");
                    std::thread::sleep(self.error_backoff);
                }
            }
        }
    }
}

/// Run `reader` on the blocking pool, forwarding every event to `tx`.
///
/// The task ends when the reader is exhausted or the receiving side of the
/// channel is dropped.
pub fn spawn_reader<R>(
    reader: EventReader<R>,
    tx: mpsc::Sender<SerialEvent>,
) -> JoinHandle<Result<()>>
where
    R: Read + Send + 'static,
{
    tokio::task::spawn_blocking(move || read_into(reader, tx))
}

pub(crate) fn read_into<R: Read>(
    reader: EventReader<R>,
    tx: mpsc::Sender<SerialEvent>,
) -> Result<()> {
    for event in reader {
        if tx.blocking_send(event).is_err() {
            debug!("Serial event channel closed, reader exiting");
            break;
        }
    }
    Ok(())
}
