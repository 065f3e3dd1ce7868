//! Outbound command path.
//!
//! Both the session loop and the heartbeat emitter write to the device. They
//! never touch the port directly: each holds a [`CommandSender`] and a single
//! writer task drains the queue, so commands are written one whole line at a
//! time and never interleave.
//!
//! Commands are fire-and-forget. A full queue or a failed write is logged and
//! the command is dropped.

use std::io::Write;

use bytes::BytesMut;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::codec::Encoder;
use tracing::{debug, trace, warn};

use kiosk_protocol::{DeviceCommand, SerialLineCodec};

use crate::Result;

/// Default depth of the outbound command queue.
pub const DEFAULT_COMMAND_CAPACITY: usize = 32;

/// Cloneable, non-blocking handle for queueing device commands.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<DeviceCommand>,
}

impl CommandSender {
    pub fn new(tx: mpsc::Sender<DeviceCommand>) -> Self {
        Self { tx }
    }

    /// Create a sender together with the receiving end of its queue.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiosk_hardware::CommandSender;
    /// use kiosk_protocol::DeviceCommand;
    ///
    /// let (commands, mut rx) = CommandSender::channel(4);
    /// commands.send(DeviceCommand::Arm);
    /// assert_eq!(rx.try_recv().unwrap(), DeviceCommand::Arm);
    /// ```
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DeviceCommand>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Queue a command, best effort.
    ///
    /// Returns `false` if the command was dropped.
    pub fn send(&self, command: DeviceCommand) -> bool {
        match self.tx.try_send(command) {
            Ok(()) => {
                trace!(%command, "Device command queued");
                true
            }
            Err(TrySendError::Full(command)) => {
                warn!(%command, "Device command queue full, dropping command");
                false
            }
            Err(TrySendError::Closed(command)) => {
                warn!(%command, "Device link closed, dropping command");
                false
            }
        }
    }

    /// Whether the writer side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Run the command writer on the blocking pool.
///
/// The task ends once every [`CommandSender`] has been dropped.
pub fn spawn_writer<W>(sink: W, rx: mpsc::Receiver<DeviceCommand>) -> JoinHandle<Result<()>>
where
    W: Write + Send + 'static,
{
    tokio::task::spawn_blocking(move || write_from(sink, rx))
}

pub(crate) fn write_from<W: Write>(
    mut sink: W,
    mut rx: mpsc::Receiver<DeviceCommand>,
) -> Result<()> {
    let mut codec = SerialLineCodec::new();
    let mut buffer = BytesMut::with_capacity(8);

    while let Some(command) = rx.blocking_recv() {
        buffer.clear();
        codec.encode(command, &mut buffer)?;

        match sink.write_all(&buffer).and_then(|()| sink.flush()) {
            Ok(()) => trace!(%command, "Device command written"),
            Err(e) => warn!(%command, error = %e, "Failed to write device command"),
        }
    }

    debug!("Command queue closed, writer exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSink;

    #[test]
    fn test_send_reports_dropped_commands() {
        let (commands, rx) = CommandSender::channel(1);
        assert!(commands.send(DeviceCommand::Arm));
        assert!(!commands.send(DeviceCommand::Heartbeat));

        drop(rx);
        assert!(commands.is_closed());
        assert!(!commands.send(DeviceCommand::Disarm));
    }

    #[tokio::test]
    async fn test_writer_writes_lines_in_order() {
        let (sink, handle) = MockSink::new();
        let (commands, rx) = CommandSender::channel(8);
        let writer = spawn_writer(sink, rx);

        commands.send(DeviceCommand::Arm);
        commands.send(DeviceCommand::Heartbeat);
        commands.send(DeviceCommand::OpenMoneyDoor);
        commands.send(DeviceCommand::LogoutSignal);
        drop(commands);

        writer.await.unwrap().unwrap();
        assert_eq!(handle.lines(), vec!["a", "h", "O", "l"]);
    }

    #[tokio::test]
    async fn test_writer_survives_write_failures() {
        let (sink, handle) = MockSink::new();
        let (commands, rx) = CommandSender::channel(8);
        handle.set_fail_writes(true);

        commands.send(DeviceCommand::Heartbeat);
        commands.send(DeviceCommand::Heartbeat);
        drop(commands);

        let writer = spawn_writer(sink, rx);
        writer.await.unwrap().unwrap();
        assert!(handle.written().is_empty());
    }
}
