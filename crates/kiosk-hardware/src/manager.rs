//! Device link manager.
//!
//! This module wires the serial reader, the command writer and the heartbeat
//! emitter into one running link and hands the session loop a
//! [`LinkHandle`]: an event stream in, a command sender out.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   SerialEvent   ┌─────────────┐
//! │ Reader       │────────────────►│             │
//! │ (blocking)   │     (mpsc)      │  Session    │
//! └──────────────┘                 │  Loop       │
//!                                  │             │
//! ┌──────────────┐  DeviceCommand  │             │
//! │ Writer       │◄────────────────│             │
//! │ (blocking)   │     (mpsc)      └─────────────┘
//! └──────────────┘◄───────┐
//!                         │ h every second
//!                  ┌──────┴───────┐
//!                  │ Heartbeat    │
//!                  └──────────────┘
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use kiosk_hardware::manager::{DeviceLink, LinkConfig};
//! use kiosk_hardware::mock::{MockSink, MockSource};
//!
//! #[tokio::main]
//! async fn main() -> kiosk_hardware::Result<()> {
//!     let source = MockSource::new().line("i:AB12");
//!     let (sink, _output) = MockSink::new();
//!
//!     let mut handle = DeviceLink::new(LinkConfig::default()).start(source, sink);
//!
//!     while let Some(event) = handle.recv().await {
//!         println!("Event: {event}");
//!     }
//!
//!     handle.shutdown().await
//! }
//! ```

use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use kiosk_core::constants::DEFAULT_HEARTBEAT_MS;
use kiosk_protocol::SerialEvent;

use crate::heartbeat::HeartbeatEmitter;
use crate::reader::{EventReader, read_into};
use crate::writer::{CommandSender, DEFAULT_COMMAND_CAPACITY, write_from};
use crate::Result;

/// How long shutdown waits for the blocking tasks to notice.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Link task settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Heartbeat period; `None` disables the emitter.
    pub heartbeat_period: Option<Duration>,

    /// Depth of the inbound event queue.
    pub event_capacity: usize,

    /// Depth of the outbound command queue.
    pub command_capacity: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            heartbeat_period: Some(Duration::from_millis(DEFAULT_HEARTBEAT_MS)),
            event_capacity: 100,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}

/// Builder for a running device link.
#[derive(Debug, Clone, Default)]
pub struct DeviceLink {
    config: LinkConfig,
}

impl DeviceLink {
    pub fn new(config: LinkConfig) -> Self {
        Self { config }
    }

    /// Spawn reader, writer and heartbeat tasks over `source` and `sink`.
    pub fn start<R, W>(self, source: R, sink: W) -> LinkHandle
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel(self.config.event_capacity);
        let (commands, command_rx) = CommandSender::channel(self.config.command_capacity);
        let stop = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();

        let reader = EventReader::new(source).with_stop_flag(Arc::clone(&stop));
        tasks.spawn_blocking(move || read_into(reader, event_tx));
        tasks.spawn_blocking(move || write_from(sink, command_rx));

        if let Some(period) = self.config.heartbeat_period {
            let emitter = HeartbeatEmitter::new(commands.clone(), period);
            tasks.spawn(async move {
                emitter.run().await;
                Ok(())
            });
        }

        LinkHandle {
            event_rx,
            commands,
            stop,
            tasks,
        }
    }
}

/// Handle on a running link.
pub struct LinkHandle {
    event_rx: mpsc::Receiver<SerialEvent>,
    commands: CommandSender,
    stop: Arc<AtomicBool>,
    tasks: JoinSet<Result<()>>,
}

impl LinkHandle {
    /// Receive the next decoded event.
    ///
    /// Returns `None` once the reader has stopped.
    pub async fn recv(&mut self) -> Option<SerialEvent> {
        self.event_rx.recv().await
    }

    /// Sender for queueing device commands.
    pub fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    /// Split into the event receiver and command sender, keeping the tasks.
    ///
    /// The returned [`LinkTasks`] is used to shut the link down later.
    pub fn split(self) -> (mpsc::Receiver<SerialEvent>, CommandSender, LinkTasks) {
        let tasks = LinkTasks {
            stop: self.stop,
            tasks: self.tasks,
        };
        (self.event_rx, self.commands, tasks)
    }

    /// Stop all link tasks.
    pub async fn shutdown(self) -> Result<()> {
        let (_events, commands, tasks) = self.split();
        drop(commands);
        tasks.shutdown().await
    }
}

/// The running tasks of a link, detached from its channels.
pub struct LinkTasks {
    stop: Arc<AtomicBool>,
    tasks: JoinSet<Result<()>>,
}

impl LinkTasks {
    /// Ask the reader to stop at its next read timeout.
    ///
    /// The event stream then ends while the writer keeps draining commands,
    /// so the session loop can still send its final commands.
    pub fn stop_reader(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Signal the reader, abort async tasks and wait briefly for the rest.
    ///
    /// Task errors are logged, not returned; shutdown itself does not fail.
    pub async fn shutdown(mut self) -> Result<()> {
        self.stop.store(true, Ordering::Relaxed);
        self.tasks.abort_all();

        let drain = async {
            while let Some(result) = self.tasks.join_next().await {
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "Link task failed"),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => warn!(error = %e, "Link task panicked"),
                }
            }
        };

        if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
            debug!("Link tasks still blocked after grace period, detaching");
            self.tasks.detach_all();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockSink, MockSource};
    use kiosk_protocol::DeviceCommand;

    #[tokio::test]
    async fn test_link_delivers_events_and_writes_commands() {
        let source = MockSource::new().line("i:ab12").timeout().line("m:25");
        let (sink, output) = MockSink::new();
        let config = LinkConfig {
            heartbeat_period: None,
            ..Default::default()
        };

        let mut handle = DeviceLink::new(config).start(source, sink);

        assert_eq!(handle.recv().await.unwrap().to_string(), "i:AB12");
        assert_eq!(
            handle.recv().await.unwrap(),
            SerialEvent::MoneyDeposited(25)
        );
        assert!(handle.recv().await.is_none());

        handle.commands().send(DeviceCommand::Arm);
        handle.shutdown().await.unwrap();

        assert_eq!(output.lines(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_stopped_reader_leaves_writer_running() {
        let source = MockSource::new().hold_open();
        let (sink, output) = MockSink::new();
        let config = LinkConfig {
            heartbeat_period: None,
            ..Default::default()
        };

        let (mut events, commands, tasks) = DeviceLink::new(config).start(source, sink).split();
        tasks.stop_reader();

        let closed = tokio::time::timeout(Duration::from_secs(1), events.recv()).await;
        assert_eq!(closed.unwrap(), None);

        commands.send(DeviceCommand::LogoutSignal);
        drop(commands);

        let started = std::time::Instant::now();
        tasks.shutdown().await.unwrap();

        assert!(started.elapsed() < SHUTDOWN_GRACE);
        assert_eq!(output.lines(), vec!["l"]);
    }

    #[tokio::test]
    async fn test_link_heartbeat_reaches_sink() {
        let source = MockSource::new().hold_open();
        let (sink, output) = MockSink::new();
        let config = LinkConfig {
            heartbeat_period: Some(Duration::from_millis(10)),
            ..Default::default()
        };

        let handle = DeviceLink::new(config).start(source, sink);
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.shutdown().await.unwrap();

        let lines = output.lines();
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|line| line == "h"));
    }
}
