//! Serial link to the kiosk microcontroller.
//!
//! The microcontroller owns the iButton scanner and the coin/bill acceptor
//! and talks to the host over a single serial line. This crate provides:
//!
//! - [`serial`]: port settings and opening via `serialport`
//! - [`reader`]: a blocking, lazy iterator of decoded [`SerialEvent`]s
//! - [`writer`]: a single writer task fed by cloneable [`CommandSender`]s
//! - [`heartbeat`]: the 1 Hz `h` emitter the acceptor needs to stay armed
//! - [`manager`]: wiring of the above into one running link
//! - [`mock`]: scripted sources and capturing sinks for tests
//!
//! # Threading
//!
//! Serial ports are blocking handles, so the reader and the writer each run
//! on Tokio's blocking pool and exchange data with async code over `mpsc`
//! channels. The heartbeat is an ordinary async task.
//!
//! [`SerialEvent`]: kiosk_protocol::SerialEvent

pub mod error;
pub mod heartbeat;
pub mod manager;
pub mod mock;
pub mod reader;
pub mod serial;
pub mod writer;

pub use error::{HardwareError, Result};
pub use heartbeat::HeartbeatEmitter;
pub use manager::{DeviceLink, LinkConfig, LinkHandle, LinkTasks};
pub use reader::{EventReader, spawn_reader};
pub use serial::{ParitySetting, SerialConfig, SerialLink};
pub use writer::{CommandSender, spawn_writer};
