//! Serial line protocol spoken between the kiosk daemon and its
//! microcontroller.
//!
//! Inbound lines decode into [`SerialEvent`]s, outbound [`DeviceCommand`]s
//! encode into single-byte lines. [`SerialLineCodec`] ties both directions
//! into a `tokio_util` codec that also handles partial reads.

pub mod codec;
pub mod command;
pub mod event;

pub use codec::SerialLineCodec;
pub use command::DeviceCommand;
pub use event::{ParseError, SerialEvent};
