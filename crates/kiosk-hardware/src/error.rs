//! Error types for the serial link.
//!
//! These errors cover opening and configuring the port and moving bytes over
//! it. None of them is fatal to a running kiosk: the reader and writer tasks
//! log them and keep going.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while talking to the kiosk microcontroller.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Port could not be opened.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Invalid link settings.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// The task on the other end of a channel has gone away.
    #[error("Channel closed: {channel}")]
    ChannelClosed { channel: String },

    /// Error reported by the serial port driver.
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a new channel closed error.
    pub fn channel_closed(channel: impl Into<String>) -> Self {
        Self::ChannelClosed {
            channel: channel.into(),
        }
    }
}
