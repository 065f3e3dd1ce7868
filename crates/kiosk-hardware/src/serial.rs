//! Serial port configuration and opening.
//!
//! The microcontroller speaks 7-bit ASCII at 9600 baud with odd parity and
//! two stop bits. [`SerialConfig`] carries those settings (overridable from
//! the config file) and [`open`] turns them into a [`SerialLink`]: two
//! handles on the same port, one for the reader thread and one for the
//! writer thread.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::info;

use kiosk_core::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_DATA_BITS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_SERIAL_PORT,
    DEFAULT_STOP_BITS,
};

use crate::{HardwareError, Result};

/// Parity setting as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParitySetting {
    None,
    #[default]
    Odd,
    Even,
}

impl From<ParitySetting> for Parity {
    fn from(value: ParitySetting) -> Self {
        match value {
            ParitySetting::None => Parity::None,
            ParitySetting::Odd => Parity::Odd,
            ParitySetting::Even => Parity::Even,
        }
    }
}

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0`.
    pub port: String,

    pub baud_rate: u32,

    /// Data bits per character (5-8).
    pub data_bits: u8,

    pub parity: ParitySetting,

    /// Stop bits (1 or 2).
    pub stop_bits: u8,

    /// Timeout of a single read attempt, in milliseconds.
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DEFAULT_DATA_BITS,
            parity: ParitySetting::default(),
            stop_bits: DEFAULT_STOP_BITS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl SerialConfig {
    /// Driver data bits for this config.
    ///
    /// # Errors
    /// Returns `HardwareError::ConfigurationError` outside 5-8.
    pub fn driver_data_bits(&self) -> Result<DataBits> {
        match self.data_bits {
            5 => Ok(DataBits::Five),
            6 => Ok(DataBits::Six),
            7 => Ok(DataBits::Seven),
            8 => Ok(DataBits::Eight),
            other => Err(HardwareError::configuration(format!(
                "data_bits must be 5-8, got {other}"
            ))),
        }
    }

    /// Driver stop bits for this config.
    ///
    /// # Errors
    /// Returns `HardwareError::ConfigurationError` unless 1 or 2.
    pub fn driver_stop_bits(&self) -> Result<StopBits> {
        match self.stop_bits {
            1 => Ok(StopBits::One),
            2 => Ok(StopBits::Two),
            other => Err(HardwareError::configuration(format!(
                "stop_bits must be 1 or 2, got {other}"
            ))),
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Check every setting without touching the device.
    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(HardwareError::configuration("port must not be empty"));
        }
        if self.baud_rate == 0 {
            return Err(HardwareError::configuration("baud_rate must be positive"));
        }
        if self.read_timeout_ms == 0 {
            return Err(HardwareError::configuration(
                "read_timeout_ms must be positive",
            ));
        }
        self.driver_data_bits()?;
        self.driver_stop_bits()?;
        Ok(())
    }
}

/// An open serial port split into independent read and write handles.
pub struct SerialLink {
    pub reader: Box<dyn SerialPort>,
    pub writer: Box<dyn SerialPort>,
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("port", &self.reader.name())
            .finish()
    }
}

/// Open the serial port described by `config`.
///
/// # Errors
///
/// Returns an error if the settings are invalid, the port cannot be opened,
/// or the handle cannot be cloned for the writer.
pub fn open(config: &SerialConfig) -> Result<SerialLink> {
    config.validate()?;

    let reader = serialport::new(&config.port, config.baud_rate)
        .data_bits(config.driver_data_bits()?)
        .parity(config.parity.into())
        .stop_bits(config.driver_stop_bits()?)
        .flow_control(FlowControl::None)
        .timeout(config.read_timeout())
        .open()
        .map_err(|e| HardwareError::initialization_failed(format!("{}: {e}", config.port)))?;

    let writer = reader.try_clone()?;

    info!(
        port = %config.port,
        baud = config.baud_rate,
        data_bits = config.data_bits,
        parity = ?config.parity,
        stop_bits = config.stop_bits,
        "Serial port opened"
    );

    Ok(SerialLink { reader, writer })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_microcontroller_link() {
        let config = SerialConfig::default();
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.driver_data_bits().unwrap(), DataBits::Seven);
        assert_eq!(Parity::from(config.parity), Parity::Odd);
        assert_eq!(config.driver_stop_bits().unwrap(), StopBits::Two);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_data_bits() {
        let config = SerialConfig {
            data_bits: 9,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HardwareError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_invalid_stop_bits() {
        let config = SerialConfig {
            stop_bits: 3,
            ..Default::default()
        };
        assert!(config.driver_stop_bits().is_err());
    }

    #[test]
    fn test_empty_port_rejected() {
        let config = SerialConfig {
            port: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SerialConfig = toml::from_str(
            r#"
            port = "/dev/ttyACM0"
            parity = "even"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, "/dev/ttyACM0");
        assert_eq!(config.parity, ParitySetting::Even);
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.read_timeout(), Duration::from_millis(100));
    }

    #[test]
    fn test_open_missing_port_fails() {
        let config = SerialConfig {
            port: "/dev/kiosk-does-not-exist".to_string(),
            ..Default::default()
        };
        assert!(open(&config).is_err());
    }
}
