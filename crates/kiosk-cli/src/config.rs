//! `kiosk.toml` loading.
//!
//! Every section is optional. A missing file is not an error either: the
//! daemon then runs on defaults plus command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use kiosk_directory::{CreditsConfig, IdentityConfig};
use kiosk_hardware::SerialConfig;
use kiosk_session::SessionConfig;

/// Full daemon configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub serial: SerialConfig,
    pub session: SessionConfig,
    pub identity: IdentityConfig,
    pub credits: CreditsConfig,
    pub ledger: LedgerConfig,
    pub logging: LoggingConfig,
}

/// `[ledger]` section. No path, no ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: Option<PathBuf>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory of the daily log files.
    pub dir: PathBuf,

    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            level: "info".to_string(),
        }
    }
}

/// Command-line values that override the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_dir: Option<PathBuf>,
}

impl KioskConfig {
    /// Load `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(port) = overrides.port {
            self.serial.port = port;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.session.timeout_secs = timeout;
        }
        if let Some(dir) = overrides.log_dir {
            self.logging.dir = dir;
        }
    }

    /// Check the sections that have their own validation.
    pub fn validate(&self) -> Result<()> {
        self.serial.validate().context("Invalid [serial] section")?;
        self.session.validate().context("Invalid [session] section")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_hardware::ParitySetting;
    use std::time::Duration;

    const SAMPLE: &str = r#"
        [serial]
        port = "/dev/ttyACM0"
        parity = "even"

        [session]
        timeout_secs = 120
        admins = ["jd"]

        [identity]
        kind = "static"
        tokens = { "AB12" = "alice" }

        [credits]
        kind = "memory"
        users = { alice = { credits = 50 } }

        [ledger]
        path = "/var/lib/kiosk/ledger.db"

        [logging]
        dir = "/var/log/kiosk"
        level = "debug"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = KioskConfig::parse(SAMPLE).unwrap();

        assert_eq!(config.serial.port, "/dev/ttyACM0");
        assert_eq!(config.serial.parity, ParitySetting::Even);
        assert_eq!(config.serial.baud_rate, 9_600);
        assert_eq!(config.session.inactivity_timeout(), Duration::from_secs(120));
        assert_eq!(config.session.admins, vec!["jd".to_string()]);
        assert!(matches!(config.identity, IdentityConfig::Static { .. }));
        assert!(matches!(config.credits, CreditsConfig::Memory { .. }));
        assert_eq!(
            config.ledger.path,
            Some(PathBuf::from("/var/lib/kiosk/ledger.db"))
        );
        assert_eq!(config.logging.level, "debug");
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = KioskConfig::parse("").unwrap();

        assert_eq!(config, KioskConfig::default());
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.logging.dir, PathBuf::from("logs"));
        assert!(config.ledger.path.is_none());
    }

    #[test]
    fn test_overrides_win() {
        let mut config = KioskConfig::parse(SAMPLE).unwrap();

        config.apply(Overrides {
            port: Some("/dev/ttyUSB1".to_string()),
            timeout_secs: Some(30),
            log_dir: None,
        });

        assert_eq!(config.serial.port, "/dev/ttyUSB1");
        assert_eq!(config.session.timeout_secs, 30);
        assert_eq!(config.logging.dir, PathBuf::from("/var/log/kiosk"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = KioskConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, KioskConfig::default());
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiosk.toml");
        std::fs::write(&path, "[session]\ntimeout_secs = \"soon\"\n").unwrap();

        let error = KioskConfig::load(&path).unwrap_err();
        assert!(error.to_string().contains("kiosk.toml"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = KioskConfig::default();
        config.apply(Overrides {
            timeout_secs: Some(0),
            ..Default::default()
        });

        assert!(config.validate().is_err());
    }
}
