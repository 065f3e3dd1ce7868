//! `[session]` configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use kiosk_core::UserId;
use kiosk_core::constants::{
    DEFAULT_CALL_TIMEOUT_MS, DEFAULT_DEBOUNCE_MS, DEFAULT_HEARTBEAT_MS,
    DEFAULT_INACTIVITY_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_MS,
};
use kiosk_core::{Error, Result};

/// Session timers and admin overrides.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use kiosk_session::SessionConfig;
///
/// let config: SessionConfig = toml::from_str(r#"
///     timeout_secs = 60
///     admins = ["jd"]
/// "#).unwrap();
///
/// assert_eq!(config.inactivity_timeout(), Duration::from_secs(60));
/// assert_eq!(config.debounce_window(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Inactivity before a logged-in user is logged out.
    pub timeout_secs: u64,

    /// Quiet time after the last deposit before the batch is committed.
    pub debounce_ms: u64,

    /// Time after the last deposit during which logout is deferred.
    pub settle_ms: u64,

    /// Timer check cadence of the main loop.
    pub poll_interval_ms: u64,

    /// Upper bound on one directory call.
    pub call_timeout_ms: u64,

    /// Heartbeat period of the device link.
    pub heartbeat_ms: u64,

    /// User ids treated as drink admins whatever the directory says.
    pub admins: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_INACTIVITY_TIMEOUT_SECS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            settle_ms: DEFAULT_SETTLE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            heartbeat_ms: DEFAULT_HEARTBEAT_MS,
            admins: Vec::new(),
        }
    }
}

impl SessionConfig {
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn heartbeat_period(&self) -> Duration {
        Duration::from_millis(self.heartbeat_ms)
    }

    /// Whether `user` is on the admin override list.
    pub fn is_admin_override(&self, user: &UserId) -> bool {
        self.admins.iter().any(|admin| admin == user.as_str())
    }

    /// Check that every timer is usable.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first zero-length timer or
    /// malformed admin id.
    pub fn validate(&self) -> Result<()> {
        let timers = [
            ("timeout_secs", self.timeout_secs),
            ("poll_interval_ms", self.poll_interval_ms),
            ("call_timeout_ms", self.call_timeout_ms),
            ("heartbeat_ms", self.heartbeat_ms),
        ];
        if let Some((name, _)) = timers.iter().find(|(_, value)| *value == 0) {
            return Err(Error::Config(format!("session.{name} must be greater than zero")));
        }

        for admin in &self.admins {
            UserId::new(admin)
                .map_err(|e| Error::Config(format!("session.admins: {e}")))?;
        }

        Ok(())
    }
}
