//! Control requests from the kiosk front panel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use kiosk_core::Error;

/// A button press forwarded to the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlRequest {
    /// The logout button.
    Logout,

    /// The money-door button (admins only).
    ToggleMoneyDoor,
}

impl fmt::Display for ControlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlRequest::Logout => write!(f, "logout"),
            ControlRequest::ToggleMoneyDoor => write!(f, "door"),
        }
    }
}

impl FromStr for ControlRequest {
    type Err = Error;

    /// Parse a control line such as `logout` or `door`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiosk_session::ControlRequest;
    ///
    /// assert_eq!(" Logout\n".parse::<ControlRequest>().unwrap(), ControlRequest::Logout);
    /// assert!("dance".parse::<ControlRequest>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logout" | "l" => Ok(ControlRequest::Logout),
            "door" | "d" => Ok(ControlRequest::ToggleMoneyDoor),
            other => Err(Error::UnknownControlRequest(other.to_string())),
        }
    }
}
