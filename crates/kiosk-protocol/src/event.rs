//! Inbound serial events.
//!
//! Every non-empty line received from the microcontroller is classified by
//! its two-character prefix:
//!
//! ```text
//! i:<token>  -> SerialEvent::TokenScanned
//! m:<n>      -> SerialEvent::MoneyDeposited
//! otherwise  -> SerialEvent::InvalidInput
//! ```
//!
//! Malformed payloads never abort decoding. A bad `m:` amount or an unusable
//! token produces a [`ParseError`], which [`SerialEvent::from_line`] logs and
//! folds into [`SerialEvent::InvalidInput`] so that no credit is applied.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use kiosk_core::TokenId;
use kiosk_core::constants::{MONEY_PREFIX, TOKEN_PREFIX};

/// Errors raised while classifying a line that carries a known prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The `m:` payload is not a non-negative integer.
    #[error("Invalid deposit amount {raw:?}: {reason}")]
    InvalidAmount { raw: String, reason: String },

    /// The `i:` payload is not a usable token id.
    #[error("Invalid token {raw:?}: {reason}")]
    InvalidToken { raw: String, reason: String },
}

/// A typed event decoded from one serial line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SerialEvent {
    /// An identity token was presented to the scanner.
    TokenScanned(TokenId),

    /// The acceptor took `n` credit units.
    MoneyDeposited(u32),

    /// A line that is not part of the protocol, kept verbatim for logging.
    InvalidInput(String),
}

impl SerialEvent {
    /// Strictly classify a single line.
    ///
    /// Trailing frame terminators (`\r`, `\n`, NUL) are stripped first.
    ///
    /// # Returns
    ///
    /// - `Ok(None)` for an empty line (a partial or idle read, not an error)
    /// - `Ok(Some(event))` for a well-formed line or an unknown prefix
    /// - `Err(ParseError)` for a known prefix with a malformed payload
    ///
    /// # Examples
    ///
    /// ```
    /// use kiosk_protocol::SerialEvent;
    ///
    /// let event = SerialEvent::parse("m:25\r\n").unwrap().unwrap();
    /// assert_eq!(event, SerialEvent::MoneyDeposited(25));
    ///
    /// assert!(SerialEvent::parse("").unwrap().is_none());
    /// assert!(SerialEvent::parse("m:-1").is_err());
    /// ```
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim_end_matches(['\r', '\n', '\0']);
        if line.trim().is_empty() {
            return Ok(None);
        }

        if let Some(raw) = line.strip_prefix(TOKEN_PREFIX) {
            let token = TokenId::new(raw).map_err(|e| ParseError::InvalidToken {
                raw: raw.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(Some(Self::TokenScanned(token)));
        }

        if let Some(raw) = line.strip_prefix(MONEY_PREFIX) {
            let amount = raw
                .trim()
                .parse::<u32>()
                .map_err(|e| ParseError::InvalidAmount {
                    raw: raw.to_string(),
                    reason: e.to_string(),
                })?;
            return Ok(Some(Self::MoneyDeposited(amount)));
        }

        Ok(Some(Self::InvalidInput(line.to_string())))
    }

    /// Classify a line, folding parse errors into `InvalidInput`.
    ///
    /// This is the lenient entry point used by the serial reader: the error
    /// is logged and the raw line is kept so the state machine can report it.
    pub fn from_line(line: &str) -> Option<Self> {
        match Self::parse(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Discarding malformed serial line");
                Some(Self::InvalidInput(
                    line.trim_end_matches(['\r', '\n', '\0']).to_string(),
                ))
            }
        }
    }

    /// Short name of the event kind, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokenScanned(_) => "token_scanned",
            Self::MoneyDeposited(_) => "money_deposited",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

impl fmt::Display for SerialEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenScanned(token) => write!(f, "{TOKEN_PREFIX}{token}"),
            Self::MoneyDeposited(amount) => write!(f, "{MONEY_PREFIX}{amount}"),
            Self::InvalidInput(raw) => write!(f, "{raw}"),
        }
    }
}
