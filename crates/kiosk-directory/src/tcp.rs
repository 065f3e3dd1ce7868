//! TCP line-protocol identity resolver.
//!
//! The identity service speaks a one-shot line protocol: the client connects,
//! writes the token id followed by a newline and reads back one line holding
//! the user id. An empty answer means the token is unknown.
//!
//! ```text
//! client ── "0000DEADBEEF\n" ──► service
//! client ◄── "alice\n"        ── service
//! ```
//!
//! # Design Principles
//!
//! - **One connection per lookup**: logins are rare, so no pooling
//! - **No automatic retry**: a failed scan is retried by scanning again
//! - **Bounded**: connect, write and read share one deadline

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, trace, warn};

use kiosk_core::constants::DEFAULT_CALL_TIMEOUT_MS;
use kiosk_core::{TokenId, UserId};

use crate::{DirectoryError, IdentityResolver, Result};

/// Longest reply line accepted from the identity service.
const MAX_REPLY_LENGTH: usize = 256;

/// Configuration for the TCP identity resolver.
///
/// # Example
///
/// ```
/// use kiosk_directory::TcpResolverConfig;
/// use std::time::Duration;
///
/// let config = TcpResolverConfig {
///     address: "auth.local:56123".to_string(),
///     timeout: Duration::from_millis(2000),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpResolverConfig {
    /// `host:port` of the identity service
    pub address: String,

    /// Deadline for the whole exchange
    pub timeout: Duration,
}

impl Default for TcpResolverConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:56123".to_string(),
            timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
        }
    }
}

/// Identity resolver backed by the TCP line protocol.
#[derive(Debug, Clone)]
pub struct TcpIdentityResolver {
    config: TcpResolverConfig,
}

impl TcpIdentityResolver {
    pub fn new(config: TcpResolverConfig) -> Self {
        debug!(address = %config.address, "Creating TCP identity resolver");
        Self { config }
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    async fn exchange(&self, token: &TokenId) -> Result<UserId> {
        let stream = TcpStream::connect(&self.config.address)
            .await
            .map_err(|e| {
                DirectoryError::unavailable(format!(
                    "identity service {}: {e}",
                    self.config.address
                ))
            })?;
        stream.set_nodelay(true)?;

        let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_REPLY_LENGTH));

        framed.send(token.as_str()).await.map_err(codec_error)?;
        trace!(token = %token, "Identity lookup sent");

        let reply = match framed.next().await {
            Some(Ok(line)) => line,
            Some(Err(e)) => return Err(codec_error(e)),
            None => String::new(),
        };

        if reply.trim().is_empty() {
            return Err(DirectoryError::not_found(format!("token {token}")));
        }

        UserId::new(&reply).map_err(|e| DirectoryError::malformed(e.to_string()))
    }
}

impl IdentityResolver for TcpIdentityResolver {
    async fn resolve(&self, token: &TokenId) -> Result<UserId> {
        let timeout = self.config.timeout;

        match tokio::time::timeout(timeout, self.exchange(token)).await {
            Ok(Ok(user)) => {
                debug!(token = %token, user = %user, "Token resolved");
                Ok(user)
            }
            Ok(Err(e)) => {
                debug!(token = %token, error = %e, "Token lookup failed");
                Err(e)
            }
            Err(_) => {
                warn!(
                    address = %self.config.address,
                    timeout_ms = timeout.as_millis() as u64,
                    "Identity lookup timed out"
                );
                Err(DirectoryError::unavailable(format!(
                    "identity lookup timed out after {}ms",
                    timeout.as_millis()
                )))
            }
        }
    }
}

fn codec_error(e: LinesCodecError) -> DirectoryError {
    match e {
        LinesCodecError::MaxLineLengthExceeded => {
            DirectoryError::malformed("identity reply exceeds maximum length")
        }
        LinesCodecError::Io(e) => e.into(),
    }
}
