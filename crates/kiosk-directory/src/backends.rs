//! Enum wrappers for collaborator dispatch.
//!
//! Native `async fn` in traits are not object safe, so `Box<dyn CreditStore>`
//! is not an option. The session controller is generic over the traits and
//! the binary picks a backend at startup through these enums, built from the
//! `[identity]` and `[credits]` config sections.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use kiosk_directory::backends::{AnyIdentityResolver, IdentityConfig};
//!
//! let config: IdentityConfig = toml::from_str(r#"
//!     kind = "tcp"
//!     address = "auth.local:56123"
//! "#).unwrap();
//!
//! let resolver = AnyIdentityResolver::from_config(&config, Duration::from_secs(5)).unwrap();
//! assert!(matches!(resolver, AnyIdentityResolver::Tcp(_)));
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use kiosk_core::{Credits, TokenId, UserId, UserInfo};

use crate::http::{HttpCreditConfig, HttpCreditStore};
use crate::memory::{InMemoryCreditStore, StaticIdentityResolver};
use crate::tcp::{TcpIdentityResolver, TcpResolverConfig};
use crate::{CreditStore, DirectoryError, IdentityResolver, Result};

/// `[identity]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IdentityConfig {
    /// TCP line-protocol identity service.
    Tcp { address: String },

    /// Fixed token table, raw token id to user id.
    Static {
        #[serde(default)]
        tokens: HashMap<String, String>,
    },
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self::Tcp {
            address: TcpResolverConfig::default().address,
        }
    }
}

/// One user of the in-memory credit store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUser {
    pub credits: Credits,
    #[serde(default)]
    pub admin: bool,
}

/// `[credits]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CreditsConfig {
    /// HTTP credit API.
    Http {
        base_url: String,
        #[serde(default)]
        api_key: Option<String>,
    },

    /// In-memory user table.
    Memory {
        #[serde(default)]
        users: HashMap<String, MemoryUser>,
    },
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self::Http {
            base_url: HttpCreditConfig::default().base_url,
            api_key: None,
        }
    }
}

/// Enum wrapper for identity resolver dispatch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyIdentityResolver {
    Tcp(TcpIdentityResolver),
    Static(StaticIdentityResolver),
}

impl AnyIdentityResolver {
    /// Build the configured resolver.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` if a static token or user id is invalid.
    pub fn from_config(config: &IdentityConfig, timeout: Duration) -> Result<Self> {
        match config {
            IdentityConfig::Tcp { address } => {
                Ok(Self::Tcp(TcpIdentityResolver::new(TcpResolverConfig {
                    address: address.clone(),
                    timeout,
                })))
            }
            IdentityConfig::Static { tokens } => {
                let pairs = tokens
                    .iter()
                    .map(|(token, user)| {
                        let token = TokenId::new(token)
                            .map_err(|e| DirectoryError::malformed(e.to_string()))?;
                        let user = UserId::new(user)
                            .map_err(|e| DirectoryError::malformed(e.to_string()))?;
                        Ok((token, user))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Static(StaticIdentityResolver::from_pairs(pairs)))
            }
        }
    }
}

impl IdentityResolver for AnyIdentityResolver {
    async fn resolve(&self, token: &TokenId) -> Result<UserId> {
        match self {
            Self::Tcp(resolver) => resolver.resolve(token).await,
            Self::Static(resolver) => resolver.resolve(token).await,
        }
    }
}

/// Enum wrapper for credit store dispatch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyCreditStore {
    Http(HttpCreditStore),
    Memory(InMemoryCreditStore),
}

impl AnyCreditStore {
    /// Build the configured store.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` for an invalid user id in a memory table, or
    /// `ServiceUnavailable` if the HTTP client cannot be built.
    pub fn from_config(config: &CreditsConfig, timeout: Duration) -> Result<Self> {
        match config {
            CreditsConfig::Http { base_url, api_key } => {
                let store = HttpCreditStore::new(HttpCreditConfig {
                    base_url: base_url.clone(),
                    api_key: api_key.clone(),
                    timeout,
                })?;
                Ok(Self::Http(store))
            }
            CreditsConfig::Memory { users } => {
                let mut store = InMemoryCreditStore::new();
                for (user, entry) in users {
                    let user =
                        UserId::new(user).map_err(|e| DirectoryError::malformed(e.to_string()))?;
                    store = store.with_user(user, UserInfo::new(entry.credits, entry.admin));
                }
                Ok(Self::Memory(store))
            }
        }
    }
}

impl CreditStore for AnyCreditStore {
    async fn get_user_info(&self, user: &UserId) -> Result<UserInfo> {
        match self {
            Self::Http(store) => store.get_user_info(user).await,
            Self::Memory(store) => store.get_user_info(user).await,
        }
    }

    async fn increment_credits(&self, user: &UserId, delta: Credits) -> Result<Credits> {
        match self {
            Self::Http(store) => store.increment_credits(user, delta).await,
            Self::Memory(store) => store.increment_credits(user, delta).await,
        }
    }
}
