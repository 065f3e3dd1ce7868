//! In-memory identity resolver and credit store.
//!
//! Used for bench setups without a directory and throughout the test suite.
//! Both types are cheap to clone; clones share state, so a test can keep a
//! handle to inspect calls and inject failures while the session owns
//! another.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use kiosk_core::{Credits, TokenId, UserId, UserInfo};

use crate::{CreditStore, DirectoryError, IdentityResolver, Result};

#[derive(Debug, Default)]
struct ResolverState {
    tokens: HashMap<TokenId, UserId>,
    failure: Option<DirectoryError>,
    lookups: usize,
}

/// Identity resolver over a fixed token table.
///
/// # Examples
///
/// ```
/// use kiosk_core::{TokenId, UserId};
/// use kiosk_directory::{IdentityResolver, StaticIdentityResolver};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let resolver = StaticIdentityResolver::new()
///     .with_token(TokenId::new("AB12").unwrap(), UserId::new("alice").unwrap());
///
/// let user = resolver.resolve(&TokenId::new("ab12").unwrap()).await.unwrap();
/// assert_eq!(user.as_str(), "alice");
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityResolver {
    state: Arc<Mutex<ResolverState>>,
}

impl StaticIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token mapping. Only valid before the resolver is shared.
    pub fn with_token(self, token: TokenId, user: UserId) -> Self {
        if let Ok(mut state) = self.state.try_lock() {
            state.tokens.insert(token, user);
        }
        self
    }

    /// Build from `(token, user)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (TokenId, UserId)>) -> Self {
        let resolver = Self::new();
        if let Ok(mut state) = resolver.state.try_lock() {
            state.tokens.extend(pairs);
        }
        resolver
    }

    /// Make every lookup fail with `error` until cleared with `None`.
    pub async fn set_failure(&self, error: Option<DirectoryError>) {
        self.state.lock().await.failure = error;
    }

    /// Number of lookups performed so far.
    pub async fn lookups(&self) -> usize {
        self.state.lock().await.lookups
    }
}

impl IdentityResolver for StaticIdentityResolver {
    async fn resolve(&self, token: &TokenId) -> Result<UserId> {
        let mut state = self.state.lock().await;
        state.lookups += 1;

        if let Some(error) = &state.failure {
            return Err(error.clone());
        }

        state
            .tokens
            .get(token)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found(format!("token {token}")))
    }
}

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<UserId, UserInfo>,
    lookup_failure: Option<DirectoryError>,
    increment_failure: Option<DirectoryError>,
    increments: Vec<(UserId, Credits)>,
    latency: Duration,
}

/// Credit store over an in-memory user table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCreditStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryCreditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user. Only valid before the store is shared.
    pub fn with_user(self, user: UserId, info: UserInfo) -> Self {
        if let Ok(mut state) = self.state.try_lock() {
            state.users.insert(user, info);
        }
        self
    }

    /// Delay every call by `latency`, to exercise call timeouts.
    pub fn with_latency(self, latency: Duration) -> Self {
        if let Ok(mut state) = self.state.try_lock() {
            state.latency = latency;
        }
        self
    }

    /// Overwrite a balance, as another kiosk or an admin tool would.
    pub async fn set_credits(&self, user: &UserId, credits: Credits) {
        let mut state = self.state.lock().await;
        if let Some(info) = state.users.get_mut(user) {
            info.credits = credits;
        }
    }

    /// Current balance of `user`, if known.
    pub async fn credits(&self, user: &UserId) -> Option<Credits> {
        self.state.lock().await.users.get(user).map(|info| info.credits)
    }

    /// Make `get_user_info` fail with `error` until cleared with `None`.
    pub async fn set_lookup_failure(&self, error: Option<DirectoryError>) {
        self.state.lock().await.lookup_failure = error;
    }

    /// Make `increment_credits` fail with `error` until cleared with `None`.
    pub async fn set_increment_failure(&self, error: Option<DirectoryError>) {
        self.state.lock().await.increment_failure = error;
    }

    /// Every increment call made so far, successful or not.
    pub async fn increments(&self) -> Vec<(UserId, Credits)> {
        self.state.lock().await.increments.clone()
    }

    async fn simulate_latency(&self) {
        let latency = self.state.lock().await.latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

impl CreditStore for InMemoryCreditStore {
    async fn get_user_info(&self, user: &UserId) -> Result<UserInfo> {
        self.simulate_latency().await;
        let state = self.state.lock().await;

        if let Some(error) = &state.lookup_failure {
            return Err(error.clone());
        }

        state
            .users
            .get(user)
            .copied()
            .ok_or_else(|| DirectoryError::not_found(format!("user {user}")))
    }

    async fn increment_credits(&self, user: &UserId, delta: Credits) -> Result<Credits> {
        self.simulate_latency().await;
        let mut state = self.state.lock().await;
        state.increments.push((user.clone(), delta));

        if let Some(error) = &state.increment_failure {
            return Err(error.clone());
        }

        let info = state
            .users
            .get_mut(user)
            .ok_or_else(|| DirectoryError::not_found(format!("user {user}")))?;

        // Read and write under one lock
        let credits = info
            .credits
            .checked_add(delta)
            .ok_or_else(|| DirectoryError::malformed("balance overflow"))?;
        info.credits = credits;

        debug!(user = %user, delta, credits, "In-memory credits updated");
        Ok(credits)
    }
}
