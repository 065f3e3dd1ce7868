#![allow(async_fn_in_trait)]

//! Collaborator contracts used by the session state machine.
//!
//! Both traits use native async trait methods (Edition 2024), so they are
//! not object safe; backends are selected through the enum wrappers in
//! [`crate::backends`].

use kiosk_core::{Credits, TokenId, UserId, UserInfo};

use crate::Result;

/// Maps a scanned token to the user it belongs to.
pub trait IdentityResolver: Send + Sync {
    /// Resolve `token` to a user id.
    ///
    /// # Errors
    ///
    /// `NotFound` when no user owns the token; other kinds when the service
    /// could not answer.
    async fn resolve(&self, token: &TokenId) -> Result<UserId>;
}

/// Holds each user's drink-credit balance and admin flag.
pub trait CreditStore: Send + Sync {
    /// Fetch the current balance and admin flag.
    async fn get_user_info(&self, user: &UserId) -> Result<UserInfo>;

    /// Add `delta` to the balance and return the new balance.
    ///
    /// The write applies in full or not at all. Implementations re-read the
    /// current balance immediately before computing the new value.
    async fn increment_credits(&self, user: &UserId, delta: Credits) -> Result<Credits>;
}
