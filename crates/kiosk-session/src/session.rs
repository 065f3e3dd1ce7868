//! Session and deposit batch data owned by the controller.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use uuid::Uuid;

use kiosk_core::{Credits, TokenId, UserId, UserInfo};

/// The one logged-in user of the kiosk.
///
/// A value of this type exists only while logged in, so a session always
/// has a user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Correlates log lines of one session.
    pub id: Uuid,

    pub token: TokenId,

    pub user: UserId,

    /// Last balance known to the kiosk.
    pub credits: Credits,

    pub is_admin: bool,

    /// Whether this session opened the money door.
    pub door_open: bool,
}

impl Session {
    pub fn new(token: TokenId, user: UserId, info: UserInfo) -> Self {
        Self {
            id: Uuid::new_v4(),
            token,
            user,
            credits: info.credits,
            is_admin: info.is_admin,
            door_open: false,
        }
    }
}

/// Deposits accumulated since the last commit.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use kiosk_session::MoneyBatch;
/// use tokio::time::Instant;
///
/// let start = Instant::now();
/// let mut batch = MoneyBatch::default();
///
/// batch.add(25, start);
/// batch.add(25, start + Duration::from_millis(800));
///
/// assert!(!batch.is_due(start + Duration::from_secs(2), Duration::from_secs(2)));
/// assert!(batch.is_due(start + Duration::from_millis(2800), Duration::from_secs(2)));
/// assert_eq!(batch.take(), 50);
/// assert!(!batch.is_open());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoneyBatch {
    accumulated: Credits,
    last_deposit: Option<Instant>,
    open: bool,
}

impl MoneyBatch {
    /// Add a deposit, opening the batch if needed.
    ///
    /// Returns `true` if this deposit opened the batch.
    pub fn add(&mut self, amount: u32, now: Instant) -> bool {
        let opened = !self.open;
        self.accumulated = self.accumulated.saturating_add(Credits::from(amount));
        self.last_deposit = Some(now);
        self.open = true;
        opened
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn accumulated(&self) -> Credits {
        self.accumulated
    }

    /// Time of the most recent deposit, kept after the batch is drained.
    pub fn last_deposit(&self) -> Option<Instant> {
        self.last_deposit
    }

    /// Whether the batch has been quiet for the whole debounce window.
    pub fn is_due(&self, now: Instant, debounce: Duration) -> bool {
        self.open
            && self
                .last_deposit
                .is_some_and(|last| now.saturating_duration_since(last) >= debounce)
    }

    /// Whether `now` is still inside the settle window of the last deposit.
    pub fn is_settling(&self, now: Instant, settle: Duration) -> bool {
        self.last_deposit
            .is_some_and(|last| now.saturating_duration_since(last) < settle)
    }

    /// Drain the batch and close it. The settle clock is kept.
    pub fn take(&mut self) -> Credits {
        self.open = false;
        std::mem::take(&mut self.accumulated)
    }

    /// Forget everything, including the settle clock.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
