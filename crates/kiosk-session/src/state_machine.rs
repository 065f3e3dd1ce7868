//! Session state machine.
//!
//! This module tracks which phase of a kiosk session the controller is in
//! and rejects transitions that would break the one-session-at-a-time rule.
//! It holds no session data itself; the controller owns the user, balance and
//! deposit batch and consults the machine before changing phase.
//!
//! # States
//!
//! - `LoggedOut`: No user; the acceptor is disarmed
//! - `LoggedInIdle`: A user is logged in, no deposit batch is open
//! - `LoggedInCounting`: A deposit batch is open and waiting for the debounce window
//! - `LoggingOut`: Logout was requested and waits for money to settle
//!
//! # Valid Transitions
//!
//! - LoggedOut → LoggedInIdle (token resolved, balance fetched)
//! - LoggedInIdle → LoggedInCounting → LoggedInIdle (deposit batch opened, then committed)
//! - LoggedInIdle → LoggedOut (immediate logout)
//! - LoggedInIdle/LoggedInCounting → LoggingOut → LoggedOut (deferred logout)
//!
//! # Examples
//!
//! ```
//! use kiosk_session::{SessionState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_state(), &SessionState::LoggedOut);
//!
//! machine.transition_to(SessionState::LoggedInIdle).unwrap();
//! assert!(machine.current_state().is_logged_in());
//!
//! // A second login is rejected
//! assert!(machine.transition_to(SessionState::LoggedInIdle).is_err());
//! ```
//!
//! # Builder Pattern
//!
//! ```
//! use kiosk_session::{SessionState, StateMachine};
//!
//! let machine = StateMachine::builder()
//!     .with_initial_state(SessionState::LoggedInCounting)
//!     .build();
//!
//! assert_eq!(machine.current_state(), &SessionState::LoggedInCounting);
//! ```

use kiosk_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tokio::time::Instant;

/// Maximum number of state transitions to keep in history.
///
/// Older transitions are dropped first.
pub const MAX_HISTORY_SIZE: usize = 100;

/// Phase of the kiosk session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nobody is logged in.
    LoggedOut,

    /// A user is logged in and no money is pending.
    LoggedInIdle,

    /// Deposits are being batched for the logged-in user.
    LoggedInCounting,

    /// Logout is pending until the open batch commits and settles.
    LoggingOut,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::LoggedOut => write!(f, "LoggedOut"),
            SessionState::LoggedInIdle => write!(f, "LoggedInIdle"),
            SessionState::LoggedInCounting => write!(f, "LoggedInCounting"),
            SessionState::LoggingOut => write!(f, "LoggingOut"),
        }
    }
}

impl SessionState {
    /// Check if a transition from this state to another is valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiosk_session::SessionState;
    ///
    /// assert!(SessionState::LoggedOut.can_transition_to(&SessionState::LoggedInIdle));
    /// assert!(!SessionState::LoggedInCounting.can_transition_to(&SessionState::LoggedOut));
    /// ```
    pub fn can_transition_to(&self, next: &SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, next),
            // From LoggedOut
            (LoggedOut, LoggedInIdle)
            // From LoggedInIdle
            | (LoggedInIdle, LoggedInCounting)
            | (LoggedInIdle, LoggingOut)
            | (LoggedInIdle, LoggedOut)
            // From LoggedInCounting
            | (LoggedInCounting, LoggedInIdle)
            | (LoggedInCounting, LoggingOut)
            // From LoggingOut
            | (LoggingOut, LoggedOut)
        )
    }

    /// Whether a user session exists in this state.
    ///
    /// `LoggingOut` still counts: the user stays attached until the
    /// deferred logout is finalized.
    pub fn is_logged_in(&self) -> bool {
        !matches!(self, SessionState::LoggedOut)
    }
}

/// Represents a single state transition with timestamp.
///
/// The `timestamp` field is not serialized; `Instant` is process-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: SessionState,

    /// The state transitioned to.
    pub to: SessionState,

    /// When the transition occurred.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: SessionState, to: SessionState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// Guards the session phase and records its history.
///
/// The machine is owned by the session controller; it is not shared
/// between tasks.
#[derive(Debug)]
pub struct StateMachine {
    current_state: SessionState,
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in the `LoggedOut` state.
    pub fn new() -> Self {
        Self {
            current_state: SessionState::LoggedOut,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    /// Create a builder for a machine restored to a specific state.
    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder::default()
    }

    pub fn current_state(&self) -> &SessionState {
        &self.current_state
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not
    /// allowed from the current state. The machine is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiosk_session::{SessionState, StateMachine};
    ///
    /// let mut machine = StateMachine::new();
    ///
    /// let transition = machine.transition_to(SessionState::LoggedInIdle).unwrap();
    /// assert_eq!(transition.from, SessionState::LoggedOut);
    ///
    /// // Counting always ends in a commit before logout
    /// machine.transition_to(SessionState::LoggedInCounting).unwrap();
    /// assert!(machine.transition_to(SessionState::LoggedOut).is_err());
    /// ```
    pub fn transition_to(&mut self, new_state: SessionState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.current_state = new_state;

        self.history.push_back(transition.clone());
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        Ok(transition)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`StateMachine`].
#[derive(Debug)]
pub struct StateMachineBuilder {
    initial_state: SessionState,
}

impl StateMachineBuilder {
    pub fn with_initial_state(mut self, state: SessionState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine {
            current_state: self.initial_state,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }
}

impl Default for StateMachineBuilder {
    fn default() -> Self {
        Self {
            initial_state: SessionState::LoggedOut,
        }
    }
}
