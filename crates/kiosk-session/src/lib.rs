//! Session and transaction state machine of the vending kiosk.
//!
//! The [`SessionController`] sits between the serial device and the
//! directory. It turns a noisy stream of serial events into at most one
//! authenticated session, batches deposits into single credit increments,
//! and never lets a logout overtake money that is still being committed.
//!
//! ```text
//!  SerialEvent ──►┌───────────────────┐──► DeviceCommand (a, l, O, C)
//!                 │ SessionController │
//! ControlRequest ►│  StateMachine     │──► Notification (NewUser, MoneyAdded,
//!                 │  Session, Batch   │                  Logout, AppendLog)
//!   timer tick ──►└─────────┬─────────┘
//!                           │ resolve / get_user_info / increment_credits
//!                           ▼
//!                IdentityResolver, CreditStore
//! ```

pub mod config;
pub mod control;
pub mod controller;
pub mod notification;
pub mod session;
pub mod state_machine;

pub use config::SessionConfig;
pub use control::ControlRequest;
pub use controller::{LogoutReason, SessionController};
pub use notification::{Notification, Notifier};
pub use session::{MoneyBatch, Session};
pub use state_machine::{
    MAX_HISTORY_SIZE, SessionState, StateMachine, StateMachineBuilder, StateTransition,
};
