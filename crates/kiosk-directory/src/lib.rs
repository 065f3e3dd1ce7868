//! Directory collaborators of the kiosk session.
//!
//! Two contracts sit behind the session state machine:
//!
//! - [`IdentityResolver`]: scanned token to user id
//! - [`CreditStore`]: balance and admin flag lookup, credit increments
//!
//! Every call either returns a value or fails with one of the four
//! [`DirectoryError`] kinds. Implementations:
//!
//! | Backend | Contract | Transport |
//! |---|---|---|
//! | [`TcpIdentityResolver`] | identity | TCP line protocol |
//! | [`StaticIdentityResolver`] | identity | in-memory table |
//! | [`HttpCreditStore`] | credits | HTTP JSON API (`reqwest`) |
//! | [`InMemoryCreditStore`] | credits | in-memory table |
//!
//! [`backends`] holds the enum wrappers the binary selects from config.

pub mod backends;
pub mod error;
pub mod http;
pub mod memory;
pub mod tcp;
pub mod traits;

pub use backends::{AnyCreditStore, AnyIdentityResolver, CreditsConfig, IdentityConfig};
pub use error::{DirectoryError, Result};
pub use http::{HttpCreditConfig, HttpCreditStore};
pub use memory::{InMemoryCreditStore, StaticIdentityResolver};
pub use tcp::{TcpIdentityResolver, TcpResolverConfig};
pub use traits::{CreditStore, IdentityResolver};
