//! Storage layer for the kiosk deposit ledger.
//!
//! The kiosk keeps one persistent number per user: the running total of money
//! committed through this machine. It is used to reconcile the cash box
//! against the directory, nothing more.
//!
//! - [`Database`] - SQLite connection pool with embedded migrations
//! - [`DepositLedger`] - repository trait, [`SqliteDepositLedger`] implementation
//!
//! # Examples
//!
//! ```no_run
//! use kiosk_core::UserId;
//! use kiosk_storage::{Database, DatabaseConfig, DepositLedger, SqliteDepositLedger};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("kiosk.db")).await?;
//! let ledger = SqliteDepositLedger::new(db.pool().clone());
//!
//! let total = ledger.record_deposit(&UserId::new("alice")?, 50).await?;
//! println!("alice has deposited {total} credits here");
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod ledger;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use ledger::{DepositLedger, DepositTotal, SqliteDepositLedger};
