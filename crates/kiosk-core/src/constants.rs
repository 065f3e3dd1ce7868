//! Core constants for the kiosk serial protocol and session timing.
//!
//! This module centralizes the wire prefixes exchanged with the kiosk
//! microcontroller and the default timings used by the session state machine.
//!
//! # Serial Protocol Structure
//!
//! The link is line oriented. Every inbound line starts with a one-character
//! tag followed by a colon:
//!
//! ```text
//! i:<TOKEN>\n     token scanned (iButton id)
//! m:<INT>\n       credit units deposited
//! ```
//!
//! Outbound commands are a single character terminated by a newline:
//!
//! | Byte | Meaning |
//! |------|---------|
//! | `a` | Arm the coin/bill acceptor |
//! | `l` | Disarm the acceptor / logout signal |
//! | `h` | Heartbeat (sent every second) |
//! | `O` | Open the money door (legacy) |
//! | `C` | Close the money door (legacy) |
//!
//! # Usage
//!
//! ```
//! use kiosk_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(TOKEN_PREFIX, "i:");
//! let debounce = Duration::from_millis(DEFAULT_DEBOUNCE_MS);
//! assert_eq!(debounce.as_secs(), 2);
//! ```

// ============================================================================
// Inbound Line Prefixes
// ============================================================================

/// Prefix of a token-scan line (`i:<token>`).
pub const TOKEN_PREFIX: &str = "i:";

/// Prefix of a money-deposit line (`m:<amount>`).
pub const MONEY_PREFIX: &str = "m:";

/// Line terminator for both directions.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Maximum accepted length of a single inbound line in bytes.
///
/// Lines longer than this are discarded as line noise. Real frames are a
/// handful of bytes; the limit only bounds memory on a stuck or noisy link.
pub const MAX_LINE_LENGTH: usize = 256;

/// Maximum accepted token length in characters after normalization.
pub const MAX_TOKEN_LENGTH: usize = 64;

// ============================================================================
// Outbound Command Bytes
// ============================================================================

/// Arm the acceptor so it accepts money.
pub const CMD_ARM: u8 = b'a';

/// Disarm the acceptor. Also used as the logout signal.
pub const CMD_DISARM: u8 = b'l';

/// Liveness heartbeat.
pub const CMD_HEARTBEAT: u8 = b'h';

/// Open the money door.
pub const CMD_DOOR_OPEN: u8 = b'O';

/// Close the money door.
pub const CMD_DOOR_CLOSE: u8 = b'C';

// ============================================================================
// Session Timing
// ============================================================================

/// Quiet interval after the last deposit before a batch is committed.
///
/// The acceptor emits several `m:` pulses per physical insertion; two
/// seconds comfortably spans one bill or a handful of coins.
pub const DEFAULT_DEBOUNCE_MS: u64 = 2_000;

/// Grace period after the last deposit during which logout is deferred.
pub const DEFAULT_SETTLE_MS: u64 = 2_000;

/// Inactivity period before a logged-in user is logged out (3 minutes).
pub const DEFAULT_INACTIVITY_TIMEOUT_SECS: u64 = 180;

/// Cadence of the main loop's timer checks.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Upper bound on any single identity or credit-store call.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

/// Heartbeat period.
pub const DEFAULT_HEARTBEAT_MS: u64 = 1_000;

// ============================================================================
// Serial Link Defaults
// ============================================================================

/// Default serial device path.
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";

/// Default baud rate of the microcontroller link.
pub const DEFAULT_BAUD_RATE: u32 = 9_600;

/// Default number of data bits (7-bit ASCII framing).
pub const DEFAULT_DATA_BITS: u8 = 7;

/// Default number of stop bits.
pub const DEFAULT_STOP_BITS: u8 = 2;

/// Default read timeout for one non-blocking read attempt.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;
