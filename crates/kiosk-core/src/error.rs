use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Identity errors
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    // Session errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("No active session")]
    NoActiveSession,

    #[error("Unknown control request: {0}")]
    UnknownControlRequest(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
