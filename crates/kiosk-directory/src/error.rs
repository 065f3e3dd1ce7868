use thiserror::Error;

/// Failure of an identity or credit-store call.
///
/// Every backend maps its transport and protocol failures onto these four
/// kinds. Timeouts and connection failures are `ServiceUnavailable`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The token or user does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The service could not be reached or did not answer in time.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service refused the request.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The service answered with something that could not be understood.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Specialized result type for directory operations
pub type Result<T> = std::result::Result<T, DirectoryError>;

impl DirectoryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Map an HTTP status onto an error kind.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            404 => Self::not_found(context.to_string()),
            401 | 403 => Self::permission_denied(format!("{context}: HTTP {status}")),
            408 | 429 | 500..=599 => Self::unavailable(format!("{context}: HTTP {status}")),
            _ => Self::malformed(format!("{context}: unexpected HTTP {status}")),
        }
    }

    /// Short kind name, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::PermissionDenied(_) => "permission_denied",
            Self::Malformed(_) => "malformed",
        }
    }
}

impl From<std::io::Error> for DirectoryError {
    fn from(e: std::io::Error) -> Self {
        Self::ServiceUnavailable(e.to_string())
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::Malformed(e.to_string());
        }
        if let Some(status) = e.status() {
            return Self::from_status(status, "credit store");
        }
        Self::ServiceUnavailable(e.to_string())
    }
}
