use crate::{
    Result,
    constants::MAX_TOKEN_LENGTH,
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Drink credit amount. Balances and deltas share this unit.
pub type Credits = i64;

/// Identity token id read from the iButton scanner.
///
/// The raw id is normalized (frame terminators and whitespace trimmed,
/// converted to uppercase) so that `i:ab12\r` and `i:AB12` name the same
/// token.
///
/// # Security
/// This type implements constant-time comparison so that matching a scanned
/// token against the current session does not leak where the ids differ.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct TokenId(String);

impl TokenId {
    /// Create a new token id with normalization and validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidToken` if:
    /// - The token is empty after trimming
    /// - The token is longer than `MAX_TOKEN_LENGTH`
    /// - The token contains non-ASCII or control characters
    ///
    /// # Examples
    ///
    /// ```
    /// use kiosk_core::TokenId;
    ///
    /// let token = TokenId::new(" ab12\r\n").unwrap();
    /// assert_eq!(token.as_str(), "AB12");
    /// assert!(TokenId::new("").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self> {
        let token = raw
            .trim_matches(|c: char| c.is_whitespace() || c == '\0')
            .to_uppercase();

        if token.is_empty() {
            return Err(Error::InvalidToken("token is empty".to_string()));
        }

        let len = token.chars().count();
        if len > MAX_TOKEN_LENGTH {
            return Err(Error::InvalidToken(format!(
                "token must be at most {MAX_TOKEN_LENGTH} chars, got {len}"
            )));
        }

        if !token.chars().all(|c| c.is_ascii_graphic()) {
            return Err(Error::InvalidToken(
                "token must be printable ASCII".to_string(),
            ));
        }

        Ok(TokenId(token))
    }

    /// Get the token id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TokenId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TokenId::new(s)
    }
}

impl PartialEq for TokenId {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for TokenId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Directory user id (login name) a token resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new user id.
    ///
    /// Surrounding whitespace is trimmed; the identity service terminates
    /// its answers with a newline.
    ///
    /// # Errors
    /// Returns `Error::InvalidUserId` if the id is empty or contains
    /// whitespace or control characters.
    pub fn new(raw: &str) -> Result<Self> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(Error::InvalidUserId("user id is empty".to_string()));
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::InvalidUserId(format!(
                "user id contains whitespace: {id:?}"
            )));
        }
        Ok(UserId(id.to_string()))
    }

    /// Get the user id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        UserId::new(s)
    }
}

/// Balance and privilege information held by the credit store for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Current drink credit balance.
    pub credits: Credits,

    /// Whether the user is a drink admin.
    pub is_admin: bool,
}

impl UserInfo {
    pub fn new(credits: Credits, is_admin: bool) -> Self {
        Self { credits, is_admin }
    }
}
