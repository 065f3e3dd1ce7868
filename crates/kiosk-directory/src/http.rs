//! HTTP credit API client.
//!
//! The credit API exposes one resource per user:
//!
//! ```text
//! GET /users/{uid}           -> {"credits": 50, "admin": false}
//! PUT /users/{uid}/credits   <- {"credits": 100}
//! ```
//!
//! The API has no atomic increment, so [`HttpCreditStore::increment_credits`]
//! reads the balance immediately before writing `balance + delta`. A write by
//! another client between the two requests is lost; keeping the window short
//! is the only mitigation available.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kiosk_core::constants::DEFAULT_CALL_TIMEOUT_MS;
use kiosk_core::{Credits, UserId, UserInfo};

use crate::{CreditStore, DirectoryError, Result};

/// Configuration for the HTTP credit store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCreditConfig {
    /// Base URL, e.g. `https://drink.example.org/api`
    pub base_url: String,

    /// Bearer token sent with every request
    pub api_key: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpCreditConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            api_key: None,
            timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    credits: Credits,
    #[serde(default)]
    admin: bool,
}

#[derive(Debug, Serialize)]
struct CreditUpdate {
    credits: Credits,
}

/// Credit store backed by the HTTP credit API.
#[derive(Debug, Clone)]
pub struct HttpCreditStore {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpCreditStore {
    /// Build the store and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` if the base URL cannot carry a path, and
    /// `ServiceUnavailable` if the TLS backend cannot be initialized.
    pub fn new(config: HttpCreditConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            DirectoryError::malformed(format!("base URL {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DirectoryError::malformed(format!(
                "base URL {} cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DirectoryError::unavailable(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    /// `{base}/users/{uid}/{rest..}` with the user id as one escaped segment.
    fn user_url(&self, user: &UserId, rest: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                DirectoryError::malformed(format!("base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push("users")
            .push(user.as_str())
            .extend(rest);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn fetch(&self, user: &UserId) -> Result<UserRecord> {
        let request = self.authorize(self.client.get(self.user_url(user, &[])?));
        let response = check_status(request.send().await?, user)?;
        let record = response.json::<UserRecord>().await?;
        debug!(user = %user, credits = record.credits, admin = record.admin, "User record fetched");
        Ok(record)
    }
}

impl CreditStore for HttpCreditStore {
    async fn get_user_info(&self, user: &UserId) -> Result<UserInfo> {
        let record = self.fetch(user).await?;
        Ok(UserInfo::new(record.credits, record.admin))
    }

    async fn increment_credits(&self, user: &UserId, delta: Credits) -> Result<Credits> {
        let current = self.fetch(user).await?.credits;
        let credits = current.checked_add(delta).ok_or_else(|| {
            DirectoryError::malformed(format!("balance overflow: {current} + {delta}"))
        })?;

        let url = self.user_url(user, &["credits"])?;
        let request = self
            .authorize(self.client.put(url))
            .json(&CreditUpdate { credits });
        check_status(request.send().await?, user)?;

        info!(user = %user, delta, old = current, new = credits, "Credits updated");
        Ok(credits)
    }
}

fn check_status(response: Response, user: &UserId) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(DirectoryError::from_status(status, &format!("user {user}")))
    }
}
