//! Client configuration, loaded explicitly or from environment variables.
//!
//! # Environment Variables
//!
//! - `TDA_API_KEY`: application key sent as `apikey` (required)
//! - `TDA_ACCOUNT_ID`: account used by account-scoped operations (optional)
//! - `TDA_BASE_URL`: API host (default: `https://api.tdameritrade.com`)

use std::fmt;

use url::Url;

use crate::error::ApiError;

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.tdameritrade.com";

/// API key and optional account id. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    account_id: Option<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, account_id: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            account_id,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("account_id", &self.account_id)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::new(api_key, None),
        }
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.credentials.account_id = Some(account_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Check that `base_url` is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ApiError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidConfig(format!("base URL {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidConfig(format!(
                "base URL {:?}: unsupported scheme {}",
                self.base_url,
                url.scheme()
            )));
        }
        Ok(())
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("TDA_API_KEY").ok_or(ApiError::MissingConfig("TDA_API_KEY"))?;
        let mut config = Self::new(api_key);
        if let Some(account_id) = get("TDA_ACCOUNT_ID") {
            config = config.with_account_id(account_id);
        }
        if let Some(base_url) = get("TDA_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        config.validate()?;
        Ok(config)
    }
}
