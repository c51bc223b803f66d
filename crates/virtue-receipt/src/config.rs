//! Configuration for verification calls and the remote client.

use std::time::Duration;

use crate::error::{Result, VerifyError};

/// Per-call verification options.
///
/// Passed to every [`crate::Verifier`] call rather than bound at
/// construction, so one verifier can serve strict and lenient callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyConfig {
    /// Fail verification on a broken chain link instead of warning.
    pub strict_chain: bool,
}

impl VerifyConfig {
    /// Lenient configuration: chain failures become warnings.
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Strict configuration: chain failures are fatal.
    pub fn strict() -> Self {
        Self { strict_chain: true }
    }

    /// Set whether chain failures are fatal.
    pub fn with_strict_chain(mut self, strict: bool) -> Self {
        self.strict_chain = strict;
        self
    }
}

/// Environment variable holding the service base URL.
pub const ENV_API_URL: &str = "VIRTUE_API_URL";
/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "VIRTUE_API_KEY";
/// Environment variable holding the issuer key id.
pub const ENV_ISSUER_KEY_ID: &str = "VIRTUE_ISSUER_KEY_ID";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "VIRTUE_TIMEOUT_SECS";

/// Request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a client of the remote verification service.
///
/// Construction validates every field, so a `ClientConfig` that exists is
/// usable.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: String,
    issuer_key_id: String,
    timeout: Duration,
}

impl ClientConfig {
    /// Create a validated configuration.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        issuer_key_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let api_key = api_key.into().trim().to_string();
        let issuer_key_id = issuer_key_id.into().trim().to_string();

        if base_url.is_empty() {
            return Err(VerifyError::Config("base URL is required".into()));
        }
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(VerifyError::Config(format!(
                "base URL must use http or https: {base_url}"
            )));
        }
        if api_key.is_empty() {
            return Err(VerifyError::Config("API key is required".into()));
        }
        if issuer_key_id.is_empty() {
            return Err(VerifyError::Config("issuer key id is required".into()));
        }
        if timeout.is_zero() {
            return Err(VerifyError::Config("timeout must be non-zero".into()));
        }

        Ok(Self {
            base_url,
            api_key,
            issuer_key_id,
            timeout,
        })
    }

    /// Read configuration from the `VIRTUE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| VerifyError::Config(format!("{key} is not set")))
        };

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    VerifyError::Config(format!("{ENV_TIMEOUT_SECS} is not a number: {raw}"))
                })?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        Self::new(
            required(ENV_API_URL)?,
            required(ENV_API_KEY)?,
            required(ENV_ISSUER_KEY_ID)?,
            timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn issuer_key_id(&self) -> &str {
        &self.issuer_key_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL of the verify endpoint.
    pub fn verify_url(&self) -> String {
        format!("{}/v1/verify", self.base_url)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("issuer_key_id", &self.issuer_key_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}
