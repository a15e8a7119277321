//! Configuration for signers and verifiers.
//!
//! All configuration can be driven by environment variables.

use std::time::Duration;

use crate::signing_key::DEFAULT_CACHE_CAPACITY;

/// Default maximum age of a signed request, in seconds.
pub const DEFAULT_MAX_REQUEST_AGE_SECS: u64 = 15 * 60;

/// Settings shared by [`crate::Signer`] and [`crate::Verifier`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    /// Maximum number of derived signing keys kept in the LRU cache.
    pub key_cache_capacity: usize,
    /// Maximum distance between `X-Fidem-Date` and the verifier's clock.
    pub max_request_age_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            key_cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_request_age_secs: DEFAULT_MAX_REQUEST_AGE_SECS,
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `FIDEM_KEY_CACHE_CAPACITY` | `1000` |
    /// | `FIDEM_MAX_REQUEST_AGE_SECS` | `900` |
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("FIDEM_KEY_CACHE_CAPACITY") {
            match v.parse() {
                Ok(capacity) => config.key_cache_capacity = capacity,
                Err(_) => tracing::warn!(value = %v, "Ignoring invalid FIDEM_KEY_CACHE_CAPACITY"),
            }
        }
        if let Some(v) = lookup("FIDEM_MAX_REQUEST_AGE_SECS") {
            match v.parse() {
                Ok(secs) => config.max_request_age_secs = secs,
                Err(_) => tracing::warn!(value = %v, "Ignoring invalid FIDEM_MAX_REQUEST_AGE_SECS"),
            }
        }

        config
    }

    /// [`AuthConfig::max_request_age_secs`] as a `Duration`.
    #[must_use]
    pub fn max_request_age(&self) -> Duration {
        Duration::from_secs(self.max_request_age_secs)
    }
}
