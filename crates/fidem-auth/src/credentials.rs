//! Credentials and credential providers.
//!
//! A signer is handed [`Credentials`] directly, or resolves them from the
//! environment with [`Credentials::from_env`]. A server-side verifier looks
//! them up by access key ID through a [`CredentialProvider`].

use std::collections::HashMap;
use std::fmt;

use crate::error::AuthError;

/// Environment variables consulted for the access key ID, in order.
pub const ACCESS_KEY_ID_VARS: &[&str] = &["FIDEM_ACCESS_KEY_ID", "FIDEM_ACCESS_KEY"];

/// Environment variables consulted for the secret access key, in order.
pub const SECRET_ACCESS_KEY_VARS: &[&str] = &["FIDEM_SECRET_ACCESS_KEY", "FIDEM_SECRET_KEY"];

/// A FIDEM access key pair with an optional session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Public access key identifier.
    pub access_key_id: String,
    /// Secret used to derive signing keys.
    pub secret_access_key: String,
    /// Temporary session token, sent as `X-Fidem-Security-Token`.
    pub session_token: Option<String>,
}

impl Credentials {
    /// Create credentials without a session token.
    #[must_use]
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Attach a session token.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Resolve credentials from the process environment.
    ///
    /// `FIDEM_ACCESS_KEY_ID` takes precedence over `FIDEM_ACCESS_KEY`, and
    /// `FIDEM_SECRET_ACCESS_KEY` over `FIDEM_SECRET_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] if no variable of a pair is set.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve credentials through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] if no variable of a pair is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let first_set = |names: &'static [&'static str]| {
            names
                .iter()
                .find_map(|name| lookup(*name).filter(|v| !v.is_empty()))
                .ok_or(AuthError::MissingCredentials(names[0]))
        };

        Ok(Self::new(
            first_set(ACCESS_KEY_ID_VARS)?,
            first_set(SECRET_ACCESS_KEY_VARS)?,
        ))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

/// Trait for looking up credentials by access key ID.
///
/// Implementations may back this with a database, configuration file,
/// or any other credential store.
pub trait CredentialProvider: Send + Sync {
    /// Retrieve the credentials for the given access key ID.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccessKeyNotFound`] if the access key ID is not recognized.
    fn get_credentials(&self, access_key_id: &str) -> Result<Credentials, AuthError>;
}

/// A simple in-memory credential provider backed by a `HashMap`.
///
/// # Examples
///
/// ```
/// use fidem_auth::credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::new(vec![Credentials::new("myAccessKeyId", "mySecretAccessKey")]);
///
/// let found = provider.get_credentials("myAccessKeyId").unwrap();
/// assert_eq!(found.secret_access_key, "mySecretAccessKey");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    credentials: HashMap<String, Credentials>,
}

impl StaticCredentialProvider {
    /// Create a provider from an iterable of credentials, keyed by access key ID.
    pub fn new(credentials: impl IntoIterator<Item = Credentials>) -> Self {
        Self {
            credentials: credentials
                .into_iter()
                .map(|c| (c.access_key_id.clone(), c))
                .collect(),
        }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn get_credentials(&self, access_key_id: &str) -> Result<Credentials, AuthError> {
        self.credentials
            .get(access_key_id)
            .cloned()
            .ok_or_else(|| AuthError::AccessKeyNotFound(access_key_id.to_owned()))
    }
}
