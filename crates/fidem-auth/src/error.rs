//! Error types for FIDEM4 signing and verification.
//!
//! Parsing an `Authorization` header is the only place a malformed request
//! surfaces as an error. A signature that fails to match or a stale timestamp
//! is reported as `false` by the boolean primitives, and as
//! [`AuthError::SignatureDoesNotMatch`] / [`AuthError::RequestExpired`] by the
//! one-shot [`crate::verifier::Verifier::authenticate`] entry point.

/// Errors that can occur while signing or verifying a FIDEM4 request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request carries no `Authorization` header.
    #[error("No \"Authorization\" header found")]
    MissingHeader,

    /// The `Authorization` header has no space between scheme and parameters.
    #[error("Missing authorization scheme and parameters")]
    MalformedHeader,

    /// A required `Authorization` parameter (or the scheme itself) is absent.
    #[error("Missing \"{0}\" parameter")]
    MissingParameter(&'static str),

    /// The `Credential` parameter is not `AKID/date/region/service/fidem4_request`.
    #[error("Invalid credential format")]
    InvalidCredential,

    /// Default credentials could not be resolved from the environment.
    #[error("Missing credentials: {0} is not set")]
    MissingCredentials(&'static str),

    /// The access key ID was not found in the credential store.
    #[error("Access key not found: {0}")]
    AccessKeyNotFound(String),

    /// The `X-Fidem-Date` header is missing, stale, or inconsistent with the credential.
    #[error("Request has expired")]
    RequestExpired,

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,

    /// A header value could not be written into an `http::HeaderMap`.
    #[error("Invalid header value for {0}")]
    InvalidHeaderValue(String),
}

impl AuthError {
    /// Whether this error describes a malformed request (400-class) rather
    /// than a request that was well-formed but not authenticated (401/403-class).
    #[must_use]
    pub fn is_malformed_request(&self) -> bool {
        matches!(
            self,
            Self::MissingHeader
                | Self::MalformedHeader
                | Self::MissingParameter(_)
                | Self::InvalidCredential
                | Self::InvalidHeaderValue(_)
        )
    }
}
