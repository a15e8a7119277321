//! Integration tests for FIDEM4 signing and verification.
//!
//! These tests drive the public API of `fidem-auth` end to end: a request is
//! signed by one [`Signer`] and checked by an independently constructed
//! [`Verifier`].
//!
//! ```text
//! cargo test -p fidem-integration
//! ```

use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};
use fidem_auth::{Credentials, SignableRequest, Signer, Verifier};

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// The credentials used throughout the tests.
#[must_use]
pub fn test_credentials() -> Credentials {
    Credentials::new("myAccessKeyId", "mySecretAccessKey")
}

/// A fixed signing instant.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 10, 26, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A request touching every canonicalized field.
#[must_use]
pub fn sample_request() -> SignableRequest {
    SignableRequest::new()
        .with_method("POST")
        .with_path("/v1/items?limit=5&offset=10")
        .with_host("api.example.com")
        .with_region("eu-west-1")
        .with_service("fidem")
        .with_header("X-Request-Id", "  abc   123 ")
        .with_body("name=widget&qty=3")
}

/// Sign `request` at [`fixed_now`] with a fresh signer.
#[must_use]
pub fn sign(mut request: SignableRequest, credentials: &Credentials) -> SignableRequest {
    init_tracing();
    Signer::new().sign_at(&mut request, credentials, fixed_now());
    request
}

/// Verify `request` with a fresh verifier, ignoring freshness.
#[must_use]
pub fn verify(request: &SignableRequest, credentials: &Credentials) -> bool {
    Verifier::new()
        .verify(request, credentials)
        .unwrap_or(false)
}

mod test_cache;
mod test_freshness;
mod test_http;
mod test_roundtrip;
mod test_tamper;
