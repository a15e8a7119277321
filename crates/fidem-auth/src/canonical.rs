//! Canonical request construction.
//!
//! ```text
//! METHOD\n
//! PATH\n
//! QUERY\n
//! CANONICAL_HEADERS\n\n
//! SIGNED_HEADERS\n
//! HEX(SHA256(BODY))
//! ```
//!
//! The path and query are taken verbatim from the request (split on the first
//! `?`); no percent-encoding normalization or query sorting is applied.

use crate::hash::sha256_hex;
use crate::headers::CanonicalHeaders;
use crate::request::SignableRequest;

/// Build the canonical request string from its components.
///
/// # Examples
///
/// ```
/// use fidem_auth::canonical::build_canonical_request;
///
/// let canonical = build_canonical_request(
///     "GET",
///     "/",
///     "",
///     "x-fidem-date:20141026T120000Z",
///     "x-fidem-date",
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
/// );
/// assert!(canonical.starts_with("GET\n/\n\nx-fidem-date:20141026T120000Z\n\nx-fidem-date\n"));
/// ```
#[must_use]
pub fn build_canonical_request(
    method: &str,
    path: &str,
    query: &str,
    canonical_headers: &str,
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    format!("{method}\n{path}\n{query}\n{canonical_headers}\n\n{signed_headers}\n{payload_hash}")
}

/// Canonicalize `request` using the given header selection.
///
/// `signed_headers` is the descriptor placed in the canonical string. The
/// signer passes the one derived from `headers`; the verifier passes the one
/// received in the `Authorization` header.
#[must_use]
pub fn canonical_request_for(
    request: &SignableRequest,
    headers: &CanonicalHeaders,
    signed_headers: &str,
) -> String {
    let (path, query) = request.path_and_query();
    build_canonical_request(
        request.method_or_default(),
        path,
        query,
        &headers.block(),
        signed_headers,
        &sha256_hex(&request.body.canonical_bytes()),
    )
}
