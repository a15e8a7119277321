//! FIDEM4 request signing.
//!
//! Signing walks a request through fixed steps, each visible as a header
//! mutation:
//!
//! 1. Resolve the signing timestamp from the `Date` header, or the clock.
//! 2. Default the method (`POST` with a body, `GET` without).
//! 3. Default `Host` from the request host and vice versa.
//! 4. Default `Content-Type` and `Content-Length` when a body is present.
//! 5. Set `X-Fidem-Date`.
//! 6. Set `X-Fidem-Security-Token` when the credentials carry a session token.
//! 7. Replace `Authorization` with a freshly computed one.
//!
//! Every header present after step 6 is signed. Signing never fails: absent
//! fields degrade to empty scope segments or defaults.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::auth_header::{CredentialScope, SCHEME, format_authorization};
use crate::canonical::canonical_request_for;
use crate::config::AuthConfig;
use crate::credentials::Credentials;
use crate::date::{format_datetime, parse_timestamp};
use crate::error::AuthError;
use crate::hash::{hmac_sha256_hex, sha256_hex};
use crate::headers::CanonicalHeaders;
use crate::request::SignableRequest;
use crate::signing_key::{LruSigningKeyCache, SigningKeyCache, signing_key};

/// Header carrying the signing timestamp.
pub const DATE_HEADER: &str = "X-Fidem-Date";

/// Header carrying the session token of temporary credentials.
pub const SECURITY_TOKEN_HEADER: &str = "X-Fidem-Security-Token";

/// `Content-Type` set on requests with a body and no explicit type.
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Values computed while signing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningOutput {
    /// The `X-Fidem-Date` value (`YYYYMMDDTHHMMSSZ`).
    pub datetime: String,
    /// `date/region/service/fidem4_request`.
    pub credential_scope: String,
    /// Semicolon-separated signed header names.
    pub signed_headers: String,
    /// Hex-encoded signature.
    pub signature: String,
    /// The full `Authorization` header value.
    pub authorization: String,
}

/// Build the FIDEM4 string to sign.
///
/// Format:
/// ```text
/// FIDEM4-HMAC-SHA256\n
/// <YYYYMMDDTHHMMSSZ>\n
/// <credential_scope>\n
/// <hex(SHA256(canonical_request))>
/// ```
#[must_use]
pub fn build_string_to_sign(
    datetime: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{SCHEME}\n{datetime}\n{credential_scope}\n{canonical_request_hash}")
}

/// Signs requests with FIDEM4-HMAC-SHA256.
///
/// Cloning a signer shares its signing-key cache.
#[derive(Debug, Clone)]
pub struct Signer {
    cache: Arc<dyn SigningKeyCache>,
}

impl Default for Signer {
    fn default() -> Self {
        Self::new()
    }
}

impl Signer {
    /// Create a signer with its own default-sized LRU key cache.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&AuthConfig::default())
    }

    /// Create a signer sized by `config`.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::with_cache(LruSigningKeyCache::shared(config.key_cache_capacity))
    }

    /// Create a signer using `cache` for derived keys.
    #[must_use]
    pub fn with_cache(cache: Arc<dyn SigningKeyCache>) -> Self {
        Self { cache }
    }

    /// The signing-key cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn SigningKeyCache> {
        &self.cache
    }

    /// Sign `request` in place, timestamping it with the current time unless
    /// it carries a `Date` header.
    pub fn sign(&self, request: &mut SignableRequest, credentials: &Credentials) -> SigningOutput {
        self.sign_at(request, credentials, Utc::now())
    }

    /// Sign `request` in place, using `now` when it carries no usable `Date` header.
    pub fn sign_at(
        &self,
        request: &mut SignableRequest,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> SigningOutput {
        let datetime = prepare(request, credentials, now);
        let output = self.compute(
            request,
            &credentials.access_key_id,
            &credentials.secret_access_key,
            datetime,
        );
        request
            .headers
            .insert(http::header::AUTHORIZATION.as_str(), &output.authorization);
        output
    }

    /// Sign `request` with credentials from `FIDEM_ACCESS_KEY_ID` /
    /// `FIDEM_SECRET_ACCESS_KEY` (or their short forms).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] if the environment lacks either key.
    pub fn sign_with_env(&self, request: &mut SignableRequest) -> Result<SigningOutput, AuthError> {
        self.sign_with_lookup(request, |name| std::env::var(name).ok())
    }

    /// [`Signer::sign_with_env`] resolving the variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] if `lookup` lacks either key.
    pub fn sign_with_lookup(
        &self,
        request: &mut SignableRequest,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<SigningOutput, AuthError> {
        let credentials = Credentials::from_lookup(lookup)?;
        Ok(self.sign(request, &credentials))
    }

    /// Apply the signing header mutations to `request` and return the
    /// signature, without setting `Authorization`.
    ///
    /// Any existing `Authorization` header is removed.
    pub fn generate_signature(
        &self,
        request: &mut SignableRequest,
        credentials: &Credentials,
    ) -> String {
        self.generate_signature_at(request, credentials, Utc::now())
    }

    /// [`Signer::generate_signature`] with an explicit clock.
    pub fn generate_signature_at(
        &self,
        request: &mut SignableRequest,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> String {
        let datetime = prepare(request, credentials, now);
        self.compute(
            request,
            &credentials.access_key_id,
            &credentials.secret_access_key,
            datetime,
        )
        .signature
    }

    /// Canonicalize the prepared request over all of its headers and sign it.
    fn compute(
        &self,
        request: &SignableRequest,
        access_key_id: &str,
        secret_key: &str,
        datetime: String,
    ) -> SigningOutput {
        let date: String = datetime.chars().take(8).collect();

        let headers = CanonicalHeaders::from_headers(&request.headers);
        let signed_headers = headers.signed_headers();
        let canonical_request = canonical_request_for(request, &headers, &signed_headers);
        debug!(%canonical_request, "Built canonical request");

        let credential = CredentialScope {
            access_key_id: access_key_id.to_owned(),
            date,
            region: request.region.clone(),
            service: request.service.clone(),
        };
        if !credential.is_representable() {
            warn!(
                access_key_id,
                region = %credential.region,
                service = %credential.service,
                "Credential scope contains characters the Authorization header cannot carry"
            );
        }
        let scope = credential.scope();
        let string_to_sign =
            build_string_to_sign(&datetime, &scope, &sha256_hex(canonical_request.as_bytes()));
        debug!(%string_to_sign, "Built string to sign");

        let key = signing_key(
            self.cache.as_ref(),
            secret_key,
            &credential.date,
            &request.region,
            &request.service,
        );
        let signature = hmac_sha256_hex(key.as_bytes(), string_to_sign.as_bytes());
        let authorization = format_authorization(access_key_id, &scope, &signed_headers, &signature);

        SigningOutput {
            datetime,
            credential_scope: scope,
            signed_headers,
            signature,
            authorization,
        }
    }
}

/// Apply signing steps 1 to 6 and strip `Authorization`; returns the datetime.
fn prepare(request: &mut SignableRequest, credentials: &Credentials, now: DateTime<Utc>) -> String {
    let timestamp = match request.headers.get(http::header::DATE.as_str()) {
        Some(value) => parse_timestamp(value).unwrap_or_else(|| {
            warn!(date = value, "Unparseable Date header, signing with current time");
            now
        }),
        None => now,
    };
    let datetime = format_datetime(&timestamp);

    let has_body = !request.body.is_empty();
    if request.method.is_none() {
        request.method = Some(if has_body { "POST" } else { "GET" }.to_owned());
    }

    let host_header = http::header::HOST.as_str();
    if !request.headers.contains(host_header) {
        if let Some(host) = request.host.clone() {
            request.headers.insert("Host", host);
        }
    }
    if request.host.is_none() {
        request.host = request.headers.get(host_header).map(ToOwned::to_owned);
    }

    if has_body {
        if !request.headers.contains(http::header::CONTENT_TYPE.as_str()) {
            request.headers.insert("Content-Type", DEFAULT_CONTENT_TYPE);
        }
        if !request.headers.contains(http::header::CONTENT_LENGTH.as_str()) {
            request.headers.insert("Content-Length", request.body.len());
        }
    }

    request.headers.insert(DATE_HEADER, &datetime);

    if let Some(token) = &credentials.session_token {
        request.headers.insert(SECURITY_TOKEN_HEADER, token);
    }

    request.headers.remove(http::header::AUTHORIZATION.as_str());

    datetime
}
