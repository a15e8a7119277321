//! FIDEM4 signature verification.
//!
//! The verifier rebuilds the canonical request from the received request,
//! restricted to the headers named in `SignedHeaders`, and recomputes the
//! signature with the region and service from the received `Credential` and
//! the timestamp from `X-Fidem-Date`. Signatures are compared in constant time.
//!
//! [`Verifier::validate_signature`] and [`Verifier::validate_date`] report a
//! bad signature or a stale timestamp as `false`; only a malformed
//! `Authorization` header is an error. [`Verifier::authenticate`] combines
//! both checks with a credential lookup and reports every failure as an
//! [`AuthError`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::auth_header::{AuthParameters, SCHEME, credential_scope, parse_authorization_header};
use crate::canonical::canonical_request_for;
use crate::config::AuthConfig;
use crate::credentials::{CredentialProvider, Credentials};
use crate::date::{parse_timestamp, strip_time};
use crate::error::AuthError;
use crate::hash::{hmac_sha256_hex, sha256_hex};
use crate::headers::CanonicalHeaders;
use crate::request::SignableRequest;
use crate::signer::{DATE_HEADER, build_string_to_sign};
use crate::signing_key::{LruSigningKeyCache, SigningKeyCache, signing_key};

/// The result of a successful [`Verifier::authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    /// The access key ID that signed the request.
    pub access_key_id: String,
    /// The region from the credential scope.
    pub region: String,
    /// The service from the credential scope.
    pub service: String,
    /// The headers that were included in the signature.
    pub signed_headers: Vec<String>,
}

/// Verifies FIDEM4-signed requests.
///
/// Cloning a verifier shares its signing-key cache.
#[derive(Debug, Clone)]
pub struct Verifier {
    cache: Arc<dyn SigningKeyCache>,
    max_request_age: Duration,
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Verifier {
    /// Create a verifier with default settings and its own key cache.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&AuthConfig::default())
    }

    /// Create a verifier from `config`.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            cache: LruSigningKeyCache::shared(config.key_cache_capacity),
            max_request_age: config.max_request_age(),
        }
    }

    /// Use `cache` for derived keys, e.g. one shared with a [`crate::Signer`].
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn SigningKeyCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Accept timestamps at most `max_request_age` away from the clock.
    #[must_use]
    pub fn with_max_request_age(mut self, max_request_age: Duration) -> Self {
        self.max_request_age = max_request_age;
        self
    }

    /// The signing-key cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn SigningKeyCache> {
        &self.cache
    }

    /// Check the signature of `request` against `credentials`, ignoring freshness.
    ///
    /// # Errors
    ///
    /// Returns an error only if the `Authorization` header is missing or malformed.
    pub fn verify(
        &self,
        request: &SignableRequest,
        credentials: &Credentials,
    ) -> Result<bool, AuthError> {
        self.validate_signature(request, credentials, None)
    }

    /// Recompute the signature of `request` and compare it with the received one.
    ///
    /// `params` are parsed from the request when not supplied. Signed headers
    /// absent from the request canonicalize with an empty value. An unknown
    /// scheme or a missing `X-Fidem-Date` header yields `false`.
    ///
    /// # Errors
    ///
    /// Returns an error only when `params` is `None` and the `Authorization`
    /// header is missing or malformed.
    pub fn validate_signature(
        &self,
        request: &SignableRequest,
        credentials: &Credentials,
        params: Option<&AuthParameters>,
    ) -> Result<bool, AuthError> {
        let parsed;
        let params = match params {
            Some(params) => params,
            None => {
                parsed = parse_authorization_header(request)?;
                &parsed
            }
        };

        if params.scheme != SCHEME {
            debug!(scheme = %params.scheme, "Unsupported authorization scheme");
            return Ok(false);
        }

        let Some(datetime) = request.headers.get(DATE_HEADER) else {
            debug!("Missing X-Fidem-Date header");
            return Ok(false);
        };
        let date = strip_time(datetime);
        let region = &params.credential_scope.region;
        let service = &params.credential_scope.service;

        let names: Vec<&str> = params.signed_headers_list.iter().map(String::as_str).collect();
        let headers = CanonicalHeaders::select(&request.headers, &names);
        let canonical_request = canonical_request_for(request, &headers, &params.signed_headers);
        debug!(%canonical_request, "Rebuilt canonical request");

        let scope = credential_scope(&date, region, service);
        let string_to_sign =
            build_string_to_sign(datetime, &scope, &sha256_hex(canonical_request.as_bytes()));
        debug!(%string_to_sign, "Rebuilt string to sign");

        let key = signing_key(
            self.cache.as_ref(),
            &credentials.secret_access_key,
            &date,
            region,
            service,
        );
        let expected_signature = hmac_sha256_hex(key.as_bytes(), string_to_sign.as_bytes());

        let matched: bool = expected_signature
            .as_bytes()
            .ct_eq(params.signature.as_bytes())
            .into();
        if !matched {
            debug!(
                expected = %expected_signature,
                provided = %params.signature,
                "Signature mismatch"
            );
        }
        Ok(matched)
    }

    /// Check that `X-Fidem-Date` is present, agrees with the credential date,
    /// and lies within the maximum request age of the current time.
    #[must_use]
    pub fn validate_date(&self, request: &SignableRequest, params: &AuthParameters) -> bool {
        self.validate_date_at(request, params, Utc::now())
    }

    /// [`Verifier::validate_date`] with an explicit clock.
    #[must_use]
    pub fn validate_date_at(
        &self,
        request: &SignableRequest,
        params: &AuthParameters,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(value) = request.headers.get(DATE_HEADER) else {
            debug!("Missing X-Fidem-Date header");
            return false;
        };

        if strip_time(value) != params.credential_scope.date {
            debug!(
                header = value,
                credential_date = %params.credential_scope.date,
                "X-Fidem-Date does not match credential date"
            );
            return false;
        }

        let Some(timestamp) = parse_timestamp(value) else {
            debug!(header = value, "Unparseable X-Fidem-Date header");
            return false;
        };

        let fresh = (now - timestamp)
            .abs()
            .to_std()
            .is_ok_and(|age| age <= self.max_request_age);
        if !fresh {
            debug!(header = value, %now, "Request timestamp outside allowed window");
        }
        fresh
    }

    /// Authenticate `request` end to end.
    ///
    /// Parses the `Authorization` header, resolves the credentials of its
    /// access key through `provider`, then checks freshness and the signature.
    ///
    /// # Errors
    ///
    /// - Any parse error of [`parse_authorization_header`].
    /// - [`AuthError::AccessKeyNotFound`] from the provider.
    /// - [`AuthError::RequestExpired`] if the timestamp check fails.
    /// - [`AuthError::SignatureDoesNotMatch`] if the signature check fails.
    pub fn authenticate(
        &self,
        request: &SignableRequest,
        provider: &dyn CredentialProvider,
    ) -> Result<AuthResult, AuthError> {
        self.authenticate_at(request, provider, Utc::now())
    }

    /// [`Verifier::authenticate`] with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`Verifier::authenticate`].
    pub fn authenticate_at(
        &self,
        request: &SignableRequest,
        provider: &dyn CredentialProvider,
        now: DateTime<Utc>,
    ) -> Result<AuthResult, AuthError> {
        let params = parse_authorization_header(request)?;
        let scope = &params.credential_scope;
        debug!(
            access_key_id = %scope.access_key_id,
            date = %scope.date,
            region = %scope.region,
            service = %scope.service,
            "Verifying FIDEM4 signature"
        );

        let credentials = provider.get_credentials(&scope.access_key_id)?;

        if !self.validate_date_at(request, &params, now) {
            return Err(AuthError::RequestExpired);
        }
        if !self.validate_signature(request, &credentials, Some(&params))? {
            return Err(AuthError::SignatureDoesNotMatch);
        }

        debug!(access_key_id = %scope.access_key_id, "Signature verification succeeded");
        Ok(AuthResult {
            access_key_id: params.credential_scope.access_key_id,
            region: params.credential_scope.region,
            service: params.credential_scope.service,
            signed_headers: params.signed_headers_list,
        })
    }
}
