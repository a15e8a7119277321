//! FIDEM4-HMAC-SHA256 request signing and verification.
//!
//! This crate implements a symmetric-key HTTP request signature scheme in the
//! style of AWS Signature Version 4. A [`Signer`] stamps a request with
//! `X-Fidem-Date` (and `X-Fidem-Security-Token` for temporary credentials) and
//! an `Authorization` header; a [`Verifier`] rebuilds the same canonical
//! request from what it received and checks the signature and its freshness.
//!
//! # Usage
//!
//! ```rust
//! use fidem_auth::{Credentials, SignableRequest, Signer, Verifier};
//!
//! let credentials = Credentials::new("myAccessKeyId", "mySecretAccessKey");
//!
//! let mut request = SignableRequest::new()
//!     .with_method("POST")
//!     .with_path("/v1/items")
//!     .with_host("api.example.com")
//!     .with_region("eu-west-1")
//!     .with_service("fidem")
//!     .with_body("name=widget");
//! Signer::new().sign(&mut request, &credentials);
//!
//! let verifier = Verifier::new();
//! let params = fidem_auth::parse_authorization_header(&request).unwrap();
//! assert!(verifier.validate_signature(&request, &credentials, Some(&params)).unwrap());
//! assert!(verifier.validate_date(&request, &params));
//! ```
//!
//! # Modules
//!
//! - [`auth_header`] - `Authorization` header parsing and formatting
//! - [`canonical`] - Canonical request construction
//! - [`config`] - Cache and freshness settings
//! - [`credentials`] - Credentials, environment lookup, and credential providers
//! - [`date`] - Timestamp formatting and parsing
//! - [`error`] - Error types
//! - [`hash`] - SHA-256 and HMAC-SHA256 primitives
//! - [`headers`] - Header map and header normalization
//! - [`request`] - The request value that is signed and verified
//! - [`signer`] - Request signing
//! - [`signing_key`] - Signing-key derivation and caching
//! - [`verifier`] - Signature and freshness verification

pub mod auth_header;
pub mod canonical;
pub mod config;
pub mod credentials;
pub mod date;
pub mod error;
pub mod hash;
pub mod headers;
pub mod request;
pub mod signer;
pub mod signing_key;
pub mod verifier;

pub use auth_header::{AuthParameters, CredentialScope, SCHEME, parse_authorization_header};
pub use config::AuthConfig;
pub use credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
pub use error::AuthError;
pub use headers::Headers;
pub use request::{Body, SignableRequest};
pub use signer::{Signer, SigningOutput};
pub use signing_key::{LruSigningKeyCache, NoopSigningKeyCache, SigningKeyCache};
pub use verifier::{AuthResult, Verifier};
