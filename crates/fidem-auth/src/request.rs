//! The request value that gets signed and verified.
//!
//! [`SignableRequest`] is a passive description of an HTTP request: the
//! surrounding HTTP client or server owns transport, and converts to and from
//! this type at the edges ([`SignableRequest::from_parts`] and
//! [`SignableRequest::write_headers`]).

use std::borrow::Cow;

use http::header::{HeaderName, HeaderValue};

use crate::error::AuthError;
use crate::headers::Headers;

/// Method used for canonicalization when none is set.
pub const DEFAULT_METHOD: &str = "GET";

/// A request body.
///
/// Structured bodies are serialized as compact JSON with object keys in
/// sorted order, and the same serialization is used for hashing,
/// `Content-Length`, and verification.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// A UTF-8 text body.
    Text(String),
    /// A raw byte body.
    Bytes(Vec<u8>),
    /// A structured body.
    Json(serde_json::Value),
}

impl Body {
    /// Whether the body counts as absent (no bytes, empty text, or JSON `null`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Json(value) => value.is_null(),
        }
    }

    /// The exact bytes that are hashed into the canonical request.
    #[must_use]
    pub fn canonical_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Self::Empty => Cow::Borrowed(&[]),
            Self::Text(text) => Cow::Borrowed(text.as_bytes()),
            Self::Bytes(bytes) => Cow::Borrowed(bytes),
            Self::Json(value) if value.is_null() => Cow::Borrowed(&[]),
            Self::Json(value) => Cow::Owned(value.to_string().into_bytes()),
        }
    }

    /// Byte length of [`Body::canonical_bytes`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.canonical_bytes().len()
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// An HTTP request as seen by the signer and verifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignableRequest {
    /// HTTP method; `None` canonicalizes as `GET`.
    pub method: Option<String>,
    /// Path including an optional `?query`; `None` canonicalizes as `/`.
    pub path: Option<String>,
    /// Host name the request is sent to.
    pub host: Option<String>,
    /// Request headers.
    pub headers: Headers,
    /// Request body.
    pub body: Body,
    /// Service name used in the credential scope.
    pub service: String,
    /// Region name used in the credential scope.
    pub region: String,
}

impl SignableRequest {
    /// Create an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from a URI, taking its host and path-and-query.
    #[must_use]
    pub fn from_uri(uri: &http::Uri) -> Self {
        Self {
            host: uri.host().map(ToOwned::to_owned),
            path: uri.path_and_query().map(|pq| pq.as_str().to_owned()),
            ..Self::default()
        }
    }

    /// Build a request from `http` request parts and a body.
    ///
    /// Header values that are not visible ASCII are skipped.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts, body: impl Into<Body>) -> Self {
        let mut request = Self::from_uri(&parts.uri);
        request.method = Some(parts.method.as_str().to_owned());
        for (name, value) in &parts.headers {
            match value.to_str() {
                Ok(value) => request.headers.append(name.as_str(), value),
                Err(_) => tracing::debug!(header = %name, "Skipping non-ASCII header value"),
            }
        }
        request.body = body.into();
        request
    }

    /// Set the method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the path (optionally with a `?query`).
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the service name.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Set the region name.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// The method to canonicalize with.
    #[must_use]
    pub fn method_or_default(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_METHOD)
    }

    /// Split the path on its first `?` into path and query.
    ///
    /// An empty path part becomes `/`; a missing query becomes `""`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fidem_auth::request::SignableRequest;
    ///
    /// let request = SignableRequest::new().with_path("/items?b=2&a=1?x");
    /// assert_eq!(request.path_and_query(), ("/items", "b=2&a=1?x"));
    /// assert_eq!(SignableRequest::new().path_and_query(), ("/", ""));
    /// ```
    #[must_use]
    pub fn path_and_query(&self) -> (&str, &str) {
        let full = self.path.as_deref().unwrap_or("/");
        let (path, query) = full.split_once('?').unwrap_or((full, ""));
        (if path.is_empty() { "/" } else { path }, query)
    }

    /// Write this request's headers into an `http::HeaderMap`, replacing any
    /// existing values of the same names.
    pub fn write_headers(&self, target: &mut http::HeaderMap) -> Result<(), AuthError> {
        for (name, _) in self.headers.iter() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| AuthError::InvalidHeaderValue(name.to_owned()))?;
            target.remove(&name);
        }
        for (name, value) in self.headers.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| AuthError::InvalidHeaderValue(name.to_owned()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| AuthError::InvalidHeaderValue(name.to_owned()))?;
            target.append(header_name, header_value);
        }
        Ok(())
    }
}
