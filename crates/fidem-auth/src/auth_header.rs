//! The `Authorization` header.
//!
//! Format:
//! ```text
//! FIDEM4-HMAC-SHA256 Credential=AKID/20141026/eu-west-1/fidem/fidem4_request,
//!   SignedHeaders=host;x-fidem-date,
//!   Signature=<64 lowercase hex chars>
//! ```
//!
//! Parameters are separated by spaces or commas; each parameter is a
//! `key=value` token containing exactly one `=`. Unknown keys are ignored.

use std::fmt;
use std::str::FromStr;

use crate::error::AuthError;
use crate::request::SignableRequest;
use crate::signing_key::TERMINATOR;

/// The only signing scheme.
pub const SCHEME: &str = "FIDEM4-HMAC-SHA256";

/// Characters that split or invalidate `Authorization` parameter tokens.
const PARAMETER_DELIMITERS: [char; 3] = [' ', ',', '='];

/// The components of a `Credential` parameter.
///
/// Positions in the `/`-separated credential are fixed:
/// `[access_key_id, date, region, service, "fidem4_request"]`. Only the
/// access key ID may contain `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialScope {
    /// The access key ID.
    pub access_key_id: String,
    /// The date component (`YYYYMMDD`).
    pub date: String,
    /// The region component; may be empty.
    pub region: String,
    /// The service component; may be empty.
    pub service: String,
}

impl CredentialScope {
    /// Parse `AKID/date/region/service/fidem4_request`.
    ///
    /// Components are taken from the right, so an access key ID may itself
    /// contain `/`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredential`] if there are fewer than five
    /// components or the last one is not `fidem4_request`.
    pub fn parse(credential: &str) -> Result<Self, AuthError> {
        let parts: Vec<&str> = credential.rsplitn(5, '/').collect();
        match parts.as_slice() {
            [terminator, service, region, date, access_key_id] if *terminator == TERMINATOR => {
                Ok(Self {
                    access_key_id: (*access_key_id).to_owned(),
                    date: (*date).to_owned(),
                    region: (*region).to_owned(),
                    service: (*service).to_owned(),
                })
            }
            _ => Err(AuthError::InvalidCredential),
        }
    }

    /// Whether this scope survives a trip through an `Authorization` header.
    ///
    /// No component may contain a parameter delimiter (space, `,` or `=`),
    /// and region and service may not contain `/`.
    #[must_use]
    pub fn is_representable(&self) -> bool {
        let clean = |value: &str| !value.contains(PARAMETER_DELIMITERS);
        clean(self.access_key_id.as_str())
            && [&self.date, &self.region, &self.service]
                .iter()
                .all(|value| clean(value.as_str()) && !value.contains('/'))
    }

    /// The scope string that goes into the string to sign:
    /// `date/region/service/fidem4_request`.
    #[must_use]
    pub fn scope(&self) -> String {
        credential_scope(&self.date, &self.region, &self.service)
    }
}

impl fmt::Display for CredentialScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.access_key_id, self.scope())
    }
}

/// Build `date/region/service/fidem4_request`.
#[must_use]
pub fn credential_scope(date: &str, region: &str, service: &str) -> String {
    format!("{date}/{region}/{service}/{TERMINATOR}")
}

/// Parsed components of a FIDEM4 `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthParameters {
    /// The scheme preceding the parameter list.
    pub scheme: String,
    /// The raw `Credential` parameter.
    pub credential: String,
    /// The raw `SignedHeaders` parameter.
    pub signed_headers: String,
    /// The `Signature` parameter.
    pub signature: String,
    /// `Credential` split into its components.
    pub credential_scope: CredentialScope,
    /// `SignedHeaders` split on `;`.
    pub signed_headers_list: Vec<String>,
}

impl AuthParameters {
    /// Parse an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MalformedHeader`] if there is no space after the scheme.
    /// - [`AuthError::MissingParameter`] if `Credential`, `SignedHeaders` or
    ///   `Signature` is absent or empty, or the scheme is empty.
    /// - [`AuthError::InvalidCredential`] if `Credential` is not a five-part scope.
    pub fn parse(header: &str) -> Result<Self, AuthError> {
        let (scheme, rest) = header.split_once(' ').ok_or(AuthError::MalformedHeader)?;

        let mut credential = None;
        let mut signed_headers = None;
        let mut signature = None;

        for token in rest.split([' ', ',']) {
            let mut parts = token.split('=');
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "Credential" => credential = Some(value),
                "SignedHeaders" => signed_headers = Some(value),
                "Signature" => signature = Some(value),
                _ => {}
            }
        }

        let required = |value: Option<&str>, name: &'static str| {
            value
                .filter(|v| !v.is_empty())
                .map(ToOwned::to_owned)
                .ok_or(AuthError::MissingParameter(name))
        };
        let credential = required(credential, "Credential")?;
        let signed_headers = required(signed_headers, "SignedHeaders")?;
        let signature = required(signature, "Signature")?;

        let scheme = scheme.trim();
        if scheme.is_empty() {
            return Err(AuthError::MissingParameter("scheme"));
        }

        let credential_scope = CredentialScope::parse(&credential)?;
        let signed_headers_list = signed_headers.split(';').map(ToOwned::to_owned).collect();

        Ok(Self {
            scheme: scheme.to_owned(),
            credential,
            signed_headers,
            signature,
            credential_scope,
            signed_headers_list,
        })
    }

    /// `Credential` split on `/`.
    #[must_use]
    pub fn credential_array(&self) -> Vec<&str> {
        self.credential.split('/').collect()
    }
}

impl FromStr for AuthParameters {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Read and parse the `Authorization` header of `request`.
///
/// # Errors
///
/// Returns [`AuthError::MissingHeader`] if the request has no `Authorization`
/// header, or any error of [`AuthParameters::parse`].
pub fn parse_authorization_header(request: &SignableRequest) -> Result<AuthParameters, AuthError> {
    let header = request
        .headers
        .get(http::header::AUTHORIZATION.as_str())
        .ok_or(AuthError::MissingHeader)?;
    AuthParameters::parse(header)
}

/// Format an `Authorization` header value.
///
/// # Examples
///
/// ```
/// use fidem_auth::auth_header::format_authorization;
///
/// let value = format_authorization("AKID", "20141026/r/s/fidem4_request", "host", "ab12");
/// assert_eq!(
///     value,
///     "FIDEM4-HMAC-SHA256 Credential=AKID/20141026/r/s/fidem4_request, SignedHeaders=host, Signature=ab12"
/// );
/// ```
#[must_use]
pub fn format_authorization(
    access_key_id: &str,
    credential_scope: &str,
    signed_headers: &str,
    signature: &str,
) -> String {
    format!(
        "{SCHEME} Credential={access_key_id}/{credential_scope}, SignedHeaders={signed_headers}, Signature={signature}"
    )
}
