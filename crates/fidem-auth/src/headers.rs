//! Request headers and their canonical form.
//!
//! [`Headers`] is an insertion-ordered, case-insensitive header map that keeps
//! the caller's spelling of each name. [`CanonicalHeaders`] is its normalized
//! view: names lower-cased, values trimmed with internal whitespace collapsed,
//! entries sorted by name. Both the signer and the verifier canonicalize
//! through [`CanonicalHeaders`], so the result never depends on the order in
//! which headers were inserted.

use std::collections::BTreeMap;
use std::fmt;

/// An insertion-ordered header map with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the first header whose name matches `name`, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether a header named `name` (any case) is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a header, replacing every existing header with the same name.
    ///
    /// The value is stringified, so numbers and other `Display` values are
    /// accepted.
    pub fn insert(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, value.to_string()));
    }

    /// Add a header without touching existing headers of the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.entries.push((name.into(), value.to_string()));
    }

    /// Remove every header named `name` (any case), returning the first value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let mut removed = None;
        self.entries.retain(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                removed.get_or_insert_with(|| v.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of header entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: fmt::Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl<K, V> Extend<(K, V)> for Headers
where
    K: Into<String>,
    V: fmt::Display,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}

/// Normalized, name-sorted headers ready for canonicalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalHeaders {
    entries: BTreeMap<String, String>,
}

impl CanonicalHeaders {
    /// Normalize every header in `headers`.
    ///
    /// Headers whose names differ only by case are merged into one entry,
    /// their values joined with commas in insertion order.
    #[must_use]
    pub fn from_headers(headers: &Headers) -> Self {
        let mut entries: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers.iter() {
            let value = normalize_value(value);
            entries
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        Self { entries }
    }

    /// Normalize only the headers named in `names`.
    ///
    /// A name with no matching header canonicalizes with an empty value.
    #[must_use]
    pub fn select(headers: &Headers, names: &[&str]) -> Self {
        let all = Self::from_headers(headers);
        let entries = names
            .iter()
            .map(|name| {
                let name = name.to_ascii_lowercase();
                let value = all.entries.get(&name).cloned().unwrap_or_default();
                (name, value)
            })
            .collect();
        Self { entries }
    }

    /// The canonical header block: `name:value` lines joined with `\n`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fidem_auth::headers::{CanonicalHeaders, Headers};
    ///
    /// let headers: Headers = [("X-Fidem-Date", "20141026T120000Z"), ("Host", " example.com ")]
    ///     .into_iter()
    ///     .collect();
    /// let canonical = CanonicalHeaders::from_headers(&headers);
    /// assert_eq!(canonical.block(), "host:example.com\nx-fidem-date:20141026T120000Z");
    /// assert_eq!(canonical.signed_headers(), "host;x-fidem-date");
    /// ```
    #[must_use]
    pub fn block(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| format!("{name}:{value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The sorted, lower-cased header names joined with `;`.
    #[must_use]
    pub fn signed_headers(&self) -> String {
        self.entries.keys().map(String::as_str).collect::<Vec<_>>().join(";")
    }
}

/// Trim a header value and collapse internal whitespace runs to one space.
#[must_use]
pub fn normalize_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut prev_was_space = false;
    for ch in value.trim().chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }
    result
}
