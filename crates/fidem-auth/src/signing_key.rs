//! Signing-key derivation and caching.
//!
//! ```text
//! kDate        = HMAC-SHA256("FIDEM4" + secret_key, date)
//! kRegion      = HMAC-SHA256(kDate, region)
//! kService     = HMAC-SHA256(kRegion, service)
//! kCredentials = HMAC-SHA256(kService, "fidem4_request")
//! ```
//!
//! The derived key is a pure function of `(secret_key, date, region, service)`,
//! so caching it is transparent: a cache only changes how often the chain runs.
//! Signers and verifiers share a cache through `Arc<dyn SigningKeyCache>`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::hash::hmac_sha256;

/// Prefix prepended to the secret access key for the first HMAC step.
pub const KEY_PREFIX: &str = "FIDEM4";

/// Terminator of the credential scope and message of the last HMAC step.
pub const TERMINATOR: &str = "fidem4_request";

/// Default maximum number of cached signing keys.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// A derived 32-byte signing key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SigningKey([u8; 32]);

impl SigningKey {
    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// Identifies one derived key: the full input of the derivation chain.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SigningKeyId {
    secret_key: String,
    date: String,
    region: String,
    service: String,
}

impl SigningKeyId {
    /// Create a key identifier.
    #[must_use]
    pub fn new(secret_key: &str, date: &str, region: &str, service: &str) -> Self {
        Self {
            secret_key: secret_key.to_owned(),
            date: date.to_owned(),
            region: region.to_owned(),
            service: service.to_owned(),
        }
    }
}

impl fmt::Debug for SigningKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyId")
            .field("date", &self.date)
            .field("region", &self.region)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

/// Run the four-step HMAC chain without consulting any cache.
///
/// # Examples
///
/// ```
/// use fidem_auth::signing_key::derive_signing_key;
///
/// let a = derive_signing_key("mySecretAccessKey", "20141026", "", "");
/// let b = derive_signing_key("mySecretAccessKey", "20141026", "", "");
/// assert_eq!(a, b);
/// ```
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> SigningKey {
    let date_key = hmac_sha256(format!("{KEY_PREFIX}{secret_key}").as_bytes(), date.as_bytes());
    let region_key = hmac_sha256(&date_key, region.as_bytes());
    let service_key = hmac_sha256(&region_key, service.as_bytes());
    SigningKey(hmac_sha256(&service_key, TERMINATOR.as_bytes()))
}

/// A store of derived signing keys.
///
/// Implementations must be safe to share between concurrent signing and
/// verification calls. A lost insert only costs a recomputation.
pub trait SigningKeyCache: Send + Sync + fmt::Debug {
    /// Return the cached key for `id`, marking it as recently used.
    fn get(&self, id: &SigningKeyId) -> Option<SigningKey>;

    /// Store the key for `id`.
    fn insert(&self, id: SigningKeyId, key: SigningKey);

    /// Number of cached keys.
    fn len(&self) -> usize;

    /// Whether the cache holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached key.
    fn clear(&self);
}

/// Return the signing key for the given scope, deriving and caching it on a miss.
#[must_use]
pub fn signing_key(
    cache: &dyn SigningKeyCache,
    secret_key: &str,
    date: &str,
    region: &str,
    service: &str,
) -> SigningKey {
    let id = SigningKeyId::new(secret_key, date, region, service);
    if let Some(key) = cache.get(&id) {
        debug!(date, region, service, "Signing key cache hit");
        return key;
    }

    debug!(date, region, service, "Signing key cache miss");
    let key = derive_signing_key(secret_key, date, region, service);
    cache.insert(id, key);
    key
}

/// Fixed-capacity cache with least-recently-used eviction.
#[derive(Debug)]
pub struct LruSigningKeyCache {
    capacity: usize,
    inner: Mutex<LruState>,
}

#[derive(Debug, Default)]
struct LruState {
    // Each key with the tick of its last use.
    items: HashMap<SigningKeyId, (SigningKey, u64)>,
    // Last-use tick to key; the first entry is least recently used.
    order: BTreeMap<u64, SigningKeyId>,
    tick: u64,
}

impl LruState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn touch(&mut self, id: &SigningKeyId) -> Option<SigningKey> {
        let tick = self.next_tick();
        let (key, last_used) = self.items.get_mut(id)?;
        let previous = std::mem::replace(last_used, tick);
        let key = *key;
        if let Some(id) = self.order.remove(&previous) {
            self.order.insert(tick, id);
        }
        Some(key)
    }
}

impl LruSigningKeyCache {
    /// Create a cache holding at most `capacity` keys.
    ///
    /// A capacity of zero stores nothing.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(LruState::default()),
        }
    }

    /// Create a shareable cache holding at most `capacity` keys.
    #[must_use]
    pub fn shared(capacity: usize) -> Arc<dyn SigningKeyCache> {
        Arc::new(Self::new(capacity))
    }

    /// Maximum number of keys held.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LruSigningKeyCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SigningKeyCache for LruSigningKeyCache {
    fn get(&self, id: &SigningKeyId) -> Option<SigningKey> {
        self.inner.lock().touch(id)
    }

    fn insert(&self, id: SigningKeyId, key: SigningKey) {
        if self.capacity == 0 {
            return;
        }

        let mut state = self.inner.lock();
        let tick = state.next_tick();
        if let Some((_, previous)) = state.items.insert(id.clone(), (key, tick)) {
            state.order.remove(&previous);
        }
        state.order.insert(tick, id);

        while state.items.len() > self.capacity {
            let Some((_, evicted)) = state.order.pop_first() else {
                break;
            };
            state.items.remove(&evicted);
            debug!(?evicted, "Evicted signing key");
        }
    }

    fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    fn clear(&self) {
        let mut state = self.inner.lock();
        state.items.clear();
        state.order.clear();
    }
}

/// A cache that never stores anything; every lookup re-derives the key.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSigningKeyCache;

impl SigningKeyCache for NoopSigningKeyCache {
    fn get(&self, _id: &SigningKeyId) -> Option<SigningKey> {
        None
    }

    fn insert(&self, _id: SigningKeyId, _key: SigningKey) {}

    fn len(&self) -> usize {
        0
    }

    fn clear(&self) {}
}
