//! Signing-key cache transparency.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fidem_auth::signing_key::{SigningKeyId, derive_signing_key, signing_key};
    use fidem_auth::{LruSigningKeyCache, NoopSigningKeyCache, Signer, SigningKeyCache, Verifier};

    use crate::{fixed_now, sample_request, test_credentials};

    fn authorization_with(cache: Arc<dyn SigningKeyCache>) -> String {
        let mut request = sample_request();
        Signer::with_cache(cache)
            .sign_at(&mut request, &test_credentials(), fixed_now())
            .authorization
    }

    #[test]
    fn test_should_sign_identically_with_any_cache() {
        let lru = authorization_with(LruSigningKeyCache::shared(1000));
        let tiny = authorization_with(LruSigningKeyCache::shared(1));
        let zero = authorization_with(LruSigningKeyCache::shared(0));
        let noop = authorization_with(Arc::new(NoopSigningKeyCache));
        assert_eq!(lru, tiny);
        assert_eq!(lru, zero);
        assert_eq!(lru, noop);
    }

    #[test]
    fn test_should_return_same_key_from_cache_and_derivation() {
        let cache = LruSigningKeyCache::new(2);
        let derived = derive_signing_key("secret", "20141026", "eu-west-1", "fidem");
        let miss = signing_key(&cache, "secret", "20141026", "eu-west-1", "fidem");
        let hit = signing_key(&cache, "secret", "20141026", "eu-west-1", "fidem");
        assert_eq!(derived, miss);
        assert_eq!(miss, hit);
    }

    #[test]
    fn test_should_rederive_same_key_after_eviction() {
        let cache = LruSigningKeyCache::new(1);
        let id = SigningKeyId::new("secret", "20141026", "eu-west-1", "fidem");
        let before = signing_key(&cache, "secret", "20141026", "eu-west-1", "fidem");
        let _ = signing_key(&cache, "secret", "20141027", "eu-west-1", "fidem");
        assert!(cache.get(&id).is_none());
        let after = signing_key(&cache, "secret", "20141026", "eu-west-1", "fidem");
        assert_eq!(before, after);
    }

    #[test]
    fn test_should_verify_with_cold_cache() {
        let mut request = sample_request();
        Signer::new().sign_at(&mut request, &test_credentials(), fixed_now());

        let verifier = Verifier::new().with_cache(Arc::new(NoopSigningKeyCache));
        assert!(verifier.verify(&request, &test_credentials()).unwrap());
    }

    #[test]
    fn test_should_sign_concurrently_through_shared_cache() {
        let cache = LruSigningKeyCache::shared(4);
        let signer = Signer::with_cache(Arc::clone(&cache));
        let expected = authorization_with(Arc::new(NoopSigningKeyCache));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let signer = signer.clone();
                std::thread::spawn(move || {
                    let mut request = sample_request();
                    signer
                        .sign_at(&mut request, &test_credentials(), fixed_now())
                        .authorization
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
        assert_eq!(cache.len(), 1);
    }
}
