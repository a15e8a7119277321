//! Timestamp freshness checks.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use fidem_auth::{AuthConfig, SignableRequest, Signer, Verifier, parse_authorization_header};

    use crate::{sample_request, test_credentials};

    fn signed_minutes_ago(minutes: i64) -> SignableRequest {
        let mut request = sample_request();
        let then = Utc::now() - chrono::Duration::minutes(minutes);
        Signer::new().sign_at(&mut request, &test_credentials(), then);
        request
    }

    fn is_fresh(verifier: &Verifier, request: &SignableRequest) -> bool {
        let params = parse_authorization_header(request).unwrap();
        verifier.validate_date(request, &params)
    }

    #[test]
    fn test_should_accept_request_signed_fourteen_minutes_ago() {
        assert!(is_fresh(&Verifier::new(), &signed_minutes_ago(14)));
    }

    #[test]
    fn test_should_reject_request_signed_sixteen_minutes_ago() {
        assert!(!is_fresh(&Verifier::new(), &signed_minutes_ago(16)));
    }

    #[test]
    fn test_should_keep_signature_valid_when_stale() {
        let request = signed_minutes_ago(60);
        let verifier = Verifier::new();
        assert!(!is_fresh(&verifier, &request));
        assert!(verifier.verify(&request, &test_credentials()).unwrap());
    }

    #[test]
    fn test_should_use_configured_window() {
        let config = AuthConfig {
            max_request_age_secs: 30 * 60,
            ..AuthConfig::default()
        };
        assert!(is_fresh(&Verifier::from_config(&config), &signed_minutes_ago(20)));

        let strict = Verifier::new().with_max_request_age(Duration::from_secs(5 * 60));
        assert!(!is_fresh(&strict, &signed_minutes_ago(10)));
    }
}
