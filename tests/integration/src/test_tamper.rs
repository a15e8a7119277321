//! Tampering with a signed request must break verification.

#[cfg(test)]
mod tests {
    use fidem_auth::SignableRequest;

    use crate::{sample_request, sign, test_credentials, verify};

    fn signed() -> SignableRequest {
        let request = sign(sample_request(), &test_credentials());
        assert!(verify(&request, &test_credentials()));
        request
    }

    #[test]
    fn test_should_reject_changed_method() {
        let mut request = signed();
        request.method = Some("PUT".to_owned());
        assert!(!verify(&request, &test_credentials()));
    }

    #[test]
    fn test_should_reject_changed_body() {
        let mut request = signed();
        request.body = "name=widget&qty=300".into();
        assert!(!verify(&request, &test_credentials()));
    }

    #[test]
    fn test_should_reject_changed_path() {
        let mut request = signed();
        request.path = Some("/v1/admin?limit=5&offset=10".to_owned());
        assert!(!verify(&request, &test_credentials()));
    }

    #[test]
    fn test_should_reject_changed_query() {
        let mut request = signed();
        request.path = Some("/v1/items?limit=500&offset=10".to_owned());
        assert!(!verify(&request, &test_credentials()));
    }

    #[test]
    fn test_should_reject_changed_signed_header_value() {
        for name in ["Host", "Content-Type", "Content-Length", "X-Request-Id", "X-Fidem-Date"] {
            let mut request = signed();
            request.headers.insert(name, "tampered");
            assert!(!verify(&request, &test_credentials()), "{name} was not signed");
        }
    }

    #[test]
    fn test_should_reject_removed_signed_header() {
        let mut request = signed();
        request.headers.remove("X-Request-Id");
        assert!(!verify(&request, &test_credentials()));
    }

    #[test]
    fn test_should_reject_changed_signature() {
        let mut request = signed();
        let authorization = request.headers.get("Authorization").unwrap().to_owned();
        let last = authorization.chars().last().unwrap();
        let flipped = if last == '0' { '1' } else { '0' };
        let mut tampered = authorization[..authorization.len() - 1].to_owned();
        tampered.push(flipped);
        request.headers.insert("Authorization", tampered);
        assert!(!verify(&request, &test_credentials()));
    }

    #[test]
    fn test_should_reject_changed_credential_scope() {
        let mut request = signed();
        let authorization = request
            .headers
            .get("Authorization")
            .unwrap()
            .replace("/eu-west-1/", "/us-east-1/");
        request.headers.insert("Authorization", authorization);
        assert!(!verify(&request, &test_credentials()));
    }

    #[test]
    fn test_should_tolerate_whitespace_only_header_changes() {
        let mut request = signed();
        request.headers.insert("X-Request-Id", "abc 123");
        assert!(verify(&request, &test_credentials()));
    }
}
