//! Sign-then-verify round trips over varied requests.

#[cfg(test)]
mod tests {
    use fidem_auth::{Body, Credentials, SignableRequest, Verifier};

    use crate::{sample_request, sign, test_credentials, verify};

    fn requests() -> Vec<SignableRequest> {
        vec![
            SignableRequest::new(),
            sample_request(),
            SignableRequest::new().with_path("?only=query"),
            SignableRequest::new().with_path("/a/b/c?x=1?y=2"),
            SignableRequest::new()
                .with_method("PUT")
                .with_header("Content-Type", "application/json")
                .with_body(serde_json::json!({"z": [1, 2], "a": {"nested": true}})),
            SignableRequest::new().with_body(Body::Bytes(vec![0, 159, 146, 150])),
            SignableRequest::new()
                .with_header("X-Empty", "")
                .with_header("X-Spaces", "\t lots   of\n whitespace  "),
            SignableRequest::new()
                .with_header("Host", "upper.example.com")
                .with_header("x-numeric", 12345),
        ]
    }

    #[test]
    fn test_should_verify_every_signed_request() {
        for request in requests() {
            let signed = sign(request.clone(), &test_credentials());
            assert!(verify(&signed, &test_credentials()), "failed for {request:?}");
        }
    }

    #[test]
    fn test_should_verify_with_session_token() {
        let credentials = test_credentials().with_session_token("temporary-token");
        let signed = sign(sample_request(), &credentials);

        assert_eq!(
            signed.headers.get("X-Fidem-Security-Token"),
            Some("temporary-token")
        );
        assert!(verify(&signed, &credentials));
    }

    #[test]
    fn test_should_verify_after_resigning() {
        let once = sign(sample_request(), &test_credentials());
        let other = Credentials::new("otherKey", "otherSecret");
        let twice = sign(once, &other);

        assert!(verify(&twice, &other));
        assert!(!verify(&twice, &test_credentials()));
    }

    #[test]
    fn test_should_produce_identical_signature_regardless_of_header_order() {
        let forward = SignableRequest::new()
            .with_header("X-A", "1")
            .with_header("X-B", "2")
            .with_header("X-C", "3");
        let backward = SignableRequest::new()
            .with_header("x-c", "3")
            .with_header("X-b", "2")
            .with_header("X-A", "1");

        let forward = sign(forward, &test_credentials());
        let backward = sign(backward, &test_credentials());

        assert_eq!(
            forward.headers.get("Authorization"),
            backward.headers.get("Authorization")
        );
    }

    #[test]
    fn test_should_verify_access_key_id_containing_slash() {
        let credentials = Credentials::new("akid/with/slash", "mySecretAccessKey");
        let signed = sign(sample_request(), &credentials);

        let authorization = signed.headers.get("Authorization").unwrap_or_default();
        assert!(authorization.contains("Credential=akid/with/slash/20141026/eu-west-1/fidem/"));
        assert!(verify(&signed, &credentials));
    }

    #[test]
    fn test_should_not_verify_scopes_the_header_cannot_carry() {
        let cases = [
            (Credentials::new("ak=id", "secret"), "eu-west-1"),
            (Credentials::new("ak id", "secret"), "eu-west-1"),
            (test_credentials(), "eu/west"),
            (test_credentials(), "eu west"),
            (test_credentials(), "eu,west"),
        ];
        for (credentials, region) in cases {
            let signed = sign(sample_request().with_region(region), &credentials);
            let accepted = Verifier::new()
                .verify(&signed, &credentials)
                .unwrap_or(false);
            assert!(!accepted, "{region} / {credentials:?} should not verify");
        }
    }
}
