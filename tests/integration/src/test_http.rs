//! Interop with `http` request types.

#[cfg(test)]
mod tests {
    use fidem_auth::{SignableRequest, Signer};

    use crate::{fixed_now, test_credentials, verify};

    #[test]
    fn test_should_sign_http_request_and_verify_on_receipt() {
        let client_request = http::Request::builder()
            .method("POST")
            .uri("https://api.example.com/v1/items?limit=5")
            .header("content-type", "application/json")
            .body(r#"{"name":"widget"}"#.to_owned())
            .unwrap();

        // Client side: sign and copy headers onto the outgoing request.
        let (mut parts, body) = client_request.into_parts();
        let mut signable = SignableRequest::from_parts(&parts, body.clone())
            .with_region("eu-west-1")
            .with_service("fidem");
        Signer::new().sign_at(&mut signable, &test_credentials(), fixed_now());
        signable.write_headers(&mut parts.headers).unwrap();

        assert!(parts.headers.contains_key("x-fidem-date"));
        assert!(parts.headers.contains_key(http::header::AUTHORIZATION));
        assert_eq!(parts.headers.get(http::header::HOST).unwrap(), "api.example.com");

        // Server side: rebuild from what arrived on the wire.
        let received = SignableRequest::from_parts(&parts, body);
        assert!(verify(&received, &test_credentials()));
    }

    #[test]
    fn test_should_reject_http_request_with_modified_uri() {
        let (mut parts, ()) = http::Request::builder()
            .method("GET")
            .uri("https://api.example.com/v1/items")
            .body(())
            .unwrap()
            .into_parts();

        let mut signable = SignableRequest::from_parts(&parts, "");
        Signer::new().sign_at(&mut signable, &test_credentials(), fixed_now());
        signable.write_headers(&mut parts.headers).unwrap();

        parts.uri = "https://api.example.com/v1/other".parse().unwrap();
        let received = SignableRequest::from_parts(&parts, "");
        assert!(!verify(&received, &test_credentials()));
    }
}
