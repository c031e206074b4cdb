#[cfg(test)]
mod tests {
    use crate::api::ApiError;
    use crate::http::HttpTransport;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_sends_json_body_and_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"amount": 10.5})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(server.uri());
        let value = transport.post("/payment", &json!({"amount": 10.5})).await.unwrap();

        assert_eq!(value, json!({"ok": true}));
        assert_eq!(transport.metrics().get_stats().total_requests, 1);
    }

    #[tokio::test]
    async fn test_get_and_delete_carry_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/admin/reset"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0})))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(server.uri());
        assert_eq!(transport.get("/stats").await.unwrap(), json!({"total": 0}));
        assert_eq!(transport.delete("/admin/reset").await.unwrap(), json!({"total": 0}));
    }

    #[tokio::test]
    async fn test_trailing_slash_on_base_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(format!("{}/", server.uri()));
        assert!(!transport.base_url().ends_with('/'));
        transport.get("/stats").await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transaction/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "Transaction not found"})),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(server.uri());
        let err = transport.get("/transaction/missing").await.unwrap_err();

        match &err {
            ApiError::Remote { status, body, detail } => {
                assert_eq!(*status, 404);
                assert!(body.contains("Transaction not found"));
                assert!(detail.is_some());
            }
            other => panic!("expected remote error, got {other:?}"),
        }
        assert_eq!(transport.metrics().get_stats().remote_errors, 1);
    }

    #[tokio::test]
    async fn test_invalid_json_becomes_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(server.uri());
        let err = transport.get("/stats").await.unwrap_err();

        assert!(matches!(err, ApiError::Decode { .. }));
        assert_eq!(transport.metrics().get_stats().decode_errors, 1);
    }

    #[tokio::test]
    async fn test_unreachable_service_becomes_network_error() {
        // Bind then drop a listener so the port is known to be closed.
        let uri = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };

        let transport = HttpTransport::new(uri);
        let err = transport.get("/stats").await.unwrap_err();

        assert!(matches!(err, ApiError::Network { .. }));
        let stats = transport.metrics().get_stats();
        assert_eq!(stats.network_errors, 1);
        assert_eq!(stats.failures(), 1);
    }
}
