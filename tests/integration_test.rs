// tests/integration_test.rs
#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use voice_call_agent::api::routes;
    use voice_call_agent::config::LlmConfig;
    use voice_call_agent::gateway::{CallGateway, CallSettings, ProviderGateway, SubmissionMode};
    use voice_call_agent::scripts::{ScriptGenerator, ScriptLibrary, DEFAULT_SCRIPT};
    use voice_call_agent::services::{read_history, CallSessionRegistry};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct TestState {
        registry: Arc<CallSessionRegistry>,
        gateway: Arc<ProviderGateway>,
        generator: Arc<ScriptGenerator>,
        library: Arc<ScriptLibrary>,
        llm: LlmConfig,
    }

    fn state(server_uri: &str) -> TestState {
        let gateway = Arc::new(
            ProviderGateway::new(server_uri, 2000, SubmissionMode::Simulated, CallSettings::default())
                .unwrap(),
        );

        TestState {
            registry: Arc::new(CallSessionRegistry::new(gateway.clone() as Arc<dyn CallGateway>)),
            gateway,
            generator: Arc::new(ScriptGenerator::default()),
            library: Arc::new(ScriptLibrary::new()),
            llm: LlmConfig {
                base_url: server_uri.to_string(),
                api_key: None,
                model: "gemini-pro".to_string(),
            },
        }
    }

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.registry.clone()))
                    .app_data(web::Data::new($state.gateway.clone()))
                    .app_data(web::Data::new($state.generator.clone()))
                    .app_data(web::Data::new($state.library.clone()))
                    .app_data(web::Data::new($state.llm.clone()))
                    .configure(routes::configure),
            )
            .await
        };
    }

    async fn provider_mock(applications_status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/applications"))
            .respond_with(ResponseTemplate::new(applications_status))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "Greeting: Hello from the model" }] } }]
            })))
            .mount(&server)
            .await;
        server
    }

    /// Accepts only `provider-key`, rejects every other key
    async fn provider_mock_for_key() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/applications"))
            .and(header("authorization", "Bearer provider-key"))
            .respond_with(ResponseTemplate::new(200))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/applications"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        server
    }

    fn setup_payload() -> Value {
        json!({
            "llm_api_key": "llm-key",
            "provider_api_key": "provider-key",
            "provider_app_id": "app-1",
            "max_duration_minutes": 10,
            "record_calls": false
        })
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let state = state("http://127.0.0.1:9");
        let app = init_app!(state);

        let req = test::TestRequest::get()
            .uri("/api/v1/health")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_initiate_requires_setup() {
        let state = state("http://127.0.0.1:9");
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/calls")
            .set_json(json!({ "phone_number": "+15551234567", "script": "Hello" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "setup_required");
    }

    #[actix_web::test]
    async fn test_setup_rejects_missing_keys() {
        let state = state("http://127.0.0.1:9");
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/setup")
            .set_json(json!({ "provider_api_key": "k", "provider_app_id": "a" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_setup_with_invalid_credentials() {
        let server = provider_mock(401).await;
        let state = state(&server.uri());
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/setup")
            .set_json(setup_payload())
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!state.gateway.is_connected().await);
    }

    #[actix_web::test]
    async fn test_rejected_resetup_blocks_calls() {
        let server = provider_mock_for_key().await;
        let state = state(&server.uri());
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/setup")
            .set_json(setup_payload())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["setup_complete"], true);

        let mut payload = setup_payload();
        payload["provider_api_key"] = json!("revoked-key");
        payload["max_duration_minutes"] = json!(20);
        let req = test::TestRequest::post()
            .uri("/api/v1/setup")
            .set_json(payload)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get().uri("/api/v1/setup").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["setup_complete"], false);
        assert_eq!(body["provider_connected"], false);
        assert_eq!(body["max_duration_minutes"], 10);

        let req = test::TestRequest::post()
            .uri("/api/v1/calls")
            .set_json(json!({ "phone_number": "+15551234567", "script": "Hello" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::PRECONDITION_FAILED);
    }

    #[actix_web::test]
    async fn test_end_call_rejects_malformed_body() {
        let server = provider_mock(200).await;
        let state = state(&server.uri());
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/setup")
            .set_json(setup_payload())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/v1/calls")
            .set_json(json!({ "phone_number": "+15551234567", "script": "Hello" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let call_id = body["call_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/calls/{}/end", call_id))
            .set_json(json!({ "outcome": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_request");

        // Still active after the rejected request
        let req = test::TestRequest::get().uri(&format!("/api/v1/calls/{}", call_id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/calls/{}/end", call_id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/v1/history").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body[0]["call_outcome"].is_null());
    }

    #[actix_web::test]
    async fn test_generate_script_without_model_uses_default() {
        let state = state("http://127.0.0.1:9");
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/scripts/generate")
            .set_json(json!({ "purpose": "Sales Outreach", "context": "new lead" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fallback"], true);
        assert_eq!(body["script"], DEFAULT_SCRIPT);
    }

    #[actix_web::test]
    async fn test_script_library_endpoints() {
        let state = state("http://127.0.0.1:9");
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/scripts")
            .set_json(json!({ "name": "renewal", "script": "Greeting: hi" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/v1/scripts/renewal").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["script"], "Greeting: hi");

        let req = test::TestRequest::get().uri("/api/v1/scripts/missing").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/v1/scripts/templates").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_full_call_lifecycle() {
        let server = provider_mock(200).await;
        let state = state(&server.uri());
        let app = init_app!(state);

        // Setup
        let req = test::TestRequest::post()
            .uri("/api/v1/setup")
            .set_json(setup_payload())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["setup_complete"], true);
        assert_eq!(body["max_duration_minutes"], 10);
        assert_eq!(body["record_calls"], false);

        // Script from the model
        let req = test::TestRequest::post()
            .uri("/api/v1/scripts/generate")
            .set_json(json!({ "purpose": "Customer Service", "context": "late order" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["fallback"], false);
        let script = body["script"].as_str().unwrap().to_string();

        // Validation
        let req = test::TestRequest::post()
            .uri("/api/v1/calls")
            .set_json(json!({ "phone_number": "", "script": script }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        // Initiate
        let req = test::TestRequest::post()
            .uri("/api/v1/calls")
            .set_json(json!({
                "phone_number": "+15551234567",
                "script": script,
                "purpose": "Customer Service"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let call_id = body["call_id"].as_str().unwrap().to_string();

        // Status, activation and transcript
        let req = test::TestRequest::get().uri(&format!("/api/v1/calls/{}", call_id)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "initiated");

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/calls/{}/activate", call_id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/calls/{}/turns", call_id))
            .set_json(json!({ "role": "agent", "text": "Hello!" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri("/api/v1/calls").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["status"], "active");

        // End twice
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/calls/{}/end", call_id))
            .set_json(json!({ "outcome": "resolved" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/calls/{}/end", call_id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/calls/{}/transcript", call_id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["text"], "Hello!");

        // Analytics and export
        let req = test::TestRequest::get().uri("/api/v1/analytics").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_calls"], 1);
        assert_eq!(body["active_calls"], 0);
        assert_eq!(body["completed_calls"], 1);

        let req = test::TestRequest::get().uri("/api/v1/history/export").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("call_history_"));

        let csv = test::read_body(resp).await;
        let records = read_history(&csv[..]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].phone_number, "+15551234567");
        assert_eq!(records[0].outcome.as_deref(), Some("resolved"));
    }

    #[actix_web::test]
    async fn test_unknown_call_is_not_found() {
        let state = state("http://127.0.0.1:9");
        let app = init_app!(state);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/calls/{}", uuid::Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "call_not_found");
    }
}
