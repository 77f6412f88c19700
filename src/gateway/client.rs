//! HTTP client for the calling platform
//!
//! Credential validation always talks to the provider. Call submission is
//! simulated unless the gateway was built in [`SubmissionMode::Live`].

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use super::types::{CallRequest, CallSettings, CallSubmission, ProviderCredentials, SubmissionMode};

/// Errors from the calling platform boundary
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Provider rejected the call (status {0}): {1}")]
    Rejected(u16, String),

    #[error("Timeout: request took longer than {0}ms")]
    Timeout(u64),

    #[error("Provider credentials not configured")]
    NotConfigured,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Outbound call submission seam used by the session registry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallGateway: Send + Sync {
    async fn submit_call(&self, request: &CallRequest) -> Result<(), GatewayError>;
}

pub struct ProviderGateway {
    http_client: Client,
    base_url: String,
    timeout_ms: u64,
    mode: SubmissionMode,
    credentials: RwLock<Option<ProviderCredentials>>,
    settings: RwLock<CallSettings>,
}

impl ProviderGateway {
    /// * `base_url` - provider API root (e.g. "https://app.dasha.ai/api/v2")
    /// * `timeout_ms` - per-request timeout
    pub fn new(
        base_url: &str,
        timeout_ms: u64,
        mode: SubmissionMode,
        settings: CallSettings,
    ) -> Result<Self, GatewayError> {
        let http_client = ClientBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
            mode,
            credentials: RwLock::new(None),
            settings: RwLock::new(settings),
        })
    }

    pub fn mode(&self) -> SubmissionMode {
        self.mode
    }

    pub async fn is_connected(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    pub async fn settings(&self) -> CallSettings {
        *self.settings.read().await
    }

    pub async fn update_settings(&self, settings: CallSettings) {
        *self.settings.write().await = settings;
        info!(
            "Call settings updated: max_duration={}min, record_call={}",
            settings.max_duration_minutes, settings.record_call
        );
    }

    /// Lists the provider's applications with the given key.
    /// Only a 2xx counts as valid; any transport failure is `false`.
    #[instrument(skip(self, api_key))]
    pub async fn validate_credentials(&self, api_key: &str, app_id: &str) -> bool {
        let response = self
            .http_client
            .get(format!("{}/applications", self.base_url))
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                debug!("Provider credentials accepted for app {}", app_id);
                true
            }
            Ok(resp) => {
                warn!("Provider rejected credentials: status={}", resp.status());
                false
            }
            Err(e) => {
                error!("Provider connection failed: {}", e);
                false
            }
        }
    }

    /// Validates and, on success, stores the credentials used for live submission.
    /// A rejected attempt drops any previously stored credentials.
    pub async fn connect(&self, api_key: &str, app_id: &str) -> bool {
        if !self.validate_credentials(api_key, app_id).await {
            if self.credentials.write().await.take().is_some() {
                warn!("Calling platform disconnected after rejected credentials");
            }
            return false;
        }

        *self.credentials.write().await = Some(ProviderCredentials {
            api_key: api_key.to_string(),
            app_id: app_id.to_string(),
        });

        info!("✅ Calling platform connected (app {})", app_id);
        true
    }

    async fn submit_live(&self, request: &CallRequest) -> Result<(), GatewayError> {
        let credentials = self
            .credentials
            .read()
            .await
            .clone()
            .ok_or(GatewayError::NotConfigured)?;
        let settings = self.settings().await;

        let payload = CallSubmission::build(&credentials.app_id, request, &settings);

        let response = self
            .http_client
            .post(format!("{}/calls", self.base_url))
            .bearer_auth(&credentials.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(self.timeout_ms)
                } else {
                    GatewayError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Provider call submission failed: status={}, body={}", status, body);
            return Err(GatewayError::Rejected(status.as_u16(), body));
        }

        Ok(())
    }
}

#[async_trait]
impl CallGateway for ProviderGateway {
    #[instrument(skip(self, request), fields(call_id = %request.call_id))]
    async fn submit_call(&self, request: &CallRequest) -> Result<(), GatewayError> {
        match self.mode {
            SubmissionMode::Simulated => {
                info!(
                    "📞 SIMULATED: call {} to {} accepted ({})",
                    request.call_id, request.phone_number, request.purpose
                );
                Ok(())
            }
            SubmissionMode::Live => self.submit_live(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(base_url: &str, mode: SubmissionMode) -> ProviderGateway {
        ProviderGateway::new(base_url, 2000, mode, CallSettings::default()).unwrap()
    }

    fn request() -> CallRequest {
        CallRequest {
            call_id: Uuid::new_v4(),
            phone_number: "+15551234567".to_string(),
            script: "Greeting: hello".to_string(),
            purpose: "Customer Service".to_string(),
        }
    }

    #[tokio::test]
    async fn test_validate_credentials_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/applications"))
            .and(header("authorization", "Bearer good-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let gw = gateway(&server.uri(), SubmissionMode::Simulated);
        assert!(gw.validate_credentials("good-key", "app-1").await);
    }

    #[tokio::test]
    async fn test_validate_credentials_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/applications"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let gw = gateway(&server.uri(), SubmissionMode::Simulated);
        assert!(!gw.validate_credentials("bad-key", "app-1").await);
        assert!(!gw.connect("bad-key", "app-1").await);
        assert!(!gw.is_connected().await);
    }

    #[tokio::test]
    async fn test_rejected_reconnect_drops_stored_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/applications"))
            .and(header("authorization", "Bearer good-key"))
            .respond_with(ResponseTemplate::new(200))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/applications"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let gw = gateway(&server.uri(), SubmissionMode::Live);
        assert!(gw.connect("good-key", "app-1").await);
        assert!(gw.is_connected().await);

        assert!(!gw.connect("bad-key", "app-1").await);
        assert!(!gw.is_connected().await);
        assert!(matches!(
            gw.submit_call(&request()).await,
            Err(GatewayError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_validate_credentials_unreachable() {
        // Nothing listens on port 9 locally
        let gw = gateway("http://127.0.0.1:9", SubmissionMode::Simulated);
        assert!(!gw.validate_credentials("key", "app").await);
    }

    #[tokio::test]
    async fn test_simulated_submission_needs_no_credentials() {
        let gw = gateway("http://127.0.0.1:9", SubmissionMode::Simulated);
        assert!(gw.submit_call(&request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_live_submission_without_credentials() {
        let gw = gateway("http://127.0.0.1:9", SubmissionMode::Live);
        assert!(matches!(
            gw.submit_call(&request()).await,
            Err(GatewayError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_live_submission_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/applications"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/calls"))
            .and(header("authorization", "Bearer key-1"))
            .and(body_partial_json(serde_json::json!({
                "application_id": "app-1",
                "phone_number": "+15551234567",
                "config": { "max_duration": 300, "record_call": true }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let gw = gateway(&server.uri(), SubmissionMode::Live);
        assert!(gw.connect("key-1", "app-1").await);
        gw.submit_call(&request()).await.unwrap();
    }

    #[tokio::test]
    async fn test_live_submission_surfaces_provider_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/applications"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/calls"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid phone number"))
            .mount(&server)
            .await;

        let gw = gateway(&server.uri(), SubmissionMode::Live);
        assert!(gw.connect("key-1", "app-1").await);

        match gw.submit_call(&request()).await {
            Err(GatewayError::Rejected(status, body)) => {
                assert_eq!(status, 422);
                assert_eq!(body, "invalid phone number");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
