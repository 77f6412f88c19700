// src/models/mod.rs
pub mod session;
pub mod analytics;

pub use session::{CallSession, CallStatus, ConversationTurn, TurnRole, DEFAULT_PURPOSE};
pub use analytics::{AnalyticsSnapshot, CallStatusView};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==================== API DTOs ====================

#[derive(Debug, Deserialize)]
pub struct InitiateCallRequest {
    pub phone_number: String,
    pub script: String,
    #[serde(default)]
    pub purpose: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InitiateCallResponse {
    pub success: bool,
    pub call_id: Uuid,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EndCallRequest {
    #[serde(default)]
    pub outcome: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FailCallRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct AppendTurnRequest {
    pub role: TurnRole,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateScriptRequest {
    pub purpose: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveScriptRequest {
    pub name: String,
    pub script: String,
}

#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    #[serde(default)]
    pub llm_api_key: Option<String>,
    #[serde(default)]
    pub provider_api_key: Option<String>,
    #[serde(default)]
    pub provider_app_id: Option<String>,
    #[serde(default)]
    pub max_duration_minutes: Option<u32>,
    #[serde(default)]
    pub record_calls: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SetupResponse {
    pub setup_complete: bool,
    pub llm_configured: bool,
    pub provider_connected: bool,
    pub max_duration_minutes: u32,
    pub record_calls: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
