// src/error.rs
use thiserror::Error;
use actix_web::{http::StatusCode, ResponseError, HttpResponse};
use serde_json::json;

use crate::models::CallStatus;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Call not found: {0}")]
    CallNotFound(String),

    #[error("Call initiation failed: {0}")]
    InitiationFailed(String),

    #[error("Invalid transition for call {call_id}: {from} -> {to}")]
    InvalidTransition {
        call_id: String,
        from: CallStatus,
        to: CallStatus,
    },

    #[error("Invalid provider credentials: {0}")]
    InvalidCredentials(String),

    #[error("Calling agent is not set up: {0}")]
    SetupRequired(String),

    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    #[error("Export error: {0}")]
    Export(#[from] csv::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AgentError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        HttpResponse::build(status_code).json(json!({
            "error": self.error_code(),
            "message": self.to_string(),
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AgentError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AgentError::CallNotFound(_) => StatusCode::NOT_FOUND,
            AgentError::ScriptNotFound(_) => StatusCode::NOT_FOUND,
            AgentError::InitiationFailed(_) => StatusCode::BAD_GATEWAY,
            AgentError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AgentError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            AgentError::SetupRequired(_) => StatusCode::PRECONDITION_FAILED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AgentError {
    pub fn error_code(&self) -> &str {
        match self {
            AgentError::InvalidRequest(_) => "invalid_request",
            AgentError::CallNotFound(_) => "call_not_found",
            AgentError::InitiationFailed(_) => "initiation_failed",
            AgentError::InvalidTransition { .. } => "invalid_transition",
            AgentError::InvalidCredentials(_) => "invalid_credentials",
            AgentError::SetupRequired(_) => "setup_required",
            AgentError::ScriptNotFound(_) => "script_not_found",
            AgentError::Export(_) => "export_error",
            AgentError::Internal(_) => "internal_error",
        }
    }
}
