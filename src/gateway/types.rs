//! Calling platform types: submission payload and call settings

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AgentError;

pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 30;

/// How call submissions reach the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionMode {
    /// No network I/O, every submission is accepted
    Simulated,
    /// POST to the provider's calls endpoint
    Live,
}

impl FromStr for SubmissionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" => Ok(SubmissionMode::Simulated),
            "live" => Ok(SubmissionMode::Live),
            other => Err(format!("Invalid SUBMISSION_MODE: {}", other)),
        }
    }
}

/// Operator call settings forwarded to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallSettings {
    pub max_duration_minutes: u32,
    pub record_call: bool,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            max_duration_minutes: 5,
            record_call: true,
        }
    }
}

impl CallSettings {
    pub fn new(max_duration_minutes: u32, record_call: bool) -> Result<Self, AgentError> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&max_duration_minutes) {
            return Err(AgentError::InvalidRequest(format!(
                "max duration must be between {} and {} minutes, got {}",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES, max_duration_minutes
            )));
        }

        Ok(Self {
            max_duration_minutes,
            record_call,
        })
    }

    pub fn max_duration_secs(&self) -> u64 {
        u64::from(self.max_duration_minutes) * 60
    }
}

#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub api_key: String,
    pub app_id: String,
}

/// What the registry hands to the gateway for one outbound call
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub call_id: Uuid,
    pub phone_number: String,
    pub script: String,
    pub purpose: String,
}

/// Body of `POST /calls`
#[derive(Debug, Serialize)]
pub struct CallSubmission {
    pub application_id: String,
    pub external_id: String,
    pub phone_number: String,
    pub config: CallSubmissionConfig,
}

#[derive(Debug, Serialize)]
pub struct CallSubmissionConfig {
    pub conversation_script: String,
    pub call_purpose: String,
    pub max_duration: u64,
    pub record_call: bool,
}

impl CallSubmission {
    pub fn build(app_id: &str, request: &CallRequest, settings: &CallSettings) -> Self {
        Self {
            application_id: app_id.to_string(),
            external_id: request.call_id.to_string(),
            phone_number: request.phone_number.clone(),
            config: CallSubmissionConfig {
                conversation_script: request.script.clone(),
                call_purpose: request.purpose.clone(),
                max_duration: settings.max_duration_secs(),
                record_call: settings.record_call,
            },
        }
    }
}
