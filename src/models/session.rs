// src/models/session.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Purpose recorded when the operator leaves it blank
pub const DEFAULT_PURPOSE: &str = "General";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Initiated,
    Active,
    Completed,
    Failed,
}

impl CallStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallStatus::Completed | CallStatus::Failed)
    }

    /// Forward-only transitions. A call may terminate before the provider
    /// ever confirmed it, so `Initiated` can skip `Active`.
    pub fn can_transition_to(&self, next: CallStatus) -> bool {
        match (self, next) {
            (CallStatus::Initiated, CallStatus::Active) => true,
            (CallStatus::Initiated, CallStatus::Completed | CallStatus::Failed) => true,
            (CallStatus::Active, CallStatus::Completed | CallStatus::Failed) => true,
            _ => false,
        }
    }

    /// Title-cased label used by the dashboard and the history export
    pub fn label(&self) -> &'static str {
        match self {
            CallStatus::Initiated => "Initiated",
            CallStatus::Active => "Active",
            CallStatus::Completed => "Completed",
            CallStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallStatus::Initiated => write!(f, "initiated"),
            CallStatus::Active => write!(f, "active"),
            CallStatus::Completed => write!(f, "completed"),
            CallStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "initiated" => Ok(CallStatus::Initiated),
            "active" => Ok(CallStatus::Active),
            "completed" => Ok(CallStatus::Completed),
            "failed" => Ok(CallStatus::Failed),
            other => Err(format!("unknown call status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    Agent,
    Callee,
}

/// One utterance in the call transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// One outbound call attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSession {
    pub call_id: Uuid,
    pub phone_number: String,
    pub purpose: String,
    pub status: CallStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Whole seconds, only set once the call is terminal
    pub duration: Option<i64>,
    pub conversation_log: Vec<ConversationTurn>,
    pub call_outcome: Option<String>,
}

impl CallSession {
    pub fn new(call_id: Uuid, phone_number: String, purpose: String, start_time: DateTime<Utc>) -> Self {
        Self {
            call_id,
            phone_number,
            purpose,
            status: CallStatus::Initiated,
            start_time,
            end_time: None,
            duration: None,
            conversation_log: Vec::new(),
            call_outcome: None,
        }
    }

    /// Recorded duration for terminal calls, time since start otherwise
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        match self.duration {
            Some(duration) => duration,
            None => (now - self.start_time).num_seconds().max(0),
        }
    }

    /// Stamps end time, duration and outcome. Caller must have checked the
    /// transition; end fields are written exactly once.
    pub(crate) fn terminate(&mut self, status: CallStatus, end_time: DateTime<Utc>, outcome: Option<String>) {
        debug_assert!(status.is_terminal());
        debug_assert!(self.end_time.is_none());

        self.status = status;
        self.end_time = Some(end_time);
        self.duration = Some((end_time - self.start_time).num_seconds().max(0));
        self.call_outcome = outcome;
    }
}
