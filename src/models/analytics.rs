// src/models/analytics.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{CallSession, CallStatus};

/// Point-in-time view of an active call
#[derive(Debug, Clone, Serialize)]
pub struct CallStatusView {
    pub call_id: Uuid,
    pub status: CallStatus,
    pub phone_number: String,
    pub purpose: String,
    pub start_time: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl CallStatusView {
    pub fn from_session(session: &CallSession, now: DateTime<Utc>) -> Self {
        Self {
            call_id: session.call_id,
            status: session.status,
            phone_number: session.phone_number.clone(),
            purpose: session.purpose.clone(),
            start_time: session.start_time,
            duration_seconds: session.elapsed_seconds(now),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsSnapshot {
    pub total_calls: usize,
    pub active_calls: usize,
    pub completed_calls: usize,
    /// Mean over history, rounded to two decimals
    pub average_duration: f64,
    pub total_duration: i64,
}

impl AnalyticsSnapshot {
    pub fn compute(active_calls: usize, history: &[CallSession]) -> Self {
        let completed_calls = history.len();
        let total_duration: i64 = history.iter().map(|c| c.duration.unwrap_or(0)).sum();

        let average_duration = if completed_calls == 0 {
            0.0
        } else {
            let mean = total_duration as f64 / completed_calls as f64;
            (mean * 100.0).round() / 100.0
        };

        Self {
            total_calls: active_calls + completed_calls,
            active_calls,
            completed_calls,
            average_duration,
            total_duration,
        }
    }
}
