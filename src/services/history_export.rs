// src/services/history_export.rs
//! Call history as CSV
//!
//! Columns: Phone Number, Status, Start Time, Duration (s), Outcome.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;

use crate::error::AgentError;
use crate::models::{CallSession, CallStatus};

pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "Phone Number")]
    pub phone_number: String,
    #[serde(rename = "Status", with = "status_label")]
    pub status: CallStatus,
    #[serde(rename = "Start Time", with = "start_time")]
    pub start_time: NaiveDateTime,
    #[serde(rename = "Duration (s)")]
    pub duration_secs: i64,
    /// Written as an empty cell when the call had no outcome
    #[serde(rename = "Outcome")]
    pub outcome: Option<String>,
}

impl From<&CallSession> for HistoryRecord {
    fn from(session: &CallSession) -> Self {
        Self {
            phone_number: session.phone_number.clone(),
            status: session.status,
            start_time: session.start_time.naive_utc(),
            duration_secs: session.duration.unwrap_or(0),
            outcome: session.call_outcome.clone(),
        }
    }
}

/// `call_history_<YYYYMMDD_HHMMSS>.csv`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("call_history_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

pub fn write_history<W: io::Write>(sessions: &[CallSession], writer: W) -> Result<(), AgentError> {
    let mut wtr = csv::Writer::from_writer(writer);

    for session in sessions {
        wtr.serialize(HistoryRecord::from(session))?;
    }

    wtr.flush()
        .map_err(|e| AgentError::Internal(format!("Failed to flush history export: {}", e)))
}

/// Whole export as a string, header row included even with no history
pub fn export_csv(sessions: &[CallSession]) -> Result<String, AgentError> {
    if sessions.is_empty() {
        return Ok("Phone Number,Status,Start Time,Duration (s),Outcome\n".to_string());
    }

    let mut buf = Vec::new();
    write_history(sessions, &mut buf)?;

    String::from_utf8(buf).map_err(|e| AgentError::Internal(e.to_string()))
}

pub fn read_history<R: io::Read>(reader: R) -> Result<Vec<HistoryRecord>, AgentError> {
    let mut rdr = csv::Reader::from_reader(reader);

    rdr.deserialize::<HistoryRecord>()
        .map(|record| record.map_err(AgentError::from))
        .collect()
}

mod status_label {
    use super::CallStatus;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(status: &CallStatus, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(status.label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CallStatus, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

mod start_time {
    use super::START_TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(START_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, START_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}
