// src/scripts/library.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::AgentError;

#[derive(Debug, Clone, Serialize)]
pub struct SavedScript {
    pub name: String,
    pub script: String,
    pub saved_at: DateTime<Utc>,
}

/// In-memory store of operator-authored scripts, keyed by name
#[derive(Default)]
pub struct ScriptLibrary {
    scripts: RwLock<BTreeMap<String, SavedScript>>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saving under an existing name replaces the earlier script
    pub async fn save(&self, name: &str, script: &str) -> Result<SavedScript, AgentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AgentError::InvalidRequest("script name is required".to_string()));
        }
        if script.trim().is_empty() {
            return Err(AgentError::InvalidRequest("script is empty".to_string()));
        }

        let saved = SavedScript {
            name: name.to_string(),
            script: script.to_string(),
            saved_at: Utc::now(),
        };

        self.scripts.write().await.insert(saved.name.clone(), saved.clone());
        info!("💾 Script '{}' saved", saved.name);

        Ok(saved)
    }

    pub async fn get(&self, name: &str) -> Result<SavedScript, AgentError> {
        self.scripts
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| AgentError::ScriptNotFound(name.to_string()))
    }

    pub async fn list(&self) -> Vec<SavedScript> {
        self.scripts.read().await.values().cloned().collect()
    }
}
