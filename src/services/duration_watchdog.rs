// src/services/duration_watchdog.rs
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AgentError;
use crate::models::CallStatus;
use crate::services::call_registry::RegistryCore;

pub const TIMEOUT_OUTCOME: &str = "timeout";

/// One timer per active call; when it fires the call is ended with
/// outcome "timeout".
pub struct DurationWatchdog {
    limit: RwLock<Duration>,
    timers: Arc<Mutex<HashMap<Uuid, JoinHandle<()>>>>,
}

impl DurationWatchdog {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit: RwLock::new(limit),
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Applies to calls armed from now on
    pub async fn set_limit(&self, limit: Duration) {
        *self.limit.write().await = limit;
    }

    pub(crate) async fn arm(&self, call_id: Uuid, core: Arc<RegistryCore>) {
        let limit = *self.limit.read().await;
        let timers = self.timers.clone();

        // Hold the map lock across spawn so the timer cannot remove its
        // entry before it was inserted.
        let mut guard = self.timers.lock().await;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(limit).await;

            match core
                .retire(call_id, CallStatus::Completed, Some(TIMEOUT_OUTCOME.to_string()))
                .await
            {
                Ok(session) => info!(
                    "⏱️ Call {} reached max duration after {}s",
                    call_id,
                    session.duration.unwrap_or(0)
                ),
                Err(AgentError::CallNotFound(_)) => {
                    debug!("Call {} already retired before timeout", call_id)
                }
                Err(e) => warn!("Failed to time out call {}: {}", call_id, e),
            }

            timers.lock().await.remove(&call_id);
        });

        guard.insert(call_id, handle);
    }

    pub async fn disarm(&self, call_id: Uuid) {
        if let Some(handle) = self.timers.lock().await.remove(&call_id) {
            handle.abort();
            debug!("Duration timer for call {} stopped", call_id);
        }
    }
}

impl Drop for DurationWatchdog {
    fn drop(&mut self) {
        if let Ok(timers) = self.timers.try_lock() {
            for handle in timers.values() {
                handle.abort();
            }
        }
    }
}
