// src/services/call_registry.rs
//! Call session registry
//!
//! Owns every call session for the lifetime of the process. A session is
//! either active (keyed by id) or retired into the history log, never both.
//! One lock guards both collections so readers never see a call half-way
//! through retirement.

use crate::error::AgentError;
use crate::gateway::{CallGateway, CallRequest};
use crate::models::{
    AnalyticsSnapshot, CallSession, CallStatus, CallStatusView, ConversationTurn, TurnRole,
    DEFAULT_PURPOSE,
};
use crate::services::clock::{Clock, SystemClock};
use crate::services::duration_watchdog::DurationWatchdog;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Default)]
struct RegistryState {
    active: HashMap<Uuid, CallSession>,
    history: Vec<CallSession>,
    history_ids: HashSet<Uuid>,
    /// Ids handed to the gateway whose submission has not resolved yet
    reserved: HashSet<Uuid>,
}

impl RegistryState {
    fn is_known(&self, call_id: &Uuid) -> bool {
        self.active.contains_key(call_id)
            || self.history_ids.contains(call_id)
            || self.reserved.contains(call_id)
    }

    fn reserve_id(&mut self) -> Uuid {
        loop {
            let call_id = Uuid::new_v4();
            if !self.is_known(&call_id) {
                self.reserved.insert(call_id);
                return call_id;
            }
        }
    }
}

/// Shared half of the registry, also held by the duration watchdog's timers
pub(crate) struct RegistryCore {
    state: RwLock<RegistryState>,
    clock: Arc<dyn Clock>,
}

impl RegistryCore {
    /// Moves an active session into history with a terminal status
    pub(crate) async fn retire(
        &self,
        call_id: Uuid,
        status: CallStatus,
        outcome: Option<String>,
    ) -> Result<CallSession, AgentError> {
        let mut state = self.state.write().await;

        let current = state
            .active
            .get(&call_id)
            .map(|s| s.status)
            .ok_or_else(|| AgentError::CallNotFound(call_id.to_string()))?;

        if !current.can_transition_to(status) {
            return Err(AgentError::InvalidTransition {
                call_id: call_id.to_string(),
                from: current,
                to: status,
            });
        }

        let mut session = state
            .active
            .remove(&call_id)
            .ok_or_else(|| AgentError::CallNotFound(call_id.to_string()))?;

        session.terminate(status, self.clock.now(), outcome);

        state.history_ids.insert(call_id);
        state.history.push(session.clone());

        Ok(session)
    }
}

pub struct CallSessionRegistry {
    core: Arc<RegistryCore>,
    gateway: Arc<dyn CallGateway>,
    watchdog: Option<DurationWatchdog>,
}

impl CallSessionRegistry {
    pub fn new(gateway: Arc<dyn CallGateway>) -> Self {
        Self::with_clock(gateway, Arc::new(SystemClock))
    }

    pub fn with_clock(gateway: Arc<dyn CallGateway>, clock: Arc<dyn Clock>) -> Self {
        Self {
            core: Arc::new(RegistryCore {
                state: RwLock::new(RegistryState::default()),
                clock,
            }),
            gateway,
            watchdog: None,
        }
    }

    /// Ends calls with outcome "timeout" once they run longer than `limit`
    pub fn with_duration_limit(mut self, limit: Duration) -> Self {
        self.watchdog = Some(DurationWatchdog::new(limit));
        self
    }

    /// No-op unless the registry was built with a duration limit
    pub async fn set_duration_limit(&self, limit: Duration) {
        if let Some(watchdog) = &self.watchdog {
            watchdog.set_limit(limit).await;
        }
    }

    /// Submits a call to the gateway and tracks it on success.
    ///
    /// The id is reserved before submission and the session becomes visible
    /// only after the gateway accepted it; a rejected call leaves no trace.
    pub async fn initiate(
        &self,
        phone_number: &str,
        script: &str,
        purpose: &str,
    ) -> Result<Uuid, AgentError> {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return Err(AgentError::InvalidRequest("phone number is required".to_string()));
        }
        if script.trim().is_empty() {
            return Err(AgentError::InvalidRequest("conversation script is required".to_string()));
        }

        let purpose = match purpose.trim() {
            "" => DEFAULT_PURPOSE,
            p => p,
        };

        let call_id = self.core.state.write().await.reserve_id();

        let request = CallRequest {
            call_id,
            phone_number: phone_number.to_string(),
            script: script.to_string(),
            purpose: purpose.to_string(),
        };

        let submitted = self.gateway.submit_call(&request).await;

        {
            let mut state = self.core.state.write().await;
            state.reserved.remove(&call_id);

            if let Err(e) = submitted {
                warn!("❌ Call to {} rejected by gateway: {}", phone_number, e);
                return Err(AgentError::InitiationFailed(e.to_string()));
            }

            let session = CallSession::new(
                call_id,
                request.phone_number,
                request.purpose,
                self.core.clock.now(),
            );
            state.active.insert(call_id, session);

            // Armed under the registry lock so an `end` cannot disarm first
            if let Some(watchdog) = &self.watchdog {
                watchdog.arm(call_id, self.core.clone()).await;
            }
        }

        info!("📞 Call {} initiated to {} ({})", call_id, phone_number, purpose);
        Ok(call_id)
    }

    pub async fn status(&self, call_id: Uuid) -> Result<CallStatusView, AgentError> {
        let state = self.core.state.read().await;

        state
            .active
            .get(&call_id)
            .map(|session| CallStatusView::from_session(session, self.core.clock.now()))
            .ok_or_else(|| AgentError::CallNotFound(call_id.to_string()))
    }

    /// Provider confirmed the call connected
    pub async fn activate(&self, call_id: Uuid) -> Result<(), AgentError> {
        let mut state = self.core.state.write().await;

        let session = state
            .active
            .get_mut(&call_id)
            .ok_or_else(|| AgentError::CallNotFound(call_id.to_string()))?;

        if !session.status.can_transition_to(CallStatus::Active) {
            return Err(AgentError::InvalidTransition {
                call_id: call_id.to_string(),
                from: session.status,
                to: CallStatus::Active,
            });
        }

        session.status = CallStatus::Active;
        info!("🟢 Call {} active", call_id);
        Ok(())
    }

    /// Completes an active call and moves it to history. A second `end` on
    /// the same id is `CallNotFound`.
    pub async fn end(&self, call_id: Uuid, outcome: Option<String>) -> Result<(), AgentError> {
        let outcome = outcome
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty());

        let session = self.core.retire(call_id, CallStatus::Completed, outcome).await?;
        self.disarm(call_id).await;

        info!(
            "🔚 Call {} ended after {}s",
            call_id,
            session.duration.unwrap_or(0)
        );
        Ok(())
    }

    /// Terminates an active call as failed, e.g. on a provider error event
    pub async fn fail(&self, call_id: Uuid, reason: &str) -> Result<(), AgentError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AgentError::InvalidRequest("failure reason is required".to_string()));
        }

        self.core
            .retire(call_id, CallStatus::Failed, Some(reason.to_string()))
            .await?;
        self.disarm(call_id).await;

        warn!("Call {} failed: {}", call_id, reason);
        Ok(())
    }

    pub async fn append_turn(&self, call_id: Uuid, role: TurnRole, text: &str) -> Result<(), AgentError> {
        if text.trim().is_empty() {
            return Err(AgentError::InvalidRequest("turn text is empty".to_string()));
        }

        let mut state = self.core.state.write().await;
        let now = self.core.clock.now();

        let session = state
            .active
            .get_mut(&call_id)
            .ok_or_else(|| AgentError::CallNotFound(call_id.to_string()))?;

        session.conversation_log.push(ConversationTurn {
            role,
            text: text.to_string(),
            timestamp: now,
        });

        debug!("Call {} transcript now has {} turns", call_id, session.conversation_log.len());
        Ok(())
    }

    /// Full session, active or retired
    pub async fn session(&self, call_id: Uuid) -> Result<CallSession, AgentError> {
        let state = self.core.state.read().await;

        state
            .active
            .get(&call_id)
            .or_else(|| state.history.iter().find(|s| s.call_id == call_id))
            .cloned()
            .ok_or_else(|| AgentError::CallNotFound(call_id.to_string()))
    }

    /// Active calls, oldest first
    pub async fn list_active(&self) -> Vec<CallStatusView> {
        let state = self.core.state.read().await;
        let now = self.core.clock.now();

        let mut calls: Vec<CallStatusView> = state
            .active
            .values()
            .map(|s| CallStatusView::from_session(s, now))
            .collect();
        calls.sort_by_key(|c| c.start_time);
        calls
    }

    /// Retired sessions in termination order
    pub async fn history(&self) -> Vec<CallSession> {
        self.core.state.read().await.history.clone()
    }

    pub async fn analytics(&self) -> AnalyticsSnapshot {
        let state = self.core.state.read().await;
        AnalyticsSnapshot::compute(state.active.len(), &state.history)
    }

    async fn disarm(&self, call_id: Uuid) {
        if let Some(watchdog) = &self.watchdog {
            watchdog.disarm(call_id).await;
        }
    }
}
