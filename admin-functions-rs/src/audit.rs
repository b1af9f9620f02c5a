// admin-functions-rs/src/audit.rs
//
// Security audit logging for privileged operations
// Provides:
// - Structured audit events per callable outcome
// - Emission through tracing (target "audit")
// - A bounded in-memory trail for inspection

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 1024;

/// Security event types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    AdminRoleGranted,
    AdminRoleRevoked,
    BootstrapAdminGranted,
    UsersListed,
    UserLookedUp,
    UserDisabled,
    UserEnabled,
    AccessDenied,
    TokenRejected,
    OperationFailed,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventType::AdminRoleGranted => "admin_role_granted",
            EventType::AdminRoleRevoked => "admin_role_revoked",
            EventType::BootstrapAdminGranted => "bootstrap_admin_granted",
            EventType::UsersListed => "users_listed",
            EventType::UserLookedUp => "user_looked_up",
            EventType::UserDisabled => "user_disabled",
            EventType::UserEnabled => "user_enabled",
            EventType::AccessDenied => "access_denied",
            EventType::TokenRejected => "token_rejected",
            EventType::OperationFailed => "operation_failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Denied,
    Failure,
}

/// One recorded security event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub operation: String,
    /// Caller uid, or "anonymous" when the call carried no identity
    pub actor: String,
    pub target: Option<String>,
    pub outcome: Outcome,
    pub message: String,
}

/// Bounded audit trail; oldest events are dropped first.
pub struct AuditLog {
    events: Mutex<VecDeque<AuditEvent>>,
    capacity: usize,
}

impl AuditLog {
    pub fn new(capacity: Option<usize>) -> Self {
        let capacity = capacity.unwrap_or(DEFAULT_CAPACITY).max(1);
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity,
        }
    }

    /// Record an event and emit it as a structured log line.
    pub async fn record(
        &self,
        event_type: EventType,
        operation: &str,
        actor: &str,
        target: Option<&str>,
        outcome: Outcome,
        message: impl Into<String>,
    ) -> Uuid {
        let event = AuditEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event_type,
            operation: operation.to_string(),
            actor: actor.to_string(),
            target: target.map(str::to_string),
            outcome,
            message: message.into(),
        };

        match outcome {
            Outcome::Success => info!(
                target: "audit",
                event = %event.event_type,
                operation = %event.operation,
                actor = %event.actor,
                subject = ?event.target,
                "{}",
                event.message
            ),
            Outcome::Denied | Outcome::Failure => warn!(
                target: "audit",
                event = %event.event_type,
                operation = %event.operation,
                actor = %event.actor,
                subject = ?event.target,
                outcome = ?event.outcome,
                "{}",
                event.message
            ),
        }

        let id = event.id;
        let mut events = self.events.lock().await;
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
        id
    }

    /// Most recent events, newest last.
    pub async fn recent(&self, limit: usize) -> Vec<AuditEvent> {
        let events = self.events.lock().await;
        let skip = events.len().saturating_sub(limit);
        events.iter().skip(skip).cloned().collect()
    }

    pub async fn events_of(&self, event_type: EventType) -> Vec<AuditEvent> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(None)
    }
}
