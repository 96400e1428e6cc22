//! Security event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::event_type::SecurityEventType;

/// An immutable security audit record.
///
/// Rows are append-only; the application never updates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SecurityEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// What happened.
    pub event_type: SecurityEventType,
    /// The user involved, when known. Absent for events against
    /// unregistered emails.
    pub user_id: Option<Uuid>,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client User-Agent header.
    pub user_agent: Option<String>,
    /// Structured event details (JSON).
    pub metadata: Option<serde_json::Value>,
    /// When the event occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a new security event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecurityEvent {
    /// What happened.
    pub event_type: SecurityEventType,
    /// The user involved, when known.
    pub user_id: Option<Uuid>,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client User-Agent header.
    pub user_agent: Option<String>,
    /// Structured event details.
    pub metadata: Option<serde_json::Value>,
}
