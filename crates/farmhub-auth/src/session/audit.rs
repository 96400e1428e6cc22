//! Security audit recording.

use std::sync::Arc;

use uuid::Uuid;

use farmhub_core::error::AppError;
use farmhub_database::repositories::security_event::SecurityEventRepository;
use farmhub_entity::audit::{CreateSecurityEvent, SecurityEventType};

/// Request-level client metadata attached to audit records.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// Client IP address, as reported by the platform.
    pub ip_address: Option<String>,
    /// Client User-Agent header.
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Creates client info from optional IP and User-Agent values.
    pub fn new(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
        }
    }
}

/// Appends security-relevant events to the audit log.
///
/// Writes are awaited by the caller before the response is returned;
/// there is no fire-and-forget for security-critical records.
#[derive(Debug, Clone)]
pub struct SecurityAudit {
    /// Audit persistence.
    repo: Arc<SecurityEventRepository>,
}

impl SecurityAudit {
    /// Creates a new audit recorder.
    pub fn new(repo: Arc<SecurityEventRepository>) -> Self {
        Self { repo }
    }

    /// Appends one event.
    pub async fn record(
        &self,
        event_type: SecurityEventType,
        user_id: Option<Uuid>,
        client: &ClientInfo,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), AppError> {
        self.repo
            .create(&CreateSecurityEvent {
                event_type,
                user_id,
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
                metadata,
            })
            .await?;

        Ok(())
    }
}
