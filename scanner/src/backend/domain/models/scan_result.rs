use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one activate-to-deactivate cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scan::{}", self.0)
    }
}

/// A payload counts as valid when it has any non-whitespace content
pub fn is_valid_payload(payload: &str) -> bool {
    !payload.trim().is_empty()
}

/// Successful read recorded on a scan session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainScanResult {
    pub session_id: SessionId,
    pub payload: String,
    pub is_valid: bool,
    pub scanned_at: DateTime<Utc>,
}

impl DomainScanResult {
    pub fn new(session_id: SessionId, payload: impl Into<String>) -> Self {
        Self::with_timestamp(session_id, payload, Utc::now())
    }

    pub fn with_timestamp(
        session_id: SessionId,
        payload: impl Into<String>,
        scanned_at: DateTime<Utc>,
    ) -> Self {
        let payload = payload.into();
        let is_valid = is_valid_payload(&payload);
        Self {
            session_id,
            payload,
            is_valid,
            scanned_at,
        }
    }
}
