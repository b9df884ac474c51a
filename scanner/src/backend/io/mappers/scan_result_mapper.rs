use shared::{ScanResult, ScanStatus};

use crate::backend::domain::models::{DomainScanResult, ScanPhase};

pub struct ScanResultMapper;

impl ScanResultMapper {
    /// Convert domain DomainScanResult to shared ScanResult DTO
    pub fn to_dto(domain: &DomainScanResult) -> ScanResult {
        ScanResult {
            session_id: domain.session_id.to_string(),
            payload: domain.payload.clone(),
            is_valid: domain.is_valid,
            scanned_at: domain.scanned_at.to_rfc3339(),
        }
    }

    /// Convert domain ScanPhase to shared ScanStatus
    pub fn status_to_dto(phase: ScanPhase) -> ScanStatus {
        match phase {
            ScanPhase::Idle => ScanStatus::Idle,
            ScanPhase::Activating => ScanStatus::Activating,
            ScanPhase::Scanning => ScanStatus::Scanning,
            ScanPhase::Decoded => ScanStatus::Decoded,
        }
    }
}
