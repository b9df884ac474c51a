//! Scan lifecycle states and the transitions allowed between them.
//!
//! ```text
//! Idle ──Activate──▶ Activating ──CameraReady──▶ Scanning ──Decoded──▶ Decoded
//!  ▲                    │   │                      │  ▲                 │
//!  │◀──CameraFailed─────┘   │                      │  └─DecodeFailed────┘(self)
//!  │◀──Cancel───────────────┘                      │
//!  │◀──Cancel──────────────────────────────────────┘
//!  └◀──Released────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Where a scan session currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScanPhase {
    #[default]
    Idle,
    Activating,
    Scanning,
    Decoded,
}

/// Inputs that move a session between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanTrigger {
    /// User asked for a scan
    Activate,
    /// Camera stream opened and decoding started
    CameraReady,
    /// Camera could not be opened
    CameraFailed,
    /// A frame did not contain a readable code
    DecodeFailed,
    /// A frame produced a payload
    Decoded,
    /// Decoder handle was stopped after a successful read
    Released,
    /// User cancelled or the view was torn down
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {trigger:?} while {from:?}")]
pub struct InvalidTransition {
    pub from: ScanPhase,
    pub trigger: ScanTrigger,
}

impl ScanPhase {
    /// Compute the phase that follows `trigger`
    pub fn apply(self, trigger: ScanTrigger) -> Result<ScanPhase, InvalidTransition> {
        let next = match (self, trigger) {
            (ScanPhase::Idle, ScanTrigger::Activate) => ScanPhase::Activating,
            (ScanPhase::Activating, ScanTrigger::CameraReady) => ScanPhase::Scanning,
            (ScanPhase::Activating, ScanTrigger::CameraFailed) => ScanPhase::Idle,
            (ScanPhase::Activating, ScanTrigger::Cancel) => ScanPhase::Idle,
            (ScanPhase::Scanning, ScanTrigger::DecodeFailed) => ScanPhase::Scanning,
            (ScanPhase::Scanning, ScanTrigger::Decoded) => ScanPhase::Decoded,
            (ScanPhase::Scanning, ScanTrigger::Cancel) => ScanPhase::Idle,
            (ScanPhase::Decoded, ScanTrigger::Released) => ScanPhase::Idle,
            (from, trigger) => return Err(InvalidTransition { from, trigger }),
        };

        Ok(next)
    }

    /// True while a decoder handle is expected to be live
    pub fn holds_camera(&self) -> bool {
        matches!(self, ScanPhase::Scanning | ScanPhase::Decoded)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ScanPhase::Idle)
    }
}
