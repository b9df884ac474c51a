use serde::{Deserialize, Serialize};

use super::scan_state::InvalidTransition;

/// Camera could not be opened for a scan. Recoverable: the user retries by
/// toggling the scanner again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AcquisitionError {
    #[error("Camera permission was denied")]
    PermissionDenied,
    #[error("No camera device is available")]
    NoDevice,
    #[error("Camera is already in use by another scan")]
    CameraBusy,
    #[error("Camera stream failed to start: {0}")]
    Stream(String),
}

impl AcquisitionError {
    /// Message shown on the scan page
    pub fn user_message(&self) -> String {
        match self {
            AcquisitionError::PermissionDenied => {
                "Camera access was denied. Allow camera access and tap Scan QR again.".to_string()
            }
            AcquisitionError::NoDevice => "No camera was found on this device.".to_string(),
            AcquisitionError::CameraBusy => {
                "The camera is busy with another scan. Try again in a moment.".to_string()
            }
            AcquisitionError::Stream(_) => {
                "The camera could not be started. Tap Scan QR to try again.".to_string()
            }
        }
    }
}

/// Per-frame failure reported while scanning. Expected and never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DecodeError {
    #[error("No QR code found")]
    NotFound,
    #[error("Ambiguous read: {0}")]
    Ambiguous(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("Camera acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}
