use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a scan session as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// No camera held, nothing running
    #[default]
    Idle,
    /// Waiting on camera permission / stream acquisition
    Activating,
    /// Camera running, frames are being decoded
    Scanning,
    /// A code was read; the session is releasing the camera
    Decoded,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScanStatus::Idle => "idle",
            ScanStatus::Activating => "activating",
            ScanStatus::Scanning => "scanning",
            ScanStatus::Decoded => "decoded",
        };
        write!(f, "{}", label)
    }
}

/// A decoded payload handed to the result view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Activation cycle that produced this result
    pub session_id: String,
    /// Raw decoded text
    pub payload: String,
    /// True when the payload has non-whitespace content
    pub is_valid: bool,
    /// Human-readable timestamp with timezone (RFC 3339)
    pub scanned_at: String,
}

/// Which physical camera the decoder should prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PreferredCamera {
    /// Rear-facing camera, the usual choice for scanning receipts
    #[default]
    Environment,
    /// Front-facing camera
    User,
}

impl PreferredCamera {
    /// Facing-mode label understood by camera backends
    pub fn facing_mode(&self) -> &'static str {
        match self {
            PreferredCamera::Environment => "environment",
            PreferredCamera::User => "user",
        }
    }
}

/// Options passed to the camera decoder when a session is activated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub preferred_camera: PreferredCamera,
    /// Draw the region of the frame that is searched for a code
    pub highlight_scan_region: bool,
    /// Outline a detected code in the preview
    pub highlight_code_outline: bool,
    /// Upper bound on decode attempts per second
    pub max_scans_per_second: u32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            preferred_camera: PreferredCamera::Environment,
            highlight_scan_region: true,
            highlight_code_outline: true,
            max_scans_per_second: 25,
        }
    }
}

/// Everything the scan page needs to render itself.
///
/// Visibility of the scanner container and the placeholder icon is carried
/// here explicitly instead of being toggled on page elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanViewState {
    pub status: ScanStatus,
    /// Current value of the activation flag
    pub scan_requested: bool,
    /// Whether the video container should be shown
    pub scanner_visible: bool,
    /// Whether the large placeholder QR icon should be shown
    pub placeholder_visible: bool,
    /// False after the camera could not be opened
    pub camera_available: bool,
    pub result: Option<ScanResult>,
    /// User-facing message for the last acquisition failure
    pub error_message: Option<String>,
}

impl Default for ScanViewState {
    fn default() -> Self {
        Self {
            status: ScanStatus::Idle,
            scan_requested: false,
            scanner_visible: false,
            placeholder_visible: true,
            camera_available: true,
            result: None,
            error_message: None,
        }
    }
}

/// Validity badge shown next to a scan result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultValidity {
    Valid,
    Invalid,
}

/// Formatted content of the "Scan Result" card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCard {
    pub title: String,
    /// "Valid QR Code", "Invalid QR Code" or the empty-state prompt
    pub headline: String,
    /// None while nothing has been scanned
    pub validity: Option<ResultValidity>,
    /// Decoded content, shown verbatim
    pub content: Option<String>,
}
