//! Scan-session core for the dashboard's receipt QR flow.
//!
//! A [`ScanSessionController`] owns at most one running camera decoder,
//! turns the page's activation toggle into activate/deactivate calls, keeps
//! the first decoded payload of each cycle and releases the camera on every
//! exit path. [`spawn_driver`] runs a controller on its own task.

pub mod backend;

pub use backend::camera::{
    CameraArbiter, CameraDecoder, DecodeSink, DecoderHandle, FrameScript, ScriptedCamera,
    VideoSurface,
};
pub use backend::config::ScanConfig;
pub use backend::domain::models::{
    is_valid_payload, AcquisitionError, DecodeError, DomainScanResult, ScanError, ScanPhase,
    SessionId,
};
pub use backend::domain::{
    spawn_driver, ActivationOutcome, ResultCardService, ScanDriverHandle, ScanSessionController,
};
pub use backend::initialize_scanner;
pub use backend::io::{ChannelPresenter, LoggingPresenter, PresenterEvent, ResultPresenter};
