//! # Result Presenter
//!
//! The view side of the scan flow. The controller pushes results, camera
//! errors and view-state snapshots here; how they are drawn is up to the
//! implementation.

use shared::{ScanResult, ScanViewState};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::backend::domain::models::AcquisitionError;

/// Receives everything the scan page displays
pub trait ResultPresenter: Send + Sync {
    /// Called exactly once per successful scan
    fn on_scan_result(&self, result: &ScanResult);

    /// Camera could not be opened; the user can retry by toggling
    fn on_acquisition_error(&self, error: &AcquisitionError);

    /// Called whenever anything visible changes
    fn on_view_state(&self, _state: &ScanViewState) {}
}

/// Presenter that only writes to the log
#[derive(Debug, Clone, Default)]
pub struct LoggingPresenter;

impl ResultPresenter for LoggingPresenter {
    fn on_scan_result(&self, result: &ScanResult) {
        info!(
            "🧾 Scan result: '{}' (valid: {})",
            result.payload, result.is_valid
        );
    }

    fn on_acquisition_error(&self, error: &AcquisitionError) {
        warn!("📷 Camera unavailable: {}", error);
    }

    fn on_view_state(&self, state: &ScanViewState) {
        debug!(
            "View state: status={} scanner_visible={} camera_available={}",
            state.status, state.scanner_visible, state.camera_available
        );
    }
}

/// Everything a [`ChannelPresenter`] forwards
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    ScanResult(ScanResult),
    AcquisitionFailed {
        error: AcquisitionError,
        message: String,
    },
    ViewState(ScanViewState),
}

/// Presenter that forwards to a channel, for a UI loop on another task
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    events: UnboundedSender<PresenterEvent>,
}

impl ChannelPresenter {
    pub fn new() -> (Self, UnboundedReceiver<PresenterEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events }, rx)
    }

    fn forward(&self, event: PresenterEvent) {
        if self.events.send(event).is_err() {
            debug!("Presenter channel closed, dropping event");
        }
    }
}

impl ResultPresenter for ChannelPresenter {
    fn on_scan_result(&self, result: &ScanResult) {
        self.forward(PresenterEvent::ScanResult(result.clone()));
    }

    fn on_acquisition_error(&self, error: &AcquisitionError) {
        self.forward(PresenterEvent::AcquisitionFailed {
            error: error.clone(),
            message: error.user_message(),
        });
    }

    fn on_view_state(&self, state: &ScanViewState) {
        self.forward(PresenterEvent::ViewState(state.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_presenter_forwards_in_order() {
        let (presenter, mut rx) = ChannelPresenter::new();
        let result = ScanResult {
            session_id: "scan::1".to_string(),
            payload: "RECEIPT-1".to_string(),
            is_valid: true,
            scanned_at: "2024-11-09T14:30:00+00:00".to_string(),
        };

        presenter.on_view_state(&ScanViewState::default());
        presenter.on_scan_result(&result);
        presenter.on_acquisition_error(&AcquisitionError::PermissionDenied);

        assert_eq!(rx.try_recv().unwrap(), PresenterEvent::ViewState(ScanViewState::default()));
        assert_eq!(rx.try_recv().unwrap(), PresenterEvent::ScanResult(result));
        match rx.try_recv().unwrap() {
            PresenterEvent::AcquisitionFailed { error, message } => {
                assert_eq!(error, AcquisitionError::PermissionDenied);
                assert!(message.contains("denied"));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_logging_presenter_drives_a_full_cycle() {
        use crate::backend::camera::VideoSurface;
        use crate::backend::domain::ScanSessionController;
        use crate::backend::test_utils::ManualCamera;
        use std::sync::Arc;

        let camera = ManualCamera::new();
        let mut controller = ScanSessionController::new(
            camera.clone(),
            VideoSurface::new("qr-video"),
            Arc::new(LoggingPresenter),
        );

        controller.set_active(true).await.unwrap();
        let result = controller.on_decode_success("RECEIPT-2024-11-09").unwrap();
        assert!(result.is_valid);
        assert_eq!(camera.live_handles(), 0);

        let mut failing = ScanSessionController::new(
            ManualCamera::failing(AcquisitionError::NoDevice),
            VideoSurface::new("qr-video"),
            Arc::new(LoggingPresenter::default()),
        );
        assert!(failing.activate().await.is_err());
        assert!(!failing.view_state().camera_available);
    }

    #[test]
    fn test_channel_presenter_survives_closed_receiver() {
        let (presenter, rx) = ChannelPresenter::new();
        drop(rx);
        presenter.on_acquisition_error(&AcquisitionError::NoDevice);
    }
}
