//! Shared fixtures for unit tests: a camera whose frames are pushed by hand,
//! a presenter that records what it was shown, and a handle that counts
//! `stop` calls.

use async_trait::async_trait;
use shared::{ScanOptions, ScanResult, ScanViewState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::backend::camera::{CameraDecoder, DecodeSink, DecoderHandle, VideoSurface};
use crate::backend::domain::models::AcquisitionError;
use crate::backend::io::presenter::ResultPresenter;

/// Handle that only counts how often it was stopped
#[derive(Debug, Clone, Default)]
pub struct CountingHandle {
    stops: Arc<AtomicUsize>,
}

impl CountingHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl DecoderHandle for CountingHandle {
    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Handle returned by [`ManualCamera`]
#[derive(Debug)]
pub struct ManualHandle {
    live: Arc<AtomicUsize>,
    stopped: bool,
}

impl DecoderHandle for ManualHandle {
    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Camera that never produces frames on its own. Tests grab the sink it
/// was given and push decode events through it.
#[derive(Debug, Clone, Default)]
pub struct ManualCamera {
    failure: Option<AcquisitionError>,
    live: Arc<AtomicUsize>,
    acquisitions: Arc<AtomicUsize>,
    sinks: Arc<Mutex<Vec<DecodeSink>>>,
    facing_modes: Arc<Mutex<Vec<String>>>,
}

impl ManualCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: AcquisitionError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn last_sink(&self) -> Option<DecodeSink> {
        self.sinks.lock().unwrap().last().cloned()
    }

    pub fn last_facing_mode(&self) -> Option<String> {
        self.facing_modes.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CameraDecoder for ManualCamera {
    type Handle = ManualHandle;

    async fn acquire(
        &self,
        _surface: &VideoSurface,
        options: &ScanOptions,
        sink: DecodeSink,
    ) -> Result<ManualHandle, AcquisitionError> {
        self.facing_modes
            .lock()
            .unwrap()
            .push(options.preferred_camera.facing_mode().to_string());

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        self.sinks.lock().unwrap().push(sink);
        self.live.fetch_add(1, Ordering::SeqCst);
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(ManualHandle {
            live: self.live.clone(),
            stopped: false,
        })
    }
}

/// Presenter that keeps everything it receives
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    results: Mutex<Vec<ScanResult>>,
    acquisition_errors: Mutex<Vec<AcquisitionError>>,
    view_states: Mutex<Vec<ScanViewState>>,
}

impl RecordingPresenter {
    pub fn results(&self) -> Vec<ScanResult> {
        self.results.lock().unwrap().clone()
    }

    pub fn acquisition_errors(&self) -> Vec<AcquisitionError> {
        self.acquisition_errors.lock().unwrap().clone()
    }

    pub fn view_states(&self) -> Vec<ScanViewState> {
        self.view_states.lock().unwrap().clone()
    }
}

impl ResultPresenter for RecordingPresenter {
    fn on_scan_result(&self, result: &ScanResult) {
        self.results.lock().unwrap().push(result.clone());
    }

    fn on_acquisition_error(&self, error: &AcquisitionError) {
        self.acquisition_errors.lock().unwrap().push(error.clone());
    }

    fn on_view_state(&self, state: &ScanViewState) {
        self.view_states.lock().unwrap().push(state.clone());
    }
}
