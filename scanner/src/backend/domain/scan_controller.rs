//! # Scan Session Controller
//!
//! Mediates between the page's "scan" toggle and the camera decoder. It makes
//! sure exactly one decoder exists while scanning and that the decoder is
//! released on every way out: a successful read, the user cancelling, or
//! the page going away.
//!
//! Decoders report through a session-tagged channel. Reports from a cycle
//! that has already been released are dropped, so a decoder that keeps
//! reading frames for a moment after `stop` cannot produce a second result.

use shared::{ScanOptions, ScanResult, ScanViewState};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use super::models::{
    AcquisitionError, DecodeError, DomainScanResult, ScanError, ScanPhase, SessionId,
};
use super::scan_session::{ActiveDecoder, ScanSession};
use crate::backend::camera::{
    CameraArbiter, CameraDecoder, DecodeEvent, DecodeOutcome, DecodeSink, VideoSurface,
};
use crate::backend::io::mappers::ScanResultMapper;
use crate::backend::io::presenter::ResultPresenter;

/// What `activate` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// A new cycle started and the camera is running
    Started(SessionId),
    /// A cycle was already in progress; nothing changed
    AlreadyActive,
}

pub struct ScanSessionController<C: CameraDecoder> {
    camera: C,
    arbiter: CameraArbiter,
    presenter: Arc<dyn ResultPresenter>,
    options: ScanOptions,
    surface: VideoSurface,
    session: ScanSession<C::Handle>,
    scan_requested: bool,
    camera_available: bool,
    events_tx: UnboundedSender<DecodeEvent>,
    events_rx: UnboundedReceiver<DecodeEvent>,
    view_tx: watch::Sender<ScanViewState>,
}

impl<C: CameraDecoder> ScanSessionController<C> {
    pub fn new(camera: C, surface: VideoSurface, presenter: Arc<dyn ResultPresenter>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (view_tx, _) = watch::channel(ScanViewState::default());
        Self {
            camera,
            arbiter: CameraArbiter::new(),
            presenter,
            options: ScanOptions::default(),
            surface,
            session: ScanSession::new(),
            scan_requested: false,
            camera_available: true,
            events_tx,
            events_rx,
            view_tx,
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Share a camera lease with other controllers
    pub fn with_arbiter(mut self, arbiter: CameraArbiter) -> Self {
        self.arbiter = arbiter;
        self
    }

    pub fn phase(&self) -> ScanPhase {
        self.session.phase()
    }

    pub fn session(&self) -> &ScanSession<C::Handle> {
        &self.session
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn is_scan_requested(&self) -> bool {
        self.scan_requested
    }

    pub fn last_result(&self) -> Option<ScanResult> {
        self.session.last_result().map(ScanResultMapper::to_dto)
    }

    /// Watch view-state snapshots as they are published
    pub fn subscribe(&self) -> watch::Receiver<ScanViewState> {
        self.view_tx.subscribe()
    }

    /// Snapshot of what the page shows. The scanner stays visible while a
    /// cycle holds the camera, even if it was started without the flag.
    pub fn view_state(&self) -> ScanViewState {
        let phase = self.session.phase();
        let scanner_visible = self.scan_requested || !phase.is_idle();
        ScanViewState {
            status: ScanResultMapper::status_to_dto(phase),
            scan_requested: self.scan_requested,
            scanner_visible,
            placeholder_visible: !scanner_visible,
            camera_available: self.camera_available,
            result: self.last_result(),
            error_message: self
                .session
                .last_acquisition_error()
                .map(AcquisitionError::user_message),
        }
    }

    fn publish_view_state(&self) {
        let state = self.view_state();
        self.presenter.on_view_state(&state);
        self.view_tx.send_replace(state);
    }

    /// Apply the page's activation flag. A rising edge activates, a falling
    /// edge deactivates, repeats are ignored.
    pub async fn set_active(&mut self, requested: bool) -> Result<(), ScanError> {
        if requested == self.scan_requested {
            trace!("Activation flag already {}, ignoring", requested);
            return Ok(());
        }
        self.scan_requested = requested;

        if requested {
            self.activate().await.map(|_| ())
        } else {
            if !self.deactivate() {
                self.publish_view_state();
            }
            Ok(())
        }
    }

    /// Open the camera and start decoding. No-op if a cycle is already
    /// running. Camera failures bring the session back to `Idle` and are
    /// reported to the presenter as well as returned.
    pub async fn activate(&mut self) -> Result<ActivationOutcome, ScanError> {
        if !self.session.phase().is_idle() {
            debug!("Ignoring activate while {:?}", self.session.phase());
            return Ok(ActivationOutcome::AlreadyActive);
        }

        let session_id = SessionId::generate();
        self.session.begin(session_id)?;
        info!("📷 Activating scan session {}", session_id);
        self.publish_view_state();

        let lease = match self.arbiter.try_lease() {
            Ok(lease) => lease,
            Err(error) => return Err(self.acquisition_failed(error)),
        };

        let sink = DecodeSink::new(session_id, self.events_tx.clone());
        match self.camera.acquire(&self.surface, &self.options, sink).await {
            Ok(handle) => {
                self.session
                    .attach(ActiveDecoder::new(session_id, handle, lease))?;
                self.camera_available = true;
                info!(
                    "🔍 Scanning on surface '{}' with {} camera",
                    self.surface.id(),
                    self.options.preferred_camera.facing_mode()
                );
                self.publish_view_state();
                Ok(ActivationOutcome::Started(session_id))
            }
            Err(error) => {
                drop(lease);
                Err(self.acquisition_failed(error))
            }
        }
    }

    fn acquisition_failed(&mut self, error: AcquisitionError) -> ScanError {
        warn!("⚠️ Camera acquisition failed: {}", error);
        if let Err(e) = self.session.fail_activation(error.clone()) {
            return e.into();
        }
        self.camera_available = false;
        self.presenter.on_acquisition_error(&error);
        self.publish_view_state();
        ScanError::Acquisition(error)
    }

    /// Stop and release the decoder if one is held. Safe to call at any
    /// time; returns false when the session was already idle.
    pub fn deactivate(&mut self) -> bool {
        let phase = self.session.phase();
        if phase.is_idle() {
            trace!("Deactivate on idle session, nothing to do");
            return false;
        }

        let released = self.session.release();
        info!(
            "⏹️ Scan session deactivated from {:?} (decoder released: {})",
            phase, released
        );
        self.publish_view_state();
        true
    }

    /// Record a successful read and stop the camera immediately.
    /// Ignored unless the session is scanning.
    pub fn on_decode_success(&mut self, payload: &str) -> Option<DomainScanResult> {
        let session_id = match (self.session.phase(), self.session.live_session_id()) {
            (ScanPhase::Scanning, Some(id)) => id,
            (phase, _) => {
                debug!("Ignoring decode result while {:?}", phase);
                return None;
            }
        };

        let result = DomainScanResult::new(session_id, payload);
        if let Err(e) = self.session.record_result(result.clone()) {
            warn!("Could not record scan result: {}", e);
            return None;
        }
        self.deactivate();

        info!(
            "✅ Scan session {} decoded a payload (valid: {})",
            session_id, result.is_valid
        );
        self.presenter.on_scan_result(&ScanResultMapper::to_dto(&result));
        Some(result)
    }

    /// Note a frame that could not be decoded. The session keeps scanning.
    pub fn on_decode_failure(&mut self, error: DecodeError) -> bool {
        if self.session.phase() != ScanPhase::Scanning {
            trace!("Ignoring decode failure while {:?}", self.session.phase());
            return false;
        }

        match self.session.record_failure(error) {
            Ok(()) => {
                trace!(
                    "Frame without a readable code ({} this cycle)",
                    self.session.decode_failures()
                );
                true
            }
            Err(e) => {
                warn!("Could not record decode failure: {}", e);
                false
            }
        }
    }

    /// Route a decoder report. Reports from released cycles are dropped.
    pub fn handle_event(&mut self, event: DecodeEvent) -> bool {
        if self.session.live_session_id() != Some(event.session_id) {
            trace!("Discarding decode event from stale session {}", event.session_id);
            return false;
        }

        match event.outcome {
            DecodeOutcome::Decoded(payload) => self.on_decode_success(&payload).is_some(),
            DecodeOutcome::Failed(error) => self.on_decode_failure(error),
        }
    }

    /// Wait for the next decoder report. Never yields `None` while the
    /// controller is alive, since it keeps a sender of its own.
    pub async fn next_event(&mut self) -> Option<DecodeEvent> {
        self.events_rx.recv().await
    }

    /// Handle every report that is already queued; returns how many applied
    pub fn process_pending_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.handle_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// The page is going away: clear the flag and release the camera
    pub fn teardown(&mut self) {
        info!("🧹 Tearing down scan session controller");
        self.scan_requested = false;
        if !self.deactivate() {
            self.publish_view_state();
        }
    }
}
