//! # Scripted Camera
//!
//! An in-process [`CameraDecoder`] that replays a fixed list of frames
//! instead of reading a real device. Used by the `scan-sim` binary and by
//! tests.
//!
//! ## YAML Format
//!
//! ```yaml
//! frames:
//!   - ~                          # frame without a code
//!   - ~
//!   - "INVOICE-4471:EUR-12.50"   # frame with a readable code
//! ```
//!
//! Frames are played one per tick at the rate given by
//! `ScanOptions::max_scans_per_second` unless an explicit interval is set.
//! Once the script runs out the stream stays open and silent until stopped.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::ScanOptions;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use super::traits::{CameraDecoder, DecodeSink, DecoderHandle, VideoSurface};
use crate::backend::domain::models::{AcquisitionError, DecodeError};

/// Frames replayed by a [`ScriptedCamera`]. `None` is a frame without a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FrameScript {
    #[serde(default)]
    pub frames: Vec<Option<String>>,
}

impl FrameScript {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let script: FrameScript =
            serde_yaml::from_str(yaml).context("Failed to parse frame script")?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read frame script {:?}", path))?;
        let script = Self::from_yaml_str(&yaml)?;
        debug!("Loaded {} frames from {:?}", script.frames.len(), path);
        Ok(script)
    }
}

/// Camera that plays back a [`FrameScript`]
#[derive(Debug, Clone)]
pub struct ScriptedCamera {
    script: Arc<FrameScript>,
    acquisition_error: Option<AcquisitionError>,
    acquire_delay: Duration,
    frame_interval: Option<Duration>,
    live_handles: Arc<AtomicUsize>,
    acquisitions: Arc<AtomicUsize>,
}

impl ScriptedCamera {
    pub fn new(frames: Vec<Option<String>>) -> Self {
        Self::from_script(FrameScript { frames })
    }

    pub fn from_script(script: FrameScript) -> Self {
        Self {
            script: Arc::new(script),
            acquisition_error: None,
            acquire_delay: Duration::ZERO,
            frame_interval: None,
            live_handles: Arc::new(AtomicUsize::new(0)),
            acquisitions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every acquisition fail with `error`
    pub fn with_acquisition_error(mut self, error: AcquisitionError) -> Self {
        self.acquisition_error = Some(error);
        self
    }

    /// Simulate a permission prompt or slow device start
    pub fn with_acquire_delay(mut self, delay: Duration) -> Self {
        self.acquire_delay = delay;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }

    /// Handles that have been acquired and not yet stopped
    pub fn live_handles(&self) -> usize {
        self.live_handles.load(Ordering::SeqCst)
    }

    /// Successful acquisitions so far
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    fn interval_for(&self, options: &ScanOptions) -> Duration {
        self.frame_interval.unwrap_or_else(|| {
            let per_second = options.max_scans_per_second.max(1) as u64;
            Duration::from_millis((1000 / per_second).max(1))
        })
    }
}

/// Stream started by a [`ScriptedCamera`]
#[derive(Debug)]
pub struct ScriptedHandle {
    stop: Option<oneshot::Sender<()>>,
    live_handles: Arc<AtomicUsize>,
}

impl DecoderHandle for ScriptedHandle {
    fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
            self.live_handles.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for ScriptedHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

enum Tick {
    Stop,
    Frame,
}

#[async_trait]
impl CameraDecoder for ScriptedCamera {
    type Handle = ScriptedHandle;

    async fn acquire(
        &self,
        surface: &VideoSurface,
        options: &ScanOptions,
        sink: DecodeSink,
    ) -> Result<ScriptedHandle, AcquisitionError> {
        debug!(
            "Opening scripted camera on surface '{}' (facing {})",
            surface.id(),
            options.preferred_camera.facing_mode()
        );

        if !self.acquire_delay.is_zero() {
            tokio::time::sleep(self.acquire_delay).await;
        }

        if let Some(error) = &self.acquisition_error {
            return Err(error.clone());
        }

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let frames = self.script.frames.clone();
        let interval = self.interval_for(options);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut frames = frames.into_iter();

            loop {
                let tick = tokio::select! {
                    _ = &mut stop_rx => Tick::Stop,
                    _ = ticker.tick() => Tick::Frame,
                };

                if let Tick::Stop = tick {
                    break;
                }

                let delivered = match frames.next() {
                    Some(Some(payload)) => sink.decoded(payload),
                    Some(None) => sink.failed(DecodeError::NotFound),
                    None => {
                        trace!("Frame script exhausted, waiting for stop");
                        let _ = (&mut stop_rx).await;
                        break;
                    }
                };

                if !delivered {
                    break;
                }
            }

            trace!("Scripted frame loop for {} finished", sink.session_id());
        });

        self.live_handles.fetch_add(1, Ordering::SeqCst);
        self.acquisitions.fetch_add(1, Ordering::SeqCst);

        Ok(ScriptedHandle {
            stop: Some(stop_tx),
            live_handles: self.live_handles.clone(),
        })
    }
}
