//! # Camera Traits
//!
//! Abstraction over whatever opens a video stream and decodes codes from it.
//! The domain layer only sees these traits, so a browser camera, a native
//! capture device or the scripted test camera can be swapped freely.

use async_trait::async_trait;
use shared::ScanOptions;
use tokio::sync::mpsc::UnboundedSender;

use crate::backend::domain::models::{AcquisitionError, DecodeError, SessionId};

/// Opaque drawable surface the camera stream is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoSurface {
    id: String,
}

impl VideoSurface {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// What the decoder observed on a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    Decoded(String),
    Failed(DecodeError),
}

/// Decoder report tagged with the activation cycle it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeEvent {
    pub session_id: SessionId,
    pub outcome: DecodeOutcome,
}

/// Channel a decoder reports through. Every event is stamped with the
/// session id it was created for.
#[derive(Debug, Clone)]
pub struct DecodeSink {
    session_id: SessionId,
    events: UnboundedSender<DecodeEvent>,
}

impl DecodeSink {
    pub fn new(session_id: SessionId, events: UnboundedSender<DecodeEvent>) -> Self {
        Self { session_id, events }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Report a successful read. Returns false once nobody is listening.
    pub fn decoded(&self, payload: impl Into<String>) -> bool {
        self.send(DecodeOutcome::Decoded(payload.into()))
    }

    /// Report a frame that could not be decoded
    pub fn failed(&self, error: DecodeError) -> bool {
        self.send(DecodeOutcome::Failed(error))
    }

    fn send(&self, outcome: DecodeOutcome) -> bool {
        self.events
            .send(DecodeEvent {
                session_id: self.session_id,
                outcome,
            })
            .is_ok()
    }
}

/// A running camera stream. Stopping it releases the device.
pub trait DecoderHandle: Send {
    fn stop(&mut self);
}

/// Opens camera streams and decodes frames from them
#[async_trait]
pub trait CameraDecoder: Send + Sync {
    type Handle: DecoderHandle;

    /// Open the camera bound to `surface` and start decoding continuously.
    /// May wait an arbitrary time on the user's permission prompt.
    async fn acquire(
        &self,
        surface: &VideoSurface,
        options: &ScanOptions,
        sink: DecodeSink,
    ) -> Result<Self::Handle, AcquisitionError>;
}
