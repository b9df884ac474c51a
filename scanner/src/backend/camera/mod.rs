//! # Camera Module
//!
//! The external camera/decoder collaborator, seen from the scan core.
//!
//! - **traits**: `CameraDecoder` / `DecoderHandle` seam and the session-tagged
//!   `DecodeSink` decoders report through
//! - **arbiter**: single-permit lease so only one session holds the camera
//! - **scripted**: frame-script camera for the simulator and tests

pub mod arbiter;
pub mod scripted;
pub mod traits;

pub use arbiter::{CameraArbiter, CameraLease};
pub use scripted::{FrameScript, ScriptedCamera, ScriptedHandle};
pub use traits::{CameraDecoder, DecodeEvent, DecodeOutcome, DecodeSink, DecoderHandle, VideoSurface};
