//! # Backend Module
//!
//! Contains all non-UI logic for the dashboard's QR scan flow.
//!
//! This module brings together:
//! - **Domain**: the scan session state machine, controller and driver
//! - **Camera**: the decoder seam, the camera lease and a scripted camera
//! - **IO**: presenters and mappers to the `shared` DTOs
//! - **Config**: YAML-backed scanner settings
//!
//! ## Architecture
//!
//! ```text
//! Scan page (toggle, result card)
//!     ↓ set_active / teardown        ↑ ResultPresenter
//! Scan Driver (task)
//!     ↓
//! Scan Session Controller
//!     ↓ acquire / stop               ↑ DecodeSink
//! Camera Decoder
//! ```

pub mod camera;
pub mod config;
pub mod domain;
pub mod io;

#[cfg(test)]
pub(crate) mod test_utils;

use std::sync::Arc;
use tracing::info;

pub use camera::*;
pub use config::*;
pub use domain::*;
pub use io::*;

/// Build a controller from `config` and start a driver for it
pub fn initialize_scanner<C>(
    config: &ScanConfig,
    camera: C,
    arbiter: CameraArbiter,
    presenter: Arc<dyn ResultPresenter>,
) -> ScanDriverHandle
where
    C: CameraDecoder + 'static,
{
    info!(
        "Setting up scanner on surface '{}' (prefers {} camera)",
        config.surface_id,
        config.options.preferred_camera.facing_mode()
    );

    let controller =
        ScanSessionController::new(camera, VideoSurface::new(config.surface_id.clone()), presenter)
            .with_options(config.options.clone())
            .with_arbiter(arbiter);

    spawn_driver(controller)
}
