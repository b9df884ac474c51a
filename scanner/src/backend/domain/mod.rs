//! # Domain Module
//!
//! The scan flow itself, independent of any UI framework or camera backend.
//!
//! ## Module Organization
//!
//! - **models**: phases and triggers, scan results, session ids, errors
//! - **scan_session**: the session record and the guard that owns a decoder
//! - **scan_controller**: activation, decode handling and teardown
//! - **scan_driver**: task that feeds a controller page commands and decoder reports
//! - **result_card**: formatting of the "Scan Result" card
//! - **commands**: inputs accepted by the driver
//!
//! ## Rules
//!
//! - At most one decoder handle is live per session, and at most one across
//!   sessions that share a `CameraArbiter`
//! - A cycle produces at most one result; the camera stops right after it
//! - Frames without a code are normal and never reach the user
//! - Camera failures are recoverable; the user retries by toggling again

pub mod commands;
pub mod models;
pub mod result_card;
pub mod scan_controller;
pub mod scan_driver;
pub mod scan_session;

pub use commands::ScanCommand;
pub use result_card::ResultCardService;
pub use scan_controller::{ActivationOutcome, ScanSessionController};
pub use scan_driver::{spawn_driver, ScanDriverHandle};
pub use scan_session::{ActiveDecoder, ScanSession};
