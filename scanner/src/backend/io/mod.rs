//! # IO Layer
//!
//! Interface between the scan core and whatever displays it: the presenter
//! trait the controller reports to, and mappers from domain types to the
//! DTOs in the `shared` crate.

pub mod mappers;
pub mod presenter;

pub use mappers::ScanResultMapper;
pub use presenter::{ChannelPresenter, LoggingPresenter, PresenterEvent, ResultPresenter};
