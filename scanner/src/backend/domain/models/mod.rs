pub mod errors;
pub mod scan_result;
pub mod scan_state;

pub use errors::{AcquisitionError, DecodeError, ScanError};
pub use scan_result::{is_valid_payload, DomainScanResult, SessionId};
pub use scan_state::{InvalidTransition, ScanPhase, ScanTrigger};
