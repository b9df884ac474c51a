use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::backend::domain::models::AcquisitionError;

/// Grants exclusive use of the camera to one scan session at a time.
///
/// Controllers built with the same arbiter share a single lease; a session
/// that tries to activate while another holds it gets `CameraBusy`.
#[derive(Debug, Clone)]
pub struct CameraArbiter {
    permits: Arc<Semaphore>,
}

/// Held for as long as a decoder handle is live
#[derive(Debug)]
pub struct CameraLease {
    _permit: OwnedSemaphorePermit,
}

impl CameraArbiter {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn try_lease(&self) -> Result<CameraLease, AcquisitionError> {
        match self.permits.clone().try_acquire_owned() {
            Ok(permit) => Ok(CameraLease { _permit: permit }),
            Err(_) => {
                debug!("Camera lease requested while another session holds it");
                Err(AcquisitionError::CameraBusy)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.permits.available_permits() > 0
    }
}

impl Default for CameraArbiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_lease() {
        let arbiter = CameraArbiter::new();
        let lease = arbiter.try_lease().unwrap();
        assert!(!arbiter.is_available());

        let shared = arbiter.clone();
        assert_eq!(shared.try_lease().unwrap_err(), AcquisitionError::CameraBusy);

        drop(lease);
        assert!(arbiter.is_available());
        assert!(shared.try_lease().is_ok());
    }
}
