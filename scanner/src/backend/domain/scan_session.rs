use tracing::{debug, warn};

use crate::backend::camera::{CameraLease, DecoderHandle};
use crate::backend::domain::models::{
    AcquisitionError, DecodeError, DomainScanResult, InvalidTransition, ScanPhase, ScanTrigger,
    SessionId,
};

/// Exclusive ownership of a running decoder.
///
/// Dropping the guard stops the handle and then returns the camera lease, so
/// every path that lets go of it releases the camera.
pub struct ActiveDecoder<H: DecoderHandle> {
    session_id: SessionId,
    handle: H,
    _lease: CameraLease,
}

impl<H: DecoderHandle> ActiveDecoder<H> {
    pub fn new(session_id: SessionId, handle: H, lease: CameraLease) -> Self {
        Self {
            session_id,
            handle,
            _lease: lease,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

impl<H: DecoderHandle> Drop for ActiveDecoder<H> {
    fn drop(&mut self) {
        debug!("Stopping decoder for {}", self.session_id);
        self.handle.stop();
    }
}

/// State of one scanner: its phase, the decoder it owns and what the last
/// activation cycle produced.
pub struct ScanSession<H: DecoderHandle> {
    phase: ScanPhase,
    session_id: Option<SessionId>,
    decoder: Option<ActiveDecoder<H>>,
    last_result: Option<DomainScanResult>,
    last_error: Option<DecodeError>,
    last_acquisition_error: Option<AcquisitionError>,
    decode_failures: u32,
    activations: u64,
}

impl<H: DecoderHandle> ScanSession<H> {
    pub fn new() -> Self {
        Self {
            phase: ScanPhase::Idle,
            session_id: None,
            decoder: None,
            last_result: None,
            last_error: None,
            last_acquisition_error: None,
            decode_failures: 0,
            activations: 0,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// Camera running and frames being decoded
    pub fn is_active(&self) -> bool {
        self.phase == ScanPhase::Scanning
    }

    pub fn has_decoder(&self) -> bool {
        self.decoder.is_some()
    }

    /// Id of the cycle whose decoder is live, if any
    pub fn live_session_id(&self) -> Option<SessionId> {
        self.decoder.as_ref().map(ActiveDecoder::session_id)
    }

    /// Id of the current or most recent cycle
    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn last_result(&self) -> Option<&DomainScanResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&DecodeError> {
        self.last_error.as_ref()
    }

    pub fn last_acquisition_error(&self) -> Option<&AcquisitionError> {
        self.last_acquisition_error.as_ref()
    }

    /// Decode failures seen in the current cycle
    pub fn decode_failures(&self) -> u32 {
        self.decode_failures
    }

    pub fn activations(&self) -> u64 {
        self.activations
    }

    fn transition(&mut self, trigger: ScanTrigger) -> Result<ScanPhase, InvalidTransition> {
        let next = self.phase.apply(trigger)?;
        if next != self.phase {
            debug!("Scan phase {:?} -> {:?} on {:?}", self.phase, next, trigger);
        }
        self.phase = next;
        Ok(next)
    }

    /// Start a new activation cycle
    pub fn begin(&mut self, session_id: SessionId) -> Result<(), InvalidTransition> {
        self.transition(ScanTrigger::Activate)?;
        self.session_id = Some(session_id);
        self.activations += 1;
        self.decode_failures = 0;
        self.last_error = None;
        self.last_acquisition_error = None;
        Ok(())
    }

    /// Take ownership of the decoder that was just acquired
    pub fn attach(&mut self, decoder: ActiveDecoder<H>) -> Result<(), InvalidTransition> {
        self.transition(ScanTrigger::CameraReady)?;
        self.decoder = Some(decoder);
        Ok(())
    }

    pub fn fail_activation(&mut self, error: AcquisitionError) -> Result<(), InvalidTransition> {
        self.transition(ScanTrigger::CameraFailed)?;
        self.last_acquisition_error = Some(error);
        Ok(())
    }

    pub fn record_failure(&mut self, error: DecodeError) -> Result<(), InvalidTransition> {
        self.transition(ScanTrigger::DecodeFailed)?;
        self.decode_failures += 1;
        self.last_error = Some(error);
        Ok(())
    }

    pub fn record_result(&mut self, result: DomainScanResult) -> Result<(), InvalidTransition> {
        self.transition(ScanTrigger::Decoded)?;
        self.last_result = Some(result);
        Ok(())
    }

    /// Return to `Idle`, stopping the decoder if one is held.
    /// Returns true when a decoder handle was released.
    pub fn release(&mut self) -> bool {
        let trigger = match self.phase {
            ScanPhase::Idle => return false,
            ScanPhase::Decoded => ScanTrigger::Released,
            ScanPhase::Activating | ScanPhase::Scanning => ScanTrigger::Cancel,
        };

        if let Err(e) = self.transition(trigger) {
            warn!("Forcing scan session to idle: {}", e);
            self.phase = ScanPhase::Idle;
        }

        self.decoder.take().is_some()
    }
}

impl<H: DecoderHandle> Default for ScanSession<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::camera::CameraArbiter;
    use crate::backend::test_utils::CountingHandle;

    fn attach_new(session: &mut ScanSession<CountingHandle>, arbiter: &CameraArbiter) -> (SessionId, CountingHandle) {
        let id = SessionId::generate();
        let handle = CountingHandle::new();
        session.begin(id).unwrap();
        session
            .attach(ActiveDecoder::new(id, handle.clone(), arbiter.try_lease().unwrap()))
            .unwrap();
        (id, handle)
    }

    #[test]
    fn test_new_session_is_idle() {
        let session: ScanSession<CountingHandle> = ScanSession::new();
        assert_eq!(session.phase(), ScanPhase::Idle);
        assert!(!session.is_active());
        assert!(!session.has_decoder());
        assert!(session.last_result().is_none());
        assert_eq!(session.activations(), 0);
    }

    #[test]
    fn test_attach_then_release_stops_handle_once() {
        let arbiter = CameraArbiter::new();
        let mut session = ScanSession::new();
        let (id, handle) = attach_new(&mut session, &arbiter);

        assert!(session.is_active());
        assert_eq!(session.live_session_id(), Some(id));
        assert!(!arbiter.is_available());

        assert!(session.release());
        assert_eq!(handle.stops(), 1);
        assert!(arbiter.is_available());
        assert_eq!(session.phase(), ScanPhase::Idle);

        assert!(!session.release());
        assert_eq!(handle.stops(), 1);
    }

    #[test]
    fn test_decode_failures_do_not_leave_scanning() {
        let arbiter = CameraArbiter::new();
        let mut session = ScanSession::new();
        attach_new(&mut session, &arbiter);

        for _ in 0..5 {
            session.record_failure(DecodeError::NotFound).unwrap();
        }

        assert_eq!(session.phase(), ScanPhase::Scanning);
        assert_eq!(session.decode_failures(), 5);
        assert_eq!(session.last_error(), Some(&DecodeError::NotFound));
        assert!(session.last_result().is_none());
    }

    #[test]
    fn test_result_then_release() {
        let arbiter = CameraArbiter::new();
        let mut session = ScanSession::new();
        let (id, handle) = attach_new(&mut session, &arbiter);

        session.record_result(DomainScanResult::new(id, "RECEIPT-9")).unwrap();
        assert_eq!(session.phase(), ScanPhase::Decoded);

        assert!(session.release());
        assert_eq!(session.phase(), ScanPhase::Idle);
        assert_eq!(handle.stops(), 1);
        assert_eq!(session.last_result().map(|r| r.payload.as_str()), Some("RECEIPT-9"));
        assert_eq!(session.session_id(), Some(id));
    }

    #[test]
    fn test_new_cycle_resets_failures_but_keeps_result() {
        let arbiter = CameraArbiter::new();
        let mut session = ScanSession::new();
        let (id, _handle) = attach_new(&mut session, &arbiter);
        session.record_failure(DecodeError::NotFound).unwrap();
        session.record_result(DomainScanResult::new(id, "A")).unwrap();
        session.release();

        session.begin(SessionId::generate()).unwrap();
        assert_eq!(session.decode_failures(), 0);
        assert!(session.last_error().is_none());
        assert!(session.last_result().is_some());
        assert_eq!(session.activations(), 2);
    }

    #[test]
    fn test_failed_activation_records_error() {
        let mut session: ScanSession<CountingHandle> = ScanSession::new();
        session.begin(SessionId::generate()).unwrap();
        session.fail_activation(AcquisitionError::NoDevice).unwrap();

        assert_eq!(session.phase(), ScanPhase::Idle);
        assert_eq!(session.last_acquisition_error(), Some(&AcquisitionError::NoDevice));
        assert!(!session.has_decoder());
    }

    #[test]
    fn test_operations_rejected_in_wrong_phase() {
        let mut session: ScanSession<CountingHandle> = ScanSession::new();
        assert!(session.record_failure(DecodeError::NotFound).is_err());
        assert!(session
            .record_result(DomainScanResult::new(SessionId::generate(), "x"))
            .is_err());

        session.begin(SessionId::generate()).unwrap();
        assert!(session.begin(SessionId::generate()).is_err());
    }

    #[test]
    fn test_dropping_session_stops_decoder() {
        let arbiter = CameraArbiter::new();
        let mut session = ScanSession::new();
        let (_, handle) = attach_new(&mut session, &arbiter);

        drop(session);
        assert_eq!(handle.stops(), 1);
        assert!(arbiter.is_available());
    }
}
