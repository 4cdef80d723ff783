//! # Camera Session
//!
//! Owns one camera attempt end to end: acquisition, sink binding, readiness,
//! the scan loop, and release.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CameraSession                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────┐     ┌──────────────────────────────┐ │
//! │  │ SessionShared (Arc)          │     │ Collaborators                │ │
//! │  │                              │     │                              │ │
//! │  │  state: Mutex<SessionState>  │     │  backend: CameraBackend      │ │
//! │  │   • status                   │     │  decoders: QR + multi-format │ │
//! │  │   • last_error               │     │  config: ScannerConfig       │ │
//! │  │   • stream (exclusive)       │     └──────────────────────────────┘ │
//! │  │   • scan_loop handle (≤ 1)   │                                      │
//! │  │   • attempt generation       │◄──── Weak ──── ScanLoop on_decoded   │
//! │  │  sink: SharedSink            │                                      │
//! │  │  emitter                     │                                      │
//! │  └──────────────────────────────┘                                      │
//! │                                                                         │
//! │  Release (stop / decoded / manual / Drop):                             │
//! │    cancel loop ──► stop tracks ──► detach sink ──► Released            │
//! │    idempotent: Idle and Released are no-ops                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Attempt Generations
//! ```text
//! start()  attempt=1 ──► acquire ........ (suspended) ........ stream arrives
//!                                  stop() attempt=2 ──► Released      │
//!                                                                     ▼
//!                                        attempt 1 ≠ 2: stop_tracks, discard
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, info, warn};
use uuid::Uuid;

use stockscan_core::{ScanResult, ValidationError};

use crate::config::ScannerConfig;
use crate::decoder::Decoders;
use crate::device::{CameraBackend, CameraConstraints, MediaStream, VideoSink};
use crate::error::CameraError;
use crate::events::ScanEventEmitter;
use crate::manual::ManualEntry;
use crate::scan_loop::{lock_sink, DecodedCallback, ScanLoop, ScanLoopHandle, SharedSink};
use crate::status::CameraStatus;

// =============================================================================
// Release Reason
// =============================================================================

/// Why a session was released. Logged only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    Stopped,
    Decoded,
    ManualEntry,
    OwnerDropped,
}

impl std::fmt::Display for ReleaseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseReason::Stopped => write!(f, "stopped"),
            ReleaseReason::Decoded => write!(f, "decoded"),
            ReleaseReason::ManualEntry => write!(f, "manual_entry"),
            ReleaseReason::OwnerDropped => write!(f, "owner_dropped"),
        }
    }
}

// =============================================================================
// Shared State
// =============================================================================

/// An event recorded under the state lock and emitted after it drops, so
/// an emitter may read the session from inside its callback.
enum PendingEvent {
    Status(CameraStatus),
    Error(CameraError),
}

#[derive(Default)]
struct SessionState {
    status: CameraStatus,
    last_error: Option<CameraError>,
    stream: Option<Box<dyn MediaStream>>,
    sink_attached: bool,
    scan_loop: Option<ScanLoopHandle>,
    /// Bumped on every start and every release; a suspended attempt that
    /// resumes with a stale value must not touch the session.
    attempt: u64,
    pending: Vec<PendingEvent>,
}

struct SessionShared {
    id: Uuid,
    sink: SharedSink,
    emitter: Arc<dyn ScanEventEmitter>,
    state: Mutex<SessionState>,
}

impl SessionShared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops the guard, then emits the events queued while it was held.
    fn unlock(&self, mut state: MutexGuard<'_, SessionState>) -> CameraStatus {
        let status = state.status;
        let pending = std::mem::take(&mut state.pending);
        drop(state);

        for event in pending {
            match event {
                PendingEvent::Status(next) => self.emitter.emit_status(next),
                PendingEvent::Error(error) => self.emitter.emit_error(&error),
            }
        }
        status
    }

    fn transition(&self, state: &mut SessionState, next: CameraStatus) -> bool {
        let previous = state.status;
        if !previous.can_transition_to(next) {
            warn!(
                session = %self.id,
                from = %previous,
                to = %next,
                "Ignoring illegal camera status transition"
            );
            return false;
        }

        state.status = next;
        info!(session = %self.id, from = %previous, to = %next, "Camera status changed");
        state.pending.push(PendingEvent::Status(next));
        true
    }

    /// Cancels the loop, stops the stream and detaches the sink. Each step
    /// runs at most once per acquired resource.
    fn teardown(&self, state: &mut SessionState) {
        if let Some(handle) = state.scan_loop.take() {
            handle.cancel();
            debug!(session = %self.id, "Scan loop cancelled");
        }

        if let Some(mut stream) = state.stream.take() {
            stream.stop_tracks();
            debug!(session = %self.id, stream = stream.id(), "Stream tracks stopped");
        }

        if state.sink_attached {
            lock_sink(&self.sink).detach();
            state.sink_attached = false;
        }
    }

    fn fail(&self, state: &mut SessionState, error: CameraError) {
        self.teardown(state);
        warn!(
            session = %self.id,
            error = %error,
            kind = ?error.kind(),
            "Camera attempt failed"
        );
        state.pending.push(PendingEvent::Error(error.clone()));
        state.last_error = Some(error);
        self.transition(state, CameraStatus::Failed);
    }

    /// Fails `attempt` unless a stop has superseded it.
    fn fail_if_current(&self, attempt: u64, error: CameraError) -> CameraStatus {
        let mut state = self.lock();
        if state.attempt != attempt {
            debug!(session = %self.id, error = %error, "Discarding failure of a stopped attempt");
            return state.status;
        }
        self.fail(&mut state, error);
        self.unlock(state)
    }

    /// Returns true if this call performed the release.
    fn release(&self, reason: ReleaseReason) -> bool {
        let mut state = self.lock();
        if matches!(state.status, CameraStatus::Idle | CameraStatus::Released) {
            debug!(session = %self.id, status = %state.status, %reason, "Nothing to release");
            return false;
        }

        state.attempt += 1;
        self.teardown(&mut state);
        self.transition(&mut state, CameraStatus::Released);
        self.unlock(state);
        info!(session = %self.id, %reason, "Camera session released");
        true
    }
}

// =============================================================================
// Camera Session
// =============================================================================

/// One scanner screen's camera lifecycle.
///
/// Not `Clone`: the stream and the scan loop have exactly one owner.
/// Dropping the session releases it.
pub struct CameraSession {
    shared: Arc<SessionShared>,
    backend: Arc<dyn CameraBackend>,
    decoders: Decoders,
    config: ScannerConfig,
}

impl CameraSession {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        sink: Box<dyn VideoSink>,
        decoders: Decoders,
        emitter: Arc<dyn ScanEventEmitter>,
        config: ScannerConfig,
    ) -> Self {
        let id = Uuid::new_v4();
        debug!(session = %id, "Camera session created");

        CameraSession {
            shared: Arc::new(SessionShared {
                id,
                sink: Arc::new(Mutex::new(sink)),
                emitter,
                state: Mutex::new(SessionState::default()),
            }),
            backend,
            decoders,
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn status(&self) -> CameraStatus {
        self.shared.lock().status
    }

    /// The classified error of the last failed attempt. Cleared on start.
    pub fn last_error(&self) -> Option<CameraError> {
        self.shared.lock().last_error.clone()
    }

    pub fn is_scanning(&self) -> bool {
        self.shared.lock().scan_loop.is_some()
    }

    /// Acquires the camera and starts scanning.
    ///
    /// Never returns an error: failures land in `CameraStatus::Failed` with
    /// `last_error()` set. Ignored while an attempt is already in flight.
    pub async fn start(&self) -> CameraStatus {
        let attempt = match self.begin_attempt() {
            Ok(attempt) => attempt,
            Err(status) => return status,
        };

        self.run_attempt(attempt, self.config.constraints()).await
    }

    /// Re-triggers the permission prompt with a minimal request, then runs a
    /// normal attempt.
    pub async fn request_permission_and_retry(&self) -> CameraStatus {
        let attempt = match self.begin_attempt() {
            Ok(attempt) => attempt,
            Err(status) => return status,
        };

        info!(session = %self.shared.id, "Re-requesting camera permission");
        match self.backend.acquire(CameraConstraints::minimal()).await {
            Ok(mut probe) => {
                probe.stop_tracks();
                debug!(session = %self.shared.id, stream = probe.id(), "Permission probe granted");
            }
            Err(error) => return self.shared.fail_if_current(attempt, error),
        }

        if !self.is_current(attempt) {
            return self.status();
        }

        self.run_attempt(attempt, self.config.constraints()).await
    }

    /// Releases the camera. Always succeeds; repeated calls are no-ops.
    pub fn stop(&self) {
        self.shared.release(ReleaseReason::Stopped);
    }

    /// Delivers typed-in input through the same hook as a camera decode,
    /// releasing the camera first if it is running.
    pub fn submit_manual(&self, input: &str) -> Result<ScanResult, ValidationError> {
        let result = ManualEntry::submit(input)?;

        self.shared.release(ReleaseReason::ManualEntry);
        info!(session = %self.shared.id, payload = %result.payload(), "Manual entry submitted");
        self.shared.emitter.emit_scan(&result);

        Ok(result)
    }

    // =========================================================================
    // Attempt
    // =========================================================================

    fn begin_attempt(&self) -> Result<u64, CameraStatus> {
        let mut state = self.shared.lock();
        if state.status.is_in_flight() {
            warn!(
                session = %self.shared.id,
                status = %state.status,
                "Camera session already running, start ignored"
            );
            return Err(state.status);
        }

        state.attempt += 1;
        state.last_error = None;
        self.shared.transition(&mut state, CameraStatus::Requesting);
        let attempt = state.attempt;
        self.shared.unlock(state);
        Ok(attempt)
    }

    fn is_current(&self, attempt: u64) -> bool {
        self.shared.lock().attempt == attempt
    }

    async fn run_attempt(&self, attempt: u64, constraints: CameraConstraints) -> CameraStatus {
        let shared = &self.shared;

        debug!(session = %shared.id, attempt, ?constraints, "Requesting camera access");
        let mut stream = match self.backend.acquire(constraints).await {
            Ok(stream) => stream,
            Err(error) => return shared.fail_if_current(attempt, error),
        };

        {
            let mut state = shared.lock();
            if state.attempt != attempt {
                debug!(
                    session = %shared.id,
                    stream = stream.id(),
                    "Stream arrived after stop, releasing it"
                );
                stream.stop_tracks();
                return state.status;
            }

            shared.transition(&mut state, CameraStatus::Attaching);
            let attached = lock_sink(&shared.sink).attach(&*stream);
            state.stream = Some(stream);
            if let Err(error) = attached {
                shared.fail(&mut state, error);
                return shared.unlock(state);
            }
            state.sink_attached = true;
            shared.unlock(state);
        }

        let ready_timeout = self.config.ready_timeout();
        let ready = lock_sink(&shared.sink).wait_ready();
        let readiness = match tokio::time::timeout(ready_timeout, ready).await {
            Ok(result) => result,
            Err(_) => Err(CameraError::Unresponsive {
                waited_ms: ready_timeout.as_millis() as u64,
            }),
        };

        let mut state = shared.lock();
        if state.attempt != attempt {
            return state.status;
        }
        if let Err(error) = readiness {
            shared.fail(&mut state, error);
            return shared.unlock(state);
        }
        shared.transition(&mut state, CameraStatus::Ready);

        if let Err(error) = lock_sink(&shared.sink).play() {
            shared.fail(&mut state, error);
            return shared.unlock(state);
        }

        if let Some(previous) = state.scan_loop.take() {
            previous.cancel();
        }
        state.scan_loop = Some(ScanLoop::spawn(
            shared.sink.clone(),
            self.decoders.qr.clone(),
            self.decoders.barcode.clone(),
            self.config.scan_interval(),
            on_decoded(Arc::downgrade(shared)),
        ));
        shared.transition(&mut state, CameraStatus::Active);

        shared.unlock(state)
    }
}

/// Completion path for the scan loop: release first, then report.
fn on_decoded(shared: Weak<SessionShared>) -> DecodedCallback {
    Arc::new(move |result: ScanResult| {
        let Some(shared) = shared.upgrade() else {
            return;
        };

        if shared.release(ReleaseReason::Decoded) {
            shared.emitter.emit_scan(&result);
        } else {
            debug!(session = %shared.id, "Session already released, dropping decode result");
        }
    })
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.shared.release(ReleaseReason::OwnerDropped);
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("id", &self.shared.id)
            .field("status", &self.status())
            .finish()
    }
}
