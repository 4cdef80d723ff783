//! Scripted fakes for the platform seams, shared by the crate's tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use stockscan_core::{LookupOutcome, ScanResult};

use crate::decoder::{BarcodeDecoder, EncodedSnapshot, FrameBuffer, FrameSize, Polarity, QrDecoder};
use crate::device::{CameraBackend, CameraConstraints, MediaStream, VideoSink};
use crate::error::CameraError;
use crate::events::ScanEventEmitter;
use crate::status::CameraStatus;

// =============================================================================
// Recording Emitter
// =============================================================================

#[derive(Default)]
pub struct RecordingEmitter {
    statuses: Mutex<Vec<CameraStatus>>,
    errors: Mutex<Vec<CameraError>>,
    scans: Mutex<Vec<ScanResult>>,
    lookups: Mutex<Vec<LookupOutcome>>,
}

impl RecordingEmitter {
    pub fn statuses(&self) -> Vec<CameraStatus> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<CameraError> {
        self.errors.lock().unwrap().clone()
    }

    pub fn scans(&self) -> Vec<ScanResult> {
        self.scans.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<LookupOutcome> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn count_status(&self, status: CameraStatus) -> usize {
        self.statuses
            .lock()
            .unwrap()
            .iter()
            .filter(|s| **s == status)
            .count()
    }
}

impl ScanEventEmitter for RecordingEmitter {
    fn emit_status(&self, status: CameraStatus) {
        self.statuses.lock().unwrap().push(status);
    }

    fn emit_error(&self, error: &CameraError) {
        self.errors.lock().unwrap().push(error.clone());
    }

    fn emit_scan(&self, result: &ScanResult) {
        self.scans.lock().unwrap().push(result.clone());
    }

    fn emit_lookup(&self, outcome: &LookupOutcome) {
        self.lookups.lock().unwrap().push(outcome.clone());
    }
}

// =============================================================================
// Camera Backend
// =============================================================================

pub struct FakeStream {
    id: String,
    stops: Arc<AtomicUsize>,
}

impl MediaStream for FakeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop_tracks(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Grants every request unless an outcome was queued with `then`.
#[derive(Default)]
pub struct FakeBackend {
    outcomes: Mutex<VecDeque<Result<(), CameraError>>>,
    delay: Duration,
    requests: Mutex<Vec<CameraConstraints>>,
    stops: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn granting() -> Self {
        Self::default()
    }

    pub fn failing(error: CameraError) -> Self {
        Self::default().then(Err(error))
    }

    /// Queues the outcome of the next unanswered request.
    pub fn then(self, outcome: Result<(), CameraError>) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<CameraConstraints> {
        self.requests.lock().unwrap().clone()
    }

    /// Total `stop_tracks` calls across every stream handed out.
    pub fn track_stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl CameraBackend for FakeBackend {
    fn acquire(
        &self,
        constraints: CameraConstraints,
    ) -> BoxFuture<'static, Result<Box<dyn MediaStream>, CameraError>> {
        let outcome = self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()));
        let mut requests = self.requests.lock().unwrap();
        requests.push(constraints);
        let id = format!("stream-{}", requests.len());
        let stops = self.stops.clone();
        let delay = self.delay;

        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome.map(|()| Box::new(FakeStream { id, stops }) as Box<dyn MediaStream>)
        })
    }
}

// =============================================================================
// Video Sink
// =============================================================================

#[derive(Debug, Clone)]
pub enum ReadyBehavior {
    Immediate,
    After(Duration),
    Never,
    Fail(String),
}

struct SinkState {
    full_frame: bool,
    size: FrameSize,
    ready: ReadyBehavior,
    attach_error: Option<CameraError>,
    attached: Option<String>,
    attaches: usize,
    detaches: usize,
    plays: usize,
    captures: usize,
}

/// Cloneable handle; clones share state so tests can inspect a sink that
/// was boxed into a session.
#[derive(Clone)]
pub struct FakeSink {
    state: Arc<Mutex<SinkState>>,
}

impl FakeSink {
    pub fn new() -> Self {
        FakeSink {
            state: Arc::new(Mutex::new(SinkState {
                full_frame: true,
                size: FrameSize::new(64, 48),
                ready: ReadyBehavior::Immediate,
                attach_error: None,
                attached: None,
                attaches: 0,
                detaches: 0,
                plays: 0,
                captures: 0,
            })),
        }
    }

    pub fn with_frame(self, size: FrameSize, full_frame: bool) -> Self {
        self.set_frame(size, full_frame);
        self
    }

    pub fn with_ready(self, ready: ReadyBehavior) -> Self {
        self.state.lock().unwrap().ready = ready;
        self
    }

    pub fn with_attach_error(self, error: CameraError) -> Self {
        self.state.lock().unwrap().attach_error = Some(error);
        self
    }

    pub fn set_frame(&self, size: FrameSize, full_frame: bool) {
        let mut state = self.state.lock().unwrap();
        state.size = size;
        state.full_frame = full_frame;
    }

    pub fn capture_count(&self) -> usize {
        self.state.lock().unwrap().captures
    }

    pub fn attach_count(&self) -> usize {
        self.state.lock().unwrap().attaches
    }

    pub fn detach_count(&self) -> usize {
        self.state.lock().unwrap().detaches
    }

    pub fn play_count(&self) -> usize {
        self.state.lock().unwrap().plays
    }

    pub fn attached_stream(&self) -> Option<String> {
        self.state.lock().unwrap().attached.clone()
    }

    pub fn boxed(&self) -> Box<dyn VideoSink> {
        Box::new(self.clone())
    }
}

impl VideoSink for FakeSink {
    fn attach(&mut self, stream: &dyn MediaStream) -> Result<(), CameraError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.attach_error.clone() {
            return Err(error);
        }
        state.attaches += 1;
        state.attached = Some(stream.id().to_string());
        Ok(())
    }

    fn wait_ready(&mut self) -> BoxFuture<'static, Result<(), CameraError>> {
        let ready = self.state.lock().unwrap().ready.clone();
        Box::pin(async move {
            match ready {
                ReadyBehavior::Immediate => Ok(()),
                ReadyBehavior::After(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(())
                }
                ReadyBehavior::Never => std::future::pending().await,
                ReadyBehavior::Fail(message) => Err(CameraError::SinkAttach(message)),
            }
        })
    }

    fn play(&mut self) -> Result<(), CameraError> {
        self.state.lock().unwrap().plays += 1;
        Ok(())
    }

    fn has_full_frame(&self) -> bool {
        self.state.lock().unwrap().full_frame
    }

    fn frame_size(&self) -> FrameSize {
        self.state.lock().unwrap().size
    }

    fn capture(&mut self, buffer: &mut FrameBuffer) {
        self.state.lock().unwrap().captures += 1;
        buffer.pixels_mut().fill(0x80);
    }

    fn detach(&mut self) {
        let mut state = self.state.lock().unwrap();
        if state.attached.take().is_some() {
            state.detaches += 1;
        }
    }
}

// =============================================================================
// Decoders
// =============================================================================

/// Returns `payload` for the chosen polarity once `from_tick` normal-polarity
/// calls have been made.
pub struct ScriptedQrDecoder {
    payload: Option<String>,
    polarity: Polarity,
    from_tick: usize,
    ticks: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedQrDecoder {
    pub fn never() -> Self {
        ScriptedQrDecoder {
            payload: None,
            polarity: Polarity::Normal,
            from_tick: 1,
            ticks: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(payload: &str) -> Self {
        ScriptedQrDecoder {
            payload: Some(payload.to_string()),
            ..Self::never()
        }
    }

    pub fn on_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    pub fn from_tick(mut self, tick: usize) -> Self {
        self.from_tick = tick;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QrDecoder for ScriptedQrDecoder {
    fn decode(&self, _frame: &FrameBuffer, polarity: Polarity) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if polarity == Polarity::Normal {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }

        let ready = self.ticks.load(Ordering::SeqCst) >= self.from_tick;
        if ready && polarity == self.polarity {
            self.payload.clone()
        } else {
            None
        }
    }
}

/// Resolves after `delay` with `payload`.
pub struct ScriptedBarcodeDecoder {
    payload: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedBarcodeDecoder {
    pub fn never() -> Self {
        ScriptedBarcodeDecoder {
            payload: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(payload: &str) -> Self {
        ScriptedBarcodeDecoder {
            payload: Some(payload.to_string()),
            ..Self::never()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BarcodeDecoder for ScriptedBarcodeDecoder {
    fn decode(&self, snapshot: EncodedSnapshot) -> BoxFuture<'static, Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!snapshot.bytes.is_empty(), "snapshot must carry an encoded frame");

        let payload = self.payload.clone();
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            payload
        })
    }
}
