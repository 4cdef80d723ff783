//! # Scan Loop
//!
//! Periodically samples the active sink, runs both decode strategies and
//! reports the first hit exactly once.
//!
//! ## Tick Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          One Tick (every 250 ms)                        │
//! │                                                                         │
//! │  gate closed? ──yes──► exit loop                                        │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  sink.has_full_frame()? ──no──► skip (no decode, no error)             │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  buffer.ensure_size(frame_size) ; sink.capture(buffer)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  QR normal ──hit──┐                                                     │
//! │  QR inverted ─hit─┤                                                     │
//! │       │ miss      ▼                                                     │
//! │       │        deliver(Qr) ──► exit loop                                │
//! │       ▼                                                                 │
//! │  multi-format slot busy? ──yes──► skip (no overlapping decodes)        │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  encode_png ──► spawn decode task ──► ... later ... deliver(MultiFormat)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delivery Gate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Both strategies race to the same gate. The gate is checked when a     │
//! │  result ARRIVES, not when the decode was submitted:                    │
//! │                                                                         │
//! │    QR hit (tick 7)        ──► try_complete() = true  ──► on_decoded    │
//! │    multi-format (tick 6)  ──► try_complete() = false ──► dropped       │
//! │    cancel()               ──► gate closed, timer aborted               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use stockscan_core::{DecodeStrategy, ScanResult};

use crate::decoder::{BarcodeDecoder, FrameBuffer, Polarity, QrDecoder};
use crate::device::VideoSink;

/// A sink shared between the session (attach/detach) and the loop (capture).
pub type SharedSink = Arc<Mutex<Box<dyn VideoSink>>>;

/// Called once with the first decoded result.
pub type DecodedCallback = Arc<dyn Fn(ScanResult) + Send + Sync>;

pub(crate) fn lock_sink(sink: &SharedSink) -> MutexGuard<'_, Box<dyn VideoSink>> {
    sink.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Scan Gate
// =============================================================================

/// One-shot completion gate.
///
/// Opens on creation; closed by the first successful decode or by
/// cancellation, whichever comes first. Never reopens.
#[derive(Debug, Default)]
pub struct ScanGate {
    closed: AtomicBool,
}

impl ScanGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the gate. Returns true only for the caller that closed it.
    pub fn try_complete(&self) -> bool {
        self.closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Closes the gate without completing.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

// =============================================================================
// Scan Loop Handle
// =============================================================================

/// Handle to a running scan loop. Owned by the `CameraSession`.
pub struct ScanLoopHandle {
    gate: Arc<ScanGate>,
    task: JoinHandle<()>,
}

impl ScanLoopHandle {
    /// Stops the loop.
    ///
    /// Synchronous: no tick fires after this returns, and any in-flight
    /// multi-format decode finds the gate closed when it resolves.
    pub fn cancel(&self) {
        self.gate.close();
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.gate.is_closed()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl std::fmt::Debug for ScanLoopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanLoopHandle")
            .field("cancelled", &self.gate.is_closed())
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

// =============================================================================
// Scan Loop
// =============================================================================

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// Sink had no complete frame; nothing was decoded.
    NoFrame,
    /// QR strategy hit and the result was delivered.
    Delivered,
    /// QR hit, but the gate was already closed.
    Dropped,
    /// QR missed; a multi-format decode was started.
    SecondaryStarted,
    /// QR missed; a multi-format decode is still pending from an earlier tick.
    SecondaryBusy,
    /// QR missed and the snapshot could not be encoded.
    EncodeFailed,
}

/// The frame-sampling decode loop.
pub struct ScanLoop {
    sink: SharedSink,
    qr: Arc<dyn QrDecoder>,
    barcode: Arc<dyn BarcodeDecoder>,
    gate: Arc<ScanGate>,
    secondary_in_flight: Arc<AtomicBool>,
    on_decoded: DecodedCallback,
    buffer: FrameBuffer,
}

impl ScanLoop {
    /// Spawns the loop on the current tokio runtime.
    ///
    /// The first tick fires one `interval` after spawning.
    pub fn spawn(
        sink: SharedSink,
        qr: Arc<dyn QrDecoder>,
        barcode: Arc<dyn BarcodeDecoder>,
        interval: Duration,
        on_decoded: DecodedCallback,
    ) -> ScanLoopHandle {
        let gate = Arc::new(ScanGate::new());
        let scan_loop = ScanLoop {
            sink,
            qr,
            barcode,
            gate: gate.clone(),
            secondary_in_flight: Arc::new(AtomicBool::new(false)),
            on_decoded,
            buffer: FrameBuffer::new(),
        };

        let task = tokio::spawn(scan_loop.run(interval));
        ScanLoopHandle { gate, task }
    }

    async fn run(mut self, period: Duration) {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_ms = period.as_millis() as u64, "Scan loop started");

        loop {
            ticker.tick().await;

            if self.gate.is_closed() {
                break;
            }

            match self.tick() {
                TickOutcome::Delivered | TickOutcome::Dropped => break,
                TickOutcome::NoFrame => trace!("No full frame buffered, skipping tick"),
                TickOutcome::SecondaryBusy => {
                    trace!("Multi-format decode still pending, skipping secondary")
                }
                TickOutcome::SecondaryStarted | TickOutcome::EncodeFailed => {}
            }
        }

        debug!("Scan loop exited");
    }

    /// Runs one sampling step.
    pub(crate) fn tick(&mut self) -> TickOutcome {
        {
            let mut sink = lock_sink(&self.sink);
            if !sink.has_full_frame() {
                return TickOutcome::NoFrame;
            }
            let size = sink.frame_size();
            if size.is_empty() {
                return TickOutcome::NoFrame;
            }
            if self.buffer.ensure_size(size) {
                debug!(%size, "Frame buffer resized");
            }
            sink.capture(&mut self.buffer);
        }

        for polarity in Polarity::ALL {
            if let Some(payload) = self.qr.decode(&self.buffer, polarity) {
                let result = ScanResult::camera(payload, DecodeStrategy::Qr);
                return if deliver(&self.gate, &self.on_decoded, result) {
                    TickOutcome::Delivered
                } else {
                    TickOutcome::Dropped
                };
            }
        }

        if self
            .secondary_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return TickOutcome::SecondaryBusy;
        }

        let snapshot = match self.buffer.encode_png() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.secondary_in_flight.store(false, Ordering::Release);
                warn!(error = %e, "Failed to encode frame snapshot");
                return TickOutcome::EncodeFailed;
            }
        };

        let decode = self.barcode.decode(snapshot);
        let gate = self.gate.clone();
        let slot = self.secondary_in_flight.clone();
        let on_decoded = self.on_decoded.clone();

        tokio::spawn(async move {
            let payload = decode.await;
            slot.store(false, Ordering::Release);

            match payload {
                Some(payload) => {
                    let result = ScanResult::camera(payload, DecodeStrategy::MultiFormat);
                    deliver(&gate, &on_decoded, result);
                }
                None => trace!("Multi-format decode found nothing"),
            }
        });

        TickOutcome::SecondaryStarted
    }
}

/// Passes `result` through the gate. Returns true if it was delivered.
fn deliver(gate: &ScanGate, on_decoded: &DecodedCallback, result: ScanResult) -> bool {
    if !gate.try_complete() {
        debug!(
            source = %result.source(),
            "Dropping decode result that arrived after completion"
        );
        return false;
    }

    info!(source = %result.source(), payload = %result.payload(), "Code decoded");
    on_decoded(result);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::FrameSize;
    use crate::testing::{FakeSink, ScriptedBarcodeDecoder, ScriptedQrDecoder};

    fn collector() -> (DecodedCallback, Arc<Mutex<Vec<ScanResult>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: DecodedCallback =
            Arc::new(move |result: ScanResult| sink.lock().unwrap().push(result));
        (callback, seen)
    }

    fn shared(sink: &FakeSink) -> SharedSink {
        Arc::new(Mutex::new(sink.boxed()))
    }

    #[test]
    fn test_gate_is_one_shot() {
        let gate = ScanGate::new();
        assert!(!gate.is_closed());
        assert!(gate.try_complete());
        assert!(!gate.try_complete());
        assert!(gate.is_closed());

        let cancelled = ScanGate::new();
        cancelled.close();
        assert!(!cancelled.try_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_decode_without_full_frame() {
        let sink = FakeSink::new().with_frame(FrameSize::new(64, 48), false);
        let qr = Arc::new(ScriptedQrDecoder::always("QR"));
        let barcode = Arc::new(ScriptedBarcodeDecoder::always("4901085123456"));
        let (callback, seen) = collector();

        let handle = ScanLoop::spawn(
            shared(&sink),
            qr.clone(),
            barcode.clone(),
            Duration::from_millis(250),
            callback,
        );

        tokio::time::sleep(Duration::from_millis(2_600)).await;

        assert_eq!(sink.capture_count(), 0);
        assert_eq!(qr.calls(), 0);
        assert_eq!(barcode.calls(), 0);
        assert!(seen.lock().unwrap().is_empty());
        assert!(!handle.is_finished());
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let sink = FakeSink::new().with_frame(FrameSize::new(64, 48), true);
        let (callback, _) = collector();

        let handle = ScanLoop::spawn(
            shared(&sink),
            Arc::new(ScriptedQrDecoder::never()),
            Arc::new(ScriptedBarcodeDecoder::never()),
            Duration::from_millis(250),
            callback,
        );

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(sink.capture_count(), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sink.capture_count(), 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(sink.capture_count(), 3);
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_qr_wins_over_multi_format_in_same_tick() {
        let sink = FakeSink::new().with_frame(FrameSize::new(64, 48), true);
        let barcode = Arc::new(ScriptedBarcodeDecoder::always("4901085123456"));
        let (callback, seen) = collector();

        let handle = ScanLoop::spawn(
            shared(&sink),
            Arc::new(ScriptedQrDecoder::always("https://example.com/item/1")),
            barcode.clone(),
            Duration::from_millis(250),
            callback,
        );

        tokio::time::sleep(Duration::from_millis(1_000)).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].payload(), "https://example.com/item/1");
        assert_eq!(seen[0].source().strategy(), Some(DecodeStrategy::Qr));
        assert_eq!(barcode.calls(), 0);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_inverted_polarity_is_tried() {
        let sink = FakeSink::new().with_frame(FrameSize::new(64, 48), true);
        let qr = Arc::new(ScriptedQrDecoder::always("INV").on_polarity(Polarity::Inverted));
        let (callback, seen) = collector();

        let _handle = ScanLoop::spawn(
            shared(&sink),
            qr.clone(),
            Arc::new(ScriptedBarcodeDecoder::never()),
            Duration::from_millis(250),
            callback,
        );

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(seen.lock().unwrap()[0].payload(), "INV");
        assert_eq!(qr.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_slot_guard_prevents_overlapping_decodes() {
        let sink = FakeSink::new().with_frame(FrameSize::new(64, 48), true);
        let barcode =
            Arc::new(ScriptedBarcodeDecoder::never().with_delay(Duration::from_millis(1_000)));
        let (callback, _) = collector();

        let handle = ScanLoop::spawn(
            shared(&sink),
            Arc::new(ScriptedQrDecoder::never()),
            barcode.clone(),
            Duration::from_millis(250),
            callback,
        );

        // Ticks at 250, 500, 750, 1000: only the first starts a decode.
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(sink.capture_count(), 4);
        assert_eq!(barcode.calls(), 1);

        // The first decode resolves at 1250 ms; a later tick starts the second.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(barcode.calls(), 2);
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_multi_format_result_is_dropped() {
        let sink = FakeSink::new().with_frame(FrameSize::new(64, 48), true);
        let qr = Arc::new(ScriptedQrDecoder::always("QR").from_tick(2));
        let barcode = Arc::new(
            ScriptedBarcodeDecoder::always("4901085123456").with_delay(Duration::from_millis(800)),
        );
        let (callback, seen) = collector();

        let _handle = ScanLoop::spawn(
            shared(&sink),
            qr,
            barcode.clone(),
            Duration::from_millis(250),
            callback,
        );

        // Tick 1 (250 ms) starts the slow decode; tick 2 (500 ms) hits QR.
        tokio::time::sleep(Duration::from_millis(2_000)).await;

        let seen = seen.lock().unwrap();
        assert_eq!(barcode.calls(), 1);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].payload(), "QR");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks_and_discards_in_flight_decode() {
        let sink = FakeSink::new().with_frame(FrameSize::new(64, 48), true);
        let barcode = Arc::new(
            ScriptedBarcodeDecoder::always("4901085123456").with_delay(Duration::from_millis(500)),
        );
        let (callback, seen) = collector();

        let handle = ScanLoop::spawn(
            shared(&sink),
            Arc::new(ScriptedQrDecoder::never()),
            barcode.clone(),
            Duration::from_millis(250),
            callback,
        );

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(barcode.calls(), 1);

        handle.cancel();
        assert!(handle.is_cancelled());
        let captured = sink.capture_count();

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(sink.capture_count(), captured);
        assert!(seen.lock().unwrap().is_empty());
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_buffer_follows_source_resolution() {
        let sink = FakeSink::new().with_frame(FrameSize::new(64, 48), true);
        let (callback, _) = collector();
        let mut scan_loop = ScanLoop {
            sink: shared(&sink),
            qr: Arc::new(ScriptedQrDecoder::never()),
            barcode: Arc::new(ScriptedBarcodeDecoder::never()),
            gate: Arc::new(ScanGate::new()),
            secondary_in_flight: Arc::new(AtomicBool::new(false)),
            on_decoded: callback,
            buffer: FrameBuffer::new(),
        };

        assert_eq!(scan_loop.tick(), TickOutcome::SecondaryStarted);
        assert_eq!(scan_loop.buffer.size(), FrameSize::new(64, 48));

        sink.set_frame(FrameSize::new(48, 64), true);
        let outcome = scan_loop.tick();
        assert!(matches!(
            outcome,
            TickOutcome::SecondaryBusy | TickOutcome::SecondaryStarted
        ));
        assert_eq!(scan_loop.buffer.size(), FrameSize::new(48, 64));

        sink.set_frame(FrameSize::new(0, 0), true);
        assert_eq!(scan_loop.tick(), TickOutcome::NoFrame);
    }
}
