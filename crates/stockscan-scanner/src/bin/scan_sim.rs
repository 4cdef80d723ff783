//! # Scan Simulator
//!
//! Drives one `CameraSession` against a simulated camera, prints the
//! catalog outcome, then exercises manual entry. For development only.
//!
//! ## Usage
//! ```bash
//! # Linear barcode revealed after 4 frames (default)
//! cargo run -p stockscan-scanner --bin scan_sim
//!
//! # QR code carrying a payload, revealed on the 2nd frame
//! cargo run -p stockscan-scanner --bin scan_sim -- --qr --payload 4902102000001 --after 2
//!
//! # Manual entry payload
//! cargo run -p stockscan-scanner --bin scan_sim -- --manual "  0000000000000 "
//! ```
//!
//! ## Simulated Frames
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Frames are flat gray until the code is "in view". From then on the    │
//! │  first pixel row carries a marker:                                     │
//! │                                                                         │
//! │    [ 'Q' | len | payload... ]  read by SimQrDecoder over raw pixels    │
//! │    [ 'B' | len | payload... ]  read by SimBarcodeDecoder from the PNG  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use image::ImageFormat;
use tokio::sync::Notify;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockscan_core::{Catalog, LookupOutcome, ScanResult};
use stockscan_scanner::{
    BarcodeDecoder, CameraBackend, CameraConstraints, CameraError, CameraSession, CameraStatus,
    Decoders, EncodedSnapshot, FrameBuffer, FrameSize, LookupEmitter, ManualEntry, MediaStream,
    Polarity, QrDecoder, ScanEventEmitter, ScannerConfig, VideoSink,
};

const QR_TAG: u8 = b'Q';
const BARCODE_TAG: u8 = b'B';

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut payload = String::from("4901085123456");
    let mut reveal_after: usize = 4;
    let mut tag = BARCODE_TAG;
    let mut manual = String::from("  4904230123789 ");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--payload" | "-p" => {
                if i + 1 < args.len() {
                    payload = args[i + 1].clone();
                    i += 1;
                }
            }
            "--after" | "-a" => {
                if i + 1 < args.len() {
                    reveal_after = args[i + 1].parse().unwrap_or(4);
                    i += 1;
                }
            }
            "--manual" | "-m" => {
                if i + 1 < args.len() {
                    manual = args[i + 1].clone();
                    i += 1;
                }
            }
            "--qr" => tag = QR_TAG,
            "--help" | "-h" => {
                println!("StockScan Scan Simulator");
                println!();
                println!("Usage: scan_sim [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --payload <CODE>   Code shown to the camera (default: 4901085123456)");
                println!("  -a, --after <N>        Frames before the code comes into view (default: 4)");
                println!("      --qr               Present the code as a QR symbol");
                println!("  -m, --manual <TEXT>    Manual entry input to submit afterwards");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = ScannerConfig::load_or_default(None);
    let catalog = Arc::new(Catalog::seed());

    println!("StockScan Scan Simulator");
    println!("========================");
    println!("Catalog:  {} products, {} in stock value", catalog.len(), catalog.total_value());
    println!("Payload:  {} ({})", payload, if tag == QR_TAG { "qr" } else { "barcode" });
    println!("Interval: {} ms", config.scan.interval_ms);
    println!();

    let done = Arc::new(Notify::new());
    let emitter = Arc::new(LookupEmitter::new(
        catalog.clone(),
        PrintEmitter { done: done.clone() },
    ));

    let session = CameraSession::new(
        Arc::new(SimBackend),
        Box::new(SimSink::new(payload, tag, reveal_after)),
        Decoders::new(Arc::new(SimQrDecoder), Arc::new(SimBarcodeDecoder)),
        emitter.clone(),
        config.clone(),
    );

    let status = session.start().await;
    if status == CameraStatus::Failed {
        if let Some(error) = session.last_error() {
            println!("✗ {}", error.user_message());
        }
    } else {
        let wait = config.scan_interval() * (reveal_after as u32 + 8);
        if tokio::time::timeout(wait, done.notified()).await.is_err() {
            println!("✗ No code decoded within {} ms", wait.as_millis());
        }
    }
    session.stop();

    println!();
    println!("Manual entry: {:?}", manual);
    match ManualEntry::deliver(&manual, emitter.as_ref()) {
        Ok(_) => {}
        Err(e) => println!("✗ Rejected: {}", e),
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockscan=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();
}

// =============================================================================
// Presentation Stand-in
// =============================================================================

struct PrintEmitter {
    done: Arc<Notify>,
}

impl ScanEventEmitter for PrintEmitter {
    fn emit_status(&self, status: CameraStatus) {
        println!("  [{}] {}", status, status.hint());
    }

    fn emit_error(&self, error: &CameraError) {
        println!("  ✗ {}", error.user_message());
        if error.offers_permission_retry() {
            println!("    (retry permission available)");
        }
    }

    fn emit_scan(&self, result: &ScanResult) {
        println!("✓ Scanned {} via {}", result.payload(), result.source());
    }

    fn emit_lookup(&self, outcome: &LookupOutcome) {
        match outcome {
            LookupOutcome::Found { product } => {
                println!(
                    "  {} {}  {}  stock {} ({})",
                    product.category.icon(),
                    product.name,
                    product.price,
                    product.stock,
                    product.stock_level().label()
                );
            }
            LookupOutcome::NotFound { payload } => {
                println!("  No product for this code: {}", payload);
            }
        }
        self.done.notify_one();
    }
}

// =============================================================================
// Simulated Camera
// =============================================================================

struct SimBackend;

impl CameraBackend for SimBackend {
    fn acquire(
        &self,
        constraints: CameraConstraints,
    ) -> BoxFuture<'static, Result<Box<dyn MediaStream>, CameraError>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            let facing = constraints
                .facing
                .map(|f| f.to_string())
                .unwrap_or_else(|| "any".to_string());
            Ok(Box::new(SimStream {
                id: format!("sim-{}", facing),
            }) as Box<dyn MediaStream>)
        })
    }
}

struct SimStream {
    id: String,
}

impl MediaStream for SimStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop_tracks(&mut self) {
        info!(stream = %self.id, "Simulated camera turned off");
    }
}

struct SimSink {
    size: FrameSize,
    payload: String,
    tag: u8,
    reveal_after: usize,
    captures: usize,
    playing: bool,
}

impl SimSink {
    fn new(payload: String, tag: u8, reveal_after: usize) -> Self {
        SimSink {
            size: FrameSize::new(640, 480),
            payload,
            tag,
            reveal_after,
            captures: 0,
            playing: false,
        }
    }
}

impl VideoSink for SimSink {
    fn attach(&mut self, stream: &dyn MediaStream) -> Result<(), CameraError> {
        info!(stream = stream.id(), "Simulated sink attached");
        Ok(())
    }

    fn wait_ready(&mut self) -> BoxFuture<'static, Result<(), CameraError>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(())
        })
    }

    fn play(&mut self) -> Result<(), CameraError> {
        self.playing = true;
        Ok(())
    }

    fn has_full_frame(&self) -> bool {
        self.playing
    }

    fn frame_size(&self) -> FrameSize {
        self.size
    }

    fn capture(&mut self, buffer: &mut FrameBuffer) {
        self.captures += 1;
        let pixels = buffer.pixels_mut();
        pixels.fill(0xC0);

        if self.captures >= self.reveal_after {
            let bytes = self.payload.as_bytes();
            let len = bytes.len().min(u8::MAX as usize);
            pixels[0] = self.tag;
            pixels[1] = len as u8;
            pixels[2..2 + len].copy_from_slice(&bytes[..len]);
        }
    }

    fn detach(&mut self) {
        self.playing = false;
    }
}

// =============================================================================
// Simulated Decoders
// =============================================================================

fn read_marker(pixels: &[u8], tag: u8) -> Option<String> {
    if *pixels.first()? != tag {
        return None;
    }
    let len = *pixels.get(1)? as usize;
    let bytes = pixels.get(2..2 + len)?;
    String::from_utf8(bytes.to_vec()).ok()
}

struct SimQrDecoder;

impl QrDecoder for SimQrDecoder {
    fn decode(&self, frame: &FrameBuffer, polarity: Polarity) -> Option<String> {
        match polarity {
            Polarity::Normal => read_marker(frame.pixels(), QR_TAG),
            Polarity::Inverted => None,
        }
    }
}

struct SimBarcodeDecoder;

impl BarcodeDecoder for SimBarcodeDecoder {
    fn decode(&self, snapshot: EncodedSnapshot) -> BoxFuture<'static, Option<String>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(40)).await;
            let image = image::load_from_memory_with_format(&snapshot.bytes, ImageFormat::Png).ok()?;
            read_marker(image.to_rgba8().as_raw(), BARCODE_TAG)
        })
    }
}
