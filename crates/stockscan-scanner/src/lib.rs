//! # stockscan-scanner: Barcode Acquisition for StockScan
//!
//! This crate turns a live camera into at most one decoded payload per
//! session, and offers typed-in entry as a fallback.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Acquisition Pipeline                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    CameraSession (session.rs)                    │  │
//! │  │                                                                  │  │
//! │  │  Idle ─► Requesting ─► Attaching ─► Ready ─► Active              │  │
//! │  │                 └──────────┴───────────┴─► Failed                │  │
//! │  │  stop / decode / Drop ─────────────────────► Released            │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ spawns (≤ 1 at a time)                  │
//! │                               ▼                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      ScanLoop (scan_loop.rs)                     │  │
//! │  │                                                                  │  │
//! │  │  every 250 ms: full frame? ─► QR (normal, inverted)              │  │
//! │  │                             └► multi-format (async, 1 in flight) │  │
//! │  │  first hit ─► ScanGate (one-shot) ─► release ─► emit_scan        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ManualEntry (manual.rs) ──────────────────────────► emit_scan         │
//! │                                                                         │
//! │  EVENTS (to the presentation layer, events.rs):                        │
//! │  • emit_status  - lifecycle changes                                    │
//! │  • emit_error   - classified camera failures                           │
//! │  • emit_scan    - the decoded payload (at most once per session)       │
//! │  • emit_lookup  - catalog outcome (via LookupEmitter)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`session`] - `CameraSession` lifecycle and release
//! - [`scan_loop`] - Periodic sampling, decode order and the one-shot gate
//! - [`status`] - Closed camera status enumeration
//! - [`device`] - Camera backend, stream and sink traits
//! - [`decoder`] - Frame buffer and decoder traits
//! - [`manual`] - Manual entry fallback
//! - [`events`] - Presentation-layer event seam
//! - [`config`] - Scanner configuration (TOML + env)
//! - [`error`] - Camera and scanner error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockscan_core::Catalog;
//! use stockscan_scanner::{CameraSession, Decoders, LookupEmitter, ScannerConfig};
//!
//! let config = ScannerConfig::load_or_default(None);
//! let emitter = LookupEmitter::new(Arc::new(Catalog::seed()), ui_emitter);
//!
//! let session = CameraSession::new(
//!     backend,
//!     sink,
//!     Decoders::new(qr_decoder, barcode_decoder),
//!     Arc::new(emitter),
//!     config,
//! );
//!
//! if session.start().await == CameraStatus::Failed {
//!     show_error(session.last_error());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod decoder;
pub mod device;
pub mod error;
pub mod events;
pub mod manual;
pub mod scan_loop;
pub mod session;
pub mod status;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CameraSettings, ScanSettings, ScannerConfig};
pub use decoder::{BarcodeDecoder, Decoders, EncodedSnapshot, FrameBuffer, FrameSize, Polarity, QrDecoder};
pub use device::{CameraBackend, CameraConstraints, DimensionRange, FacingMode, MediaStream, VideoSink};
pub use error::{CameraError, CameraErrorKind, ScanError, ScannerResult};
pub use events::{LookupEmitter, NoOpEmitter, ScanEventEmitter};
pub use manual::ManualEntry;
pub use scan_loop::{ScanGate, ScanLoop, ScanLoopHandle};
pub use session::{CameraSession, ReleaseReason};
pub use status::CameraStatus;
