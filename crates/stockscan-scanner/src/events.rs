//! # Scan Events
//!
//! The seam between the acquisition pipeline and the presentation layer.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Events to the Presentation Layer                 │
//! │                                                                         │
//! │  CameraSession ──emit_status──► status badge + hint                    │
//! │                ──emit_error───► error banner (+ retry permission)      │
//! │                                                                         │
//! │  ScanLoop / ManualEntry ──emit_scan──► onScan(payload)                 │
//! │                                  │      at most once per session       │
//! │                                  ▼                                      │
//! │                         LookupEmitter (optional wrapper)               │
//! │                                  │ Catalog::lookup                      │
//! │                                  ▼                                      │
//! │                         ──emit_lookup──► product card / "no product"   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tracing::{debug, info};

use stockscan_core::{Catalog, LookupOutcome, ScanResult};

use crate::error::CameraError;
use crate::status::CameraStatus;

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Receives session events. Implemented by the presentation layer.
///
/// Calls may arrive from the scan loop's task, so implementations must be
/// `Send + Sync` and must not block. Events are emitted after the session
/// drops its state lock, so a callback may read `status()` or
/// `last_error()`.
pub trait ScanEventEmitter: Send + Sync {
    /// Lifecycle status changed.
    fn emit_status(&self, status: CameraStatus);

    /// An attempt failed. Followed by `emit_status(Failed)`.
    fn emit_error(&self, error: &CameraError);

    /// A payload was produced (the `onScan` callback).
    fn emit_scan(&self, result: &ScanResult);

    /// A payload was resolved against the catalog.
    fn emit_lookup(&self, _outcome: &LookupOutcome) {}
}

/// No-op event emitter for testing.
pub struct NoOpEmitter;

impl ScanEventEmitter for NoOpEmitter {
    fn emit_status(&self, _status: CameraStatus) {}
    fn emit_error(&self, _error: &CameraError) {}
    fn emit_scan(&self, _result: &ScanResult) {}
}

impl<T: ScanEventEmitter + ?Sized> ScanEventEmitter for Arc<T> {
    fn emit_status(&self, status: CameraStatus) {
        (**self).emit_status(status);
    }

    fn emit_error(&self, error: &CameraError) {
        (**self).emit_error(error);
    }

    fn emit_scan(&self, result: &ScanResult) {
        (**self).emit_scan(result);
    }

    fn emit_lookup(&self, outcome: &LookupOutcome) {
        (**self).emit_lookup(outcome);
    }
}

// =============================================================================
// Lookup Emitter
// =============================================================================

/// Wraps a presentation emitter and resolves every scan against the catalog
/// before forwarding it.
pub struct LookupEmitter<E> {
    catalog: Arc<Catalog>,
    inner: E,
}

impl<E: ScanEventEmitter> LookupEmitter<E> {
    pub fn new(catalog: Arc<Catalog>, inner: E) -> Self {
        LookupEmitter { catalog, inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: ScanEventEmitter> ScanEventEmitter for LookupEmitter<E> {
    fn emit_status(&self, status: CameraStatus) {
        self.inner.emit_status(status);
    }

    fn emit_error(&self, error: &CameraError) {
        self.inner.emit_error(error);
    }

    fn emit_scan(&self, result: &ScanResult) {
        self.inner.emit_scan(result);

        let outcome = self.catalog.lookup(result);
        match outcome.product() {
            Some(product) => info!(
                barcode = %product.barcode,
                name = %product.name,
                stock = product.stock,
                source = %result.source(),
                "Catalog hit"
            ),
            None => debug!(payload = %result.payload(), "No product for this code"),
        }
        self.inner.emit_lookup(&outcome);
    }

    fn emit_lookup(&self, outcome: &LookupOutcome) {
        self.inner.emit_lookup(outcome);
    }
}
