//! # Manual Entry
//!
//! Typed-in payloads for when the camera is unavailable or denied. Available
//! regardless of camera status; holds no camera state.
//!
//! ```text
//! "  4901085123456 " ──► submit ──► ScanResult { "4901085123456", Manual }
//!                                        │
//!                                        └──► emit_scan (same hook as camera)
//! "   "              ──► submit ──► Err(Required)
//! ```

use tracing::{debug, info};

use stockscan_core::validation::validate_manual_payload;
use stockscan_core::{ScanResult, ValidationError};

use crate::events::ScanEventEmitter;

/// Validated pass-through into the scan-result hook.
pub struct ManualEntry;

impl ManualEntry {
    /// Trims and validates `input`. Rejects empty and whitespace-only input.
    pub fn submit(input: &str) -> Result<ScanResult, ValidationError> {
        match validate_manual_payload(input) {
            Ok(payload) => Ok(ScanResult::manual(payload)),
            Err(e) => {
                debug!(error = %e, "Manual entry rejected");
                Err(e)
            }
        }
    }

    /// Validates `input` and delivers it through `emitter`.
    pub fn deliver(
        input: &str,
        emitter: &dyn ScanEventEmitter,
    ) -> Result<ScanResult, ValidationError> {
        let result = Self::submit(input)?;
        info!(payload = %result.payload(), "Manual entry submitted");
        emitter.emit_scan(&result);
        Ok(result)
    }
}
