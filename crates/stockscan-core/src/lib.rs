//! # stockscan-core: Pure Domain Logic for StockScan
//!
//! This crate holds everything about the inventory lookup that does not
//! touch a camera, a timer or a decoder: products, the catalog, payload
//! validation and price formatting.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StockScan Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation Layer (browser)                    │   │
//! │  │   status badge ─► error + retry ─► manual entry ─► product card │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ScanEventEmitter                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockscan-scanner                               │   │
//! │  │   CameraSession ─► ScanLoop ─► decoders ─► ScanResult           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockscan-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  catalog  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Catalog  │  │  payloads │  │   │
//! │  │   │ScanResult │  │   (yen)   │  │  Lookup   │  │  records  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO ASYNC • NO CAMERA • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, StockLevel, ScanResult)
//! - [`money`] - Money type with integer arithmetic
//! - [`catalog`] - In-memory catalog and lookup outcome
//! - [`error`] - Domain error types
//! - [`validation`] - Payload and record validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockscan_core::{Catalog, ScanResult};
//! use stockscan_core::validation::validate_manual_payload;
//!
//! let catalog = Catalog::seed();
//! let payload = validate_manual_payload(" 4901085123456 ").unwrap();
//! let outcome = catalog.lookup(&ScanResult::manual(payload));
//!
//! let product = outcome.product().unwrap();
//! assert_eq!(product.stock, 120);
//! assert_eq!(product.price.to_string(), "¥150");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{Catalog, LookupOutcome};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
