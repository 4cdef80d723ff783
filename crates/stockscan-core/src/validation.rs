//! # Validation Module
//!
//! Input validation for payloads and catalog records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Payloads Come From                           │
//! │                                                                         │
//! │  Camera decode ──► payload string ─────────────────┐                   │
//! │  (decoder output, passed through untouched)        │                   │
//! │                                                     ▼                   │
//! │  Manual entry ──► validate_manual_payload() ──► ScanResult ──► lookup  │
//! │  (trimmed, empty/whitespace rejected)                                  │
//! │                                                                         │
//! │  Seed data ──► validate_product() ──► Catalog::new                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockscan_core::validation::validate_manual_payload;
//!
//! assert_eq!(validate_manual_payload("  4901085123456 ").unwrap(), "4901085123456");
//! assert!(validate_manual_payload("   ").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest barcode accepted as a catalog key. Scanned and typed payloads are
/// not capped; they simply miss the catalog.
pub const MAX_PAYLOAD_LEN: usize = 128;

/// Longest product name accepted into the catalog.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// Payload Validators
// =============================================================================

/// Validates a barcode key.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `MAX_PAYLOAD_LEN` characters
/// - No control characters
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    check_payload("barcode", barcode).map(|_| ())
}

/// Validates free-text input from the manual-entry fallback.
///
/// Only blank input is rejected, so a typed payload is accepted whenever
/// the same string decoded by the camera would be.
///
/// ## Returns
/// The trimmed payload, ready to be wrapped in a `ScanResult`.
///
/// ## User Workflow
/// ```text
/// User types "  4901085123456 " ──► validate_manual_payload ──► "4901085123456"
/// User types "   "               ──► Err(Required)  (button stays disabled)
/// ```
pub fn validate_manual_payload(input: &str) -> ValidationResult<String> {
    require_non_blank("payload", input).map(str::to_string)
}

fn require_non_blank<'a>(field: &str, raw: &'a str) -> ValidationResult<&'a str> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value)
}

fn check_payload<'a>(field: &str, raw: &'a str) -> ValidationResult<&'a str> {
    let value = require_non_blank(field, raw)?;

    if value.chars().count() > MAX_PAYLOAD_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_PAYLOAD_LEN,
        });
    }

    if value.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(value)
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a catalog record before it is indexed.
///
/// Stock and price are unsigned types, so non-negativity holds by
/// construction; only the string fields need checking.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_barcode(&product.barcode)?;
    if product.barcode.trim() != product.barcode {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must not have leading or trailing whitespace".to_string(),
        });
    }
    validate_product_name(&product.name)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
