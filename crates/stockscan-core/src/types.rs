//! # Domain Types
//!
//! Core domain types used throughout StockScan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   ScanResult    │   │   StockLevel    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  barcode (key)  │   │  payload        │   │  OutOfStock     │       │
//! │  │  name           │   │  source         │   │  Scarce / Low   │       │
//! │  │  category       │   │  scanned_at     │   │  Available      │       │
//! │  │  stock, price   │   └─────────────────┘   │  Plenty         │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Category     │   │   ScanSource    │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Beverage ...   │   │  Camera(Qr)     │                             │
//! │  │  Whisky (high   │   │  Camera(Multi)  │                             │
//! │  │   value)        │   │  Manual         │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Single-Key Identity
//! Products are keyed by barcode alone. The catalog guarantees at most one
//! product per barcode; there is no surrogate id because nothing is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Beverage,
    Snack,
    Food,
    Confectionery,
    FrozenFood,
    Bakery,
    /// Premium spirits. Stock thresholds are tighter for this category.
    Whisky,
}

impl Category {
    /// High-value categories use tighter stock thresholds and are flagged
    /// as premium in the product view.
    #[inline]
    pub const fn is_high_value(&self) -> bool {
        matches!(self, Category::Whisky)
    }

    /// Display glyph for the product view.
    pub const fn icon(&self) -> &'static str {
        match self {
            Category::Whisky => "🥃",
            Category::Beverage => "🥤",
            Category::Food => "🍱",
            Category::Snack => "🍿",
            Category::Confectionery => "🍫",
            Category::FrozenFood => "🧊",
            Category::Bakery => "🍞",
        }
    }

    /// Unit word used next to stock counts ("2 bottles", "120 items").
    pub const fn unit_label(&self) -> &'static str {
        if self.is_high_value() {
            "bottles"
        } else {
            "items"
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Beverage => write!(f, "beverage"),
            Category::Snack => write!(f, "snack"),
            Category::Food => write!(f, "food"),
            Category::Confectionery => write!(f, "confectionery"),
            Category::FrozenFood => write!(f, "frozen_food"),
            Category::Bakery => write!(f, "bakery"),
            Category::Whisky => write!(f, "whisky"),
        }
    }
}

// =============================================================================
// Stock Level
// =============================================================================

/// Coarse stock classification shown next to a product.
///
/// ## Thresholds
/// ```text
/// ┌──────────────────────┬───────────┬──────────────┬──────────┐
/// │ Category             │ Low below │ Medium below │ Else     │
/// ├──────────────────────┼───────────┼──────────────┼──────────┤
/// │ high value (whisky)  │ 3 Scarce  │ 10 Available │ Plenty   │
/// │ everything else      │ 10 Low    │ 30 Available │ Plenty   │
/// └──────────────────────┴───────────┴──────────────┴──────────┘
/// stock == 0 is always OutOfStock.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    /// Low stock of a high-value item.
    Scarce,
    Low,
    Available,
    Plenty,
}

impl StockLevel {
    const LOW_THRESHOLD: u32 = 10;
    const MEDIUM_THRESHOLD: u32 = 30;
    const HIGH_VALUE_LOW_THRESHOLD: u32 = 3;
    const HIGH_VALUE_MEDIUM_THRESHOLD: u32 = 10;

    /// Classifies a stock count for the given category.
    pub fn classify(stock: u32, category: Category) -> Self {
        let high_value = category.is_high_value();
        let (low, medium) = if high_value {
            (Self::HIGH_VALUE_LOW_THRESHOLD, Self::HIGH_VALUE_MEDIUM_THRESHOLD)
        } else {
            (Self::LOW_THRESHOLD, Self::MEDIUM_THRESHOLD)
        };

        if stock == 0 {
            StockLevel::OutOfStock
        } else if stock < low {
            if high_value {
                StockLevel::Scarce
            } else {
                StockLevel::Low
            }
        } else if stock < medium {
            StockLevel::Available
        } else {
            StockLevel::Plenty
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            StockLevel::OutOfStock => "Out of stock",
            StockLevel::Scarce => "Scarce",
            StockLevel::Low => "Low stock",
            StockLevel::Available => "In stock",
            StockLevel::Plenty => "Plenty in stock",
        }
    }

    /// Whether at least one unit can be handed over.
    #[inline]
    pub const fn is_available(&self) -> bool {
        !matches!(self, StockLevel::OutOfStock)
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entry. Referenced by the scanner, never owned or mutated by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Barcode (EAN-13, JAN, QR payload, ...). Unique key in the catalog.
    pub barcode: String,

    /// Display name.
    pub name: String,

    pub category: Category,

    /// Units on hand.
    pub stock: u32,

    /// Unit price.
    pub price: Money,

    /// Optional description for product details.
    #[serde(default)]
    pub description: Option<String>,
}

impl Product {
    /// Creates a product without a description.
    pub fn new(
        barcode: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        stock: u32,
        price: Money,
    ) -> Self {
        Product {
            barcode: barcode.into(),
            name: name.into(),
            category,
            stock,
            price,
            description: None,
        }
    }

    /// Builder-style description setter.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the stock classification for this product.
    #[inline]
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.stock, self.category)
    }

    /// Premium items get a highlighted card in the product view.
    #[inline]
    pub fn is_premium(&self) -> bool {
        self.category.is_high_value()
    }

    /// Value of the units on hand (price × stock).
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price * self.stock
    }
}

// =============================================================================
// Scan Source
// =============================================================================

/// Which decode strategy produced a camera payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStrategy {
    /// QR-optimized decode over raw pixels.
    Qr,
    /// Multi-symbology decode (EAN/JAN, UPC, CODE-128, ...) over a snapshot.
    MultiFormat,
}

impl fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeStrategy::Qr => write!(f, "qr"),
            DecodeStrategy::MultiFormat => write!(f, "multi_format"),
        }
    }
}

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "kind", content = "strategy")]
pub enum ScanSource {
    Camera(DecodeStrategy),
    Manual,
}

impl ScanSource {
    /// The strategy that decoded a camera payload; `None` for manual entry.
    pub fn strategy(&self) -> Option<DecodeStrategy> {
        match self {
            ScanSource::Camera(strategy) => Some(*strategy),
            ScanSource::Manual => None,
        }
    }

    #[inline]
    pub fn is_camera(&self) -> bool {
        matches!(self, ScanSource::Camera(_))
    }
}

impl fmt::Display for ScanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanSource::Camera(strategy) => write!(f, "camera/{}", strategy),
            ScanSource::Manual => write!(f, "manual"),
        }
    }
}

// =============================================================================
// Scan Result
// =============================================================================

/// A decoded payload plus its source. Immutable once produced.
///
/// The payload is symbology-agnostic: catalog lookup only ever sees the
/// string, never the strategy that decoded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScanResult {
    payload: String,
    source: ScanSource,
    #[ts(as = "String")]
    scanned_at: DateTime<Utc>,
}

impl ScanResult {
    /// A payload produced by one of the camera decode strategies.
    pub fn camera(payload: impl Into<String>, strategy: DecodeStrategy) -> Self {
        ScanResult {
            payload: payload.into(),
            source: ScanSource::Camera(strategy),
            scanned_at: Utc::now(),
        }
    }

    /// A payload typed in by the user. Callers pass already-validated input
    /// (see `validation::validate_manual_payload`).
    pub fn manual(payload: impl Into<String>) -> Self {
        ScanResult {
            payload: payload.into(),
            source: ScanSource::Manual,
            scanned_at: Utc::now(),
        }
    }

    #[inline]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    #[inline]
    pub fn source(&self) -> ScanSource {
        self.source
    }

    #[inline]
    pub fn scanned_at(&self) -> DateTime<Utc> {
        self.scanned_at
    }

    /// Consumes the result, returning the payload.
    pub fn into_payload(self) -> String {
        self.payload
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_level_regular_thresholds() {
        assert_eq!(StockLevel::classify(0, Category::Food), StockLevel::OutOfStock);
        assert_eq!(StockLevel::classify(8, Category::Food), StockLevel::Low);
        assert_eq!(StockLevel::classify(10, Category::Food), StockLevel::Available);
        assert_eq!(StockLevel::classify(29, Category::Snack), StockLevel::Available);
        assert_eq!(StockLevel::classify(30, Category::Snack), StockLevel::Plenty);
        assert_eq!(StockLevel::classify(120, Category::Beverage), StockLevel::Plenty);
    }

    #[test]
    fn test_stock_level_high_value_thresholds() {
        assert_eq!(StockLevel::classify(0, Category::Whisky), StockLevel::OutOfStock);
        assert_eq!(StockLevel::classify(2, Category::Whisky), StockLevel::Scarce);
        assert_eq!(StockLevel::classify(5, Category::Whisky), StockLevel::Available);
        assert_eq!(StockLevel::classify(10, Category::Whisky), StockLevel::Plenty);
    }

    #[test]
    fn test_product_helpers() {
        let product = Product::new(
            "4580617290019",
            "Ichiro's Malt",
            Category::Whisky,
            2,
            Money::from_yen(5_800),
        )
        .with_description("Chichibu distillery single malt");

        assert!(product.is_premium());
        assert_eq!(product.stock_level(), StockLevel::Scarce);
        assert_eq!(product.stock_value().yen(), 11_600);
        assert_eq!(product.category.unit_label(), "bottles");
        assert!(product.description.is_some());
    }

    #[test]
    fn test_scan_result_sources() {
        let camera = ScanResult::camera("4901085123456", DecodeStrategy::Qr);
        assert_eq!(camera.payload(), "4901085123456");
        assert_eq!(camera.source(), ScanSource::Camera(DecodeStrategy::Qr));
        assert_eq!(camera.source().to_string(), "camera/qr");

        let manual = ScanResult::manual("4901085123456");
        assert_eq!(manual.payload(), camera.payload());
        assert_eq!(manual.source().to_string(), "manual");
    }

    #[test]
    fn test_category_serde_rejects_unknown() {
        let parsed: Category = serde_json::from_str("\"frozen_food\"").unwrap();
        assert_eq!(parsed, Category::FrozenFood);
        assert!(serde_json::from_str::<Category>("\"furniture\"").is_err());
    }
}
