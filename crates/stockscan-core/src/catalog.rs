//! # Catalog
//!
//! The in-memory product catalog, keyed by barcode.
//!
//! ## Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How a Scan Becomes a Product                         │
//! │                                                                         │
//! │  ScanResult { payload: "4901085123456" }                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Catalog::lookup  (exact match on barcode, no normalization)           │
//! │       │                                                                 │
//! │       ├── hit  ──► LookupOutcome::Found(Product)                       │
//! │       │                                                                 │
//! │       └── miss ──► LookupOutcome::NotFound { payload }                 │
//! │                    "No product for this code" (valid outcome)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog is static: it is built once from a seed list and never
//! mutated. Lookups are pure and synchronous.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Category, Product, ScanResult};
use crate::validation::validate_product;

// =============================================================================
// Lookup Outcome
// =============================================================================

/// Result of resolving a scanned payload against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum LookupOutcome {
    Found { product: Product },
    NotFound { payload: String },
}

impl LookupOutcome {
    /// Returns the matched product, if any.
    pub fn product(&self) -> Option<&Product> {
        match self {
            LookupOutcome::Found { product } => Some(product),
            LookupOutcome::NotFound { .. } => None,
        }
    }

    /// The payload that was looked up.
    pub fn payload(&self) -> &str {
        match self {
            LookupOutcome::Found { product } => &product.barcode,
            LookupOutcome::NotFound { payload } => payload,
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found { .. })
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Immutable product catalog.
///
/// ## Invariant
/// A barcode identifies at most one product. `Catalog::new` rejects seed
/// lists that violate this.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Products in insertion order (drives the product list view).
    products: Vec<Product>,

    /// barcode → index into `products`.
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, validating every record and the unique-key invariant.
    pub fn new(products: Vec<Product>) -> CoreResult<Self> {
        let mut index = HashMap::with_capacity(products.len());

        for (i, product) in products.iter().enumerate() {
            validate_product(product)?;
            if index.insert(product.barcode.clone(), i).is_some() {
                return Err(ValidationError::Duplicate {
                    field: "barcode".to_string(),
                    value: product.barcode.clone(),
                }
                .into());
            }
        }

        Ok(Catalog { products, index })
    }

    /// Exact-match lookup by barcode. Pure, no side effects.
    ///
    /// ## Example
    /// ```rust
    /// use stockscan_core::Catalog;
    ///
    /// let catalog = Catalog::seed();
    /// let cola = catalog.find_by_barcode("4901085123456").unwrap();
    /// assert_eq!(cola.stock, 120);
    /// assert!(catalog.find_by_barcode("0000000000000").is_none());
    /// ```
    pub fn find_by_barcode(&self, payload: &str) -> Option<&Product> {
        self.index.get(payload).map(|&i| &self.products[i])
    }

    /// Like `find_by_barcode`, but a miss is an error.
    pub fn get(&self, barcode: &str) -> CoreResult<&Product> {
        self.find_by_barcode(barcode)
            .ok_or_else(|| CoreError::ProductNotFound(barcode.to_string()))
    }

    /// Resolves a scan into a lookup outcome.
    pub fn lookup(&self, scan: &ScanResult) -> LookupOutcome {
        match self.find_by_barcode(scan.payload()) {
            Some(product) => LookupOutcome::Found {
                product: product.clone(),
            },
            None => LookupOutcome::NotFound {
                payload: scan.payload().to_string(),
            },
        }
    }

    /// Products in catalog order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Total value of the stock on hand across the catalog.
    pub fn total_value(&self) -> Money {
        self.products.iter().map(Product::stock_value).sum()
    }

    /// The built-in seed catalog used by the kiosk build and tests.
    pub fn seed() -> Self {
        Catalog::new(seed_products()).expect("seed catalog has unique, valid barcodes")
    }
}

// =============================================================================
// Seed Data
// =============================================================================

/// (barcode, name, category, stock, price, description)
type SeedRow = (
    &'static str,
    &'static str,
    Category,
    u32,
    u64,
    Option<&'static str>,
);

const SEED: &[SeedRow] = &[
    ("4901085123456", "Coca-Cola 500ml", Category::Beverage, 120, 150, None),
    ("4987654321098", "Potato Chips Lightly Salted", Category::Snack, 35, 198, None),
    ("4512345678901", "Onigiri Salmon", Category::Food, 8, 110, None),
    ("4901234567890", "Bottled Green Tea 600ml", Category::Beverage, 65, 140, None),
    ("4523456789012", "Chocolate Bar", Category::Confectionery, 22, 250, None),
    ("4534567890123", "Cup Ramen", Category::Food, 45, 180, None),
    ("4545678901234", "Vanilla Ice Cream", Category::FrozenFood, 12, 220, None),
    ("4556789012345", "Sliced Bread (6 slices)", Category::Bakery, 18, 160, None),
    (
        "4580617290019",
        "Ichiro's Malt",
        Category::Whisky,
        2,
        5_800,
        Some("Premium Japanese whisky from the Chichibu distillery"),
    ),
    (
        "4550182010466",
        "Ichiro's Malt Double Distilleries",
        Category::Whisky,
        1,
        12_000,
        Some("Limited release, rare Japanese whisky"),
    ),
    (
        "4550182010473",
        "Ichiro's Malt & Grain",
        Category::Whisky,
        5,
        3_200,
        Some("Well-balanced blended whisky"),
    ),
    (
        "4904230123789",
        "Yamazaki 12 Year",
        Category::Whisky,
        0,
        28_000,
        Some("Suntory's flagship single malt (out of stock)"),
    ),
    (
        "4904230123796",
        "Hakushu NV",
        Category::Whisky,
        2,
        8_500,
        Some("Single malt from the forest distillery"),
    ),
    (
        "4562225451689",
        "Nikka Yoichi NV",
        Category::Whisky,
        4,
        7_200,
        Some("Single malt from the Yoichi distillery, Hokkaido"),
    ),
];

fn seed_products() -> Vec<Product> {
    SEED.iter()
        .map(|&(barcode, name, category, stock, price, description)| {
            let product = Product::new(barcode, name, category, stock, Money::from_yen(price));
            match description {
                Some(d) => product.with_description(d),
                None => product,
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
