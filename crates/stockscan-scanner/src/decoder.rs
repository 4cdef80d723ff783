//! # Decoder Capability
//!
//! The frame buffer shared by both decode strategies, and the traits the
//! external decoders implement. Decoding itself is not done here.
//!
//! ## Strategies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Per-Tick Decode Order                             │
//! │                                                                         │
//! │  FrameBuffer (RGBA, reused across ticks)                               │
//! │       │                                                                 │
//! │       ├──► (a) QrDecoder::decode(buffer, Normal)     synchronous       │
//! │       ├──► (a) QrDecoder::decode(buffer, Inverted)   synchronous       │
//! │       │        hit? ──► done, (b) never starts                         │
//! │       │                                                                 │
//! │       └──► encode_png() ──► EncodedSnapshot                            │
//! │                 │                                                       │
//! │                 └──► (b) BarcodeDecoder::decode(snapshot)  async       │
//! │                          EAN/JAN-13, EAN-8, UPC-A/E, CODE-128/39, ...  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use futures_util::future::BoxFuture;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageResult};

/// Bytes per RGBA pixel.
const CHANNELS: usize = 4;

// =============================================================================
// Frame Buffer
// =============================================================================

/// Width × height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        FrameSize { width, height }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * CHANNELS
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Reusable RGBA image buffer sized to the source's native resolution.
///
/// The allocation is kept between ticks and only resized when the source
/// resolution changes (e.g. the phone rotates).
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    size: FrameSize,
    data: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resizes to `size` if it differs from the current size.
    ///
    /// Returns true when a resize happened.
    pub fn ensure_size(&mut self, size: FrameSize) -> bool {
        if self.size == size {
            return false;
        }
        self.size = size;
        self.data.resize(size.byte_len(), 0);
        true
    }

    #[inline]
    pub fn size(&self) -> FrameSize {
        self.size
    }

    /// Raw RGBA bytes, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Encodes the current frame as PNG for the multi-format strategy.
    pub fn encode_png(&self) -> ImageResult<EncodedSnapshot> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes).write_image(
            &self.data,
            self.size.width,
            self.size.height,
            ColorType::Rgba8,
        )?;
        Ok(EncodedSnapshot {
            size: self.size,
            bytes,
        })
    }
}

/// An encoded (PNG) copy of one frame. Owned, so it can outlive the tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSnapshot {
    pub size: FrameSize,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Decoder Traits
// =============================================================================

/// Polarity of the symbol relative to its background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Dark modules on a light background.
    Normal,
    /// Light modules on a dark background (e.g. printed on a dark label).
    Inverted,
}

impl Polarity {
    /// Attempt order within one tick.
    pub const ALL: [Polarity; 2] = [Polarity::Normal, Polarity::Inverted];
}

/// QR-optimized decoder over raw pixels. Synchronous.
pub trait QrDecoder: Send + Sync {
    /// Returns the payload, or `None` when no symbol is found.
    fn decode(&self, frame: &FrameBuffer, polarity: Polarity) -> Option<String>;
}

/// Multi-symbology decoder over an encoded snapshot. Asynchronous.
pub trait BarcodeDecoder: Send + Sync {
    /// Resolves to the payload, or `None` when no symbol is found. Decoder
    /// failures are folded into `None`: a miss is the steady state.
    fn decode(&self, snapshot: EncodedSnapshot) -> BoxFuture<'static, Option<String>>;
}

/// Both strategies, in priority order.
#[derive(Clone)]
pub struct Decoders {
    pub qr: Arc<dyn QrDecoder>,
    pub barcode: Arc<dyn BarcodeDecoder>,
}

impl Decoders {
    pub fn new(qr: Arc<dyn QrDecoder>, barcode: Arc<dyn BarcodeDecoder>) -> Self {
        Decoders { qr, barcode }
    }
}
