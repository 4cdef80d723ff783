//! # Camera Device Abstractions
//!
//! Traits for the platform pieces a `CameraSession` drives: the camera
//! backend that hands out streams, the stream itself, and the video sink
//! the stream is rendered into for sampling.
//!
//! ## Who Implements What
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Platform Seams                                  │
//! │                                                                         │
//! │  CameraBackend ──acquire(constraints)──► Box<dyn MediaStream>          │
//! │   (getUserMedia in the browser build)         │                         │
//! │                                               │ attach                  │
//! │                                               ▼                         │
//! │  VideoSink  ◄────────────────────────── stream bound to the sink       │
//! │   (a <video> element + offscreen canvas)                               │
//! │   • wait_ready()      loadedmetadata / error                           │
//! │   • play()                                                             │
//! │   • has_full_frame()  readyState == HAVE_ENOUGH_DATA                   │
//! │   • capture(buffer)   drawImage + getImageData                         │
//! │   • detach()          srcObject = null                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::decoder::{FrameBuffer, FrameSize};
use crate::error::CameraError;

// =============================================================================
// Constraints
// =============================================================================

/// Which physical camera to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Rear camera on phones; the one pointed at the shelf.
    #[default]
    Environment,
    /// Front camera.
    User,
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::Environment => write!(f, "environment"),
            FacingMode::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for FacingMode {
    type Err = crate::error::ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "environment" | "rear" | "back" => Ok(FacingMode::Environment),
            "user" | "front" => Ok(FacingMode::User),
            other => Err(crate::error::ScanError::InvalidConfig(format!(
                "Unknown facing mode: '{}'. Valid options: environment, user",
                other
            ))),
        }
    }
}

/// An ideal value with a hard cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRange {
    pub ideal: u32,
    pub max: u32,
}

/// Camera-access request constraints.
///
/// The resolution cap bounds the per-frame decode cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    /// `None` means no preference (minimal probe).
    pub facing: Option<FacingMode>,
    pub width: Option<DimensionRange>,
    pub height: Option<DimensionRange>,
    /// Always false for scanning; kept explicit so backends don't guess.
    pub audio: bool,
}

impl CameraConstraints {
    /// Rear camera, ideal 640×480, capped at 1280×720, no audio.
    pub const fn preferred() -> Self {
        CameraConstraints {
            facing: Some(FacingMode::Environment),
            width: Some(DimensionRange {
                ideal: 640,
                max: 1280,
            }),
            height: Some(DimensionRange {
                ideal: 480,
                max: 720,
            }),
            audio: false,
        }
    }

    /// Video only, no preferences. Used to re-trigger a permission prompt.
    pub const fn minimal() -> Self {
        CameraConstraints {
            facing: None,
            width: None,
            height: None,
            audio: false,
        }
    }

    #[inline]
    pub fn is_minimal(&self) -> bool {
        self.facing.is_none() && self.width.is_none() && self.height.is_none()
    }
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self::preferred()
    }
}

// =============================================================================
// Platform Traits
// =============================================================================

/// Hands out live camera streams.
pub trait CameraBackend: Send + Sync {
    /// Requests camera access. Resolves once the platform grants or refuses.
    fn acquire(
        &self,
        constraints: CameraConstraints,
    ) -> BoxFuture<'static, Result<Box<dyn MediaStream>, CameraError>>;
}

/// A live stream. Exclusively owned by one `CameraSession`.
pub trait MediaStream: Send {
    /// Platform identifier, for logs.
    fn id(&self) -> &str;

    /// Stops every track of the stream, turning the camera off.
    fn stop_tracks(&mut self);
}

/// The surface a stream is rendered into for sampling.
pub trait VideoSink: Send {
    /// Binds the stream to the sink.
    fn attach(&mut self, stream: &dyn MediaStream) -> Result<(), CameraError>;

    /// Resolves when the sink has loaded enough to begin playback, or with
    /// `CameraError::SinkAttach` if the sink reports an error.
    fn wait_ready(&mut self) -> BoxFuture<'static, Result<(), CameraError>>;

    /// Starts playback.
    fn play(&mut self) -> Result<(), CameraError>;

    /// Whether a complete frame is buffered and safe to sample.
    fn has_full_frame(&self) -> bool;

    /// Native resolution of the current frame.
    fn frame_size(&self) -> FrameSize;

    /// Copies the current frame into `buffer`, which has already been sized
    /// to `frame_size()`.
    fn capture(&mut self, buffer: &mut FrameBuffer);

    /// Unbinds the stream. Idempotent.
    fn detach(&mut self);
}
