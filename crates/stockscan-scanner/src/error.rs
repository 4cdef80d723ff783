//! # Scanner Error Types
//!
//! Error types for camera acquisition and scanner configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Scanner Error Categories                           │
//! │                                                                         │
//! │  ┌───────────────────────────────┐  ┌───────────────────────────────┐  │
//! │  │  CameraError (acquisition)    │  │  ScanError (crate plumbing)   │  │
//! │  │                               │  │                               │  │
//! │  │  PermissionDenied  → retry UI │  │  InvalidConfig                │  │
//! │  │  DeviceNotFound               │  │  ConfigLoadFailed             │  │
//! │  │  Unsupported                  │  │  ConfigSaveFailed             │  │
//! │  │  Media                        │  │  Camera(CameraError)          │  │
//! │  │  SinkAttach                   │  │  Validation(...)              │  │
//! │  │  Unresponsive (timeout)       │  │                               │  │
//! │  └───────────────────────────────┘  └───────────────────────────────┘  │
//! │                                                                         │
//! │  CameraError never escapes a session as a panic or an Err: it is       │
//! │  converted into CameraStatus::Failed + a user-facing message.          │
//! │  A decode miss is not an error at all.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use stockscan_core::ValidationError;

/// Result type alias for scanner plumbing.
pub type ScannerResult<T> = Result<T, ScanError>;

// =============================================================================
// Camera Error
// =============================================================================

/// Classified camera acquisition failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// The user or browser policy refused camera access.
    #[error("Camera access denied")]
    PermissionDenied,

    /// No camera matched the request.
    #[error("No camera device found")]
    DeviceNotFound,

    /// The environment has no camera capability at all.
    #[error("Camera is not supported in this environment")]
    Unsupported,

    /// Any other acquisition failure reported by the platform.
    #[error("Camera error: {0}")]
    Media(String),

    /// The video sink rejected the stream or reported an error while loading.
    #[error("Video sink error: {0}")]
    SinkAttach(String),

    /// The sink never reported buffered data within the readiness timeout.
    #[error("Camera did not become ready within {waited_ms} ms")]
    Unresponsive { waited_ms: u64 },
}

impl CameraError {
    /// Message for the error banner.
    pub fn user_message(&self) -> String {
        match self {
            CameraError::PermissionDenied => {
                "Camera permission is required. Allow camera access in your browser settings."
                    .to_string()
            }
            CameraError::DeviceNotFound => "No camera was found.".to_string(),
            CameraError::Unsupported => "This browser does not support camera access.".to_string(),
            CameraError::Media(detail) => format!("Camera error: {}", detail),
            CameraError::SinkAttach(detail) => format!("Could not start the video: {}", detail),
            CameraError::Unresponsive { .. } => {
                "The camera is not responding. Try again or use manual entry.".to_string()
            }
        }
    }

    /// Permission denial gets an extra "retry permission" control that
    /// re-issues a minimal-constraint request.
    #[inline]
    pub fn offers_permission_retry(&self) -> bool {
        matches!(self, CameraError::PermissionDenied)
    }

    pub fn kind(&self) -> CameraErrorKind {
        match self {
            CameraError::PermissionDenied => CameraErrorKind::PermissionDenied,
            CameraError::DeviceNotFound => CameraErrorKind::DeviceNotFound,
            CameraError::Unsupported => CameraErrorKind::Unsupported,
            CameraError::Media(_) => CameraErrorKind::Media,
            CameraError::SinkAttach(_) => CameraErrorKind::SinkAttach,
            CameraError::Unresponsive { .. } => CameraErrorKind::Unresponsive,
        }
    }

    /// Maps a platform error name (`DOMException.name` in the browser build)
    /// to the taxonomy.
    pub fn from_platform_name(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "SecurityError" => CameraError::PermissionDenied,
            "NotFoundError" | "OverconstrainedError" => CameraError::DeviceNotFound,
            "NotSupportedError" => CameraError::Unsupported,
            _ => CameraError::Media(message.to_string()),
        }
    }
}

/// Fieldless mirror of `CameraError` for the presentation payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CameraErrorKind {
    PermissionDenied,
    DeviceNotFound,
    Unsupported,
    Media,
    SinkAttach,
    Unresponsive,
}

// =============================================================================
// Scan Error
// =============================================================================

/// Errors from scanner plumbing outside a camera attempt.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Invalid scanner configuration.
    #[error("Invalid scanner configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Camera failure surfaced outside a session (e.g. from a one-shot probe).
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// Rejected manual input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ScanError {
    fn from(err: toml::de::Error) -> Self {
        ScanError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ScanError {
    fn from(err: toml::ser::Error) -> Self {
        ScanError::ConfigSaveFailed(err.to_string())
    }
}

impl ScanError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidConfig(_)
                | ScanError::ConfigLoadFailed(_)
                | ScanError::ConfigSaveFailed(_)
        )
    }
}
