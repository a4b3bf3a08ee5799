// Error types for the synchronization core
// None of these are fatal: callers turn them into status messages

use crate::events::SurfaceId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Content could not be read or is not a supported image/animation
    #[error("failed to load content {}: {reason}", path.display())]
    ContentDecodeFailure { path: PathBuf, reason: String },

    /// Scale factor was non-positive, not finite, or outside the allowed range
    #[error("invalid scale factor {0}")]
    InvalidScaleFactor(f32),

    /// Refresh interval must be a positive duration
    #[error("refresh interval must be greater than zero")]
    InvalidRefreshInterval,

    /// Batch window requests must be within 1..=99
    #[error("cannot open {0} windows (allowed: 1-99)")]
    InvalidWindowCount(usize),

    #[error("no surface with id {0}")]
    UnknownSurface(SurfaceId),
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
