// Global settings module
// The coordinator owns the canonical copy and pushes it to every surface

use crate::error::{Result, SyncError};
use crate::timer::RefreshRate;
use std::time::Duration;

/// Smallest global scale the manager allows
pub const MIN_SCALE: f32 = 0.25;
/// Largest global scale the manager allows
pub const MAX_SCALE: f32 = 4.0;

/// Whether a surface takes part in drag synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowPolicy {
    /// Dragging this surface moves only this window
    Independent,
    /// Dragging this surface publishes its content position to the peers
    #[default]
    FollowsManagerPosition,
}

impl FollowPolicy {
    pub fn from_flag(follow_window: bool) -> Self {
        if follow_window {
            FollowPolicy::FollowsManagerPosition
        } else {
            FollowPolicy::Independent
        }
    }

    pub fn participates(&self) -> bool {
        matches!(self, FollowPolicy::FollowsManagerPosition)
    }
}

/// Everything the manager window controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub scale: f32,
    pub follow_policy: FollowPolicy,
    pub keep_centered: bool,
    pub refresh_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            follow_policy: FollowPolicy::FollowsManagerPosition,
            keep_centered: false,
            refresh_interval: RefreshRate::Fast.interval(),
        }
    }
}

impl Settings {
    /// Check the values a surface would otherwise reject one by one
    pub fn validate(&self) -> Result<()> {
        validate_global_scale(self.scale)?;
        if self.refresh_interval.is_zero() {
            return Err(SyncError::InvalidRefreshInterval);
        }
        Ok(())
    }
}

/// A scale usable by a single surface: finite and strictly positive
pub fn validate_scale(factor: f32) -> Result<f32> {
    if factor.is_finite() && factor > 0.0 {
        Ok(factor)
    } else {
        Err(SyncError::InvalidScaleFactor(factor))
    }
}

/// A scale accepted by the manager slider
pub fn validate_global_scale(factor: f32) -> Result<f32> {
    let factor = validate_scale(factor)?;
    if (MIN_SCALE..=MAX_SCALE).contains(&factor) {
        Ok(factor)
    } else {
        Err(SyncError::InvalidScaleFactor(factor))
    }
}
