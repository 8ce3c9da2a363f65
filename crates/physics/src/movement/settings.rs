//! Character tunables and the fixed constants of the sweep resolvers.
//!
//! All values use metric units (meters, seconds, radians).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collision::{CollisionLayers, EntityId, QueryFilter};

/// Deepest recursion either resolver will reach before truncating.
pub const MAX_RECURSION_DEPTH: u32 = 10;

/// Displacements shorter than this are treated as zero (meters).
pub const MIN_MOVE_DISTANCE: f32 = 1.0e-5;

/// Downward sweep used when a zero displacement is swept only to find
/// and resolve an existing overlap (meters).
pub const DEPENETRATION_SWEEP_DISTANCE: f32 = 1.0e-3;

/// Extra distance added to the penetration depth when pushing out (meters).
pub const SEPARATION_DISTANCE: f32 = 5.0e-3;

/// Tail appended to every downward sweep so a floor right below the
/// character is still detected for classification (meters).
pub const FLOOR_DETECTION_SLACK: f32 = 0.05;

/// Half-length of the ray used to refine a capsule floor contact (meters).
pub const FLOOR_RAY_REACH: f32 = 0.05;

/// Errors raised by [`Settings::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("gravity must be finite and non-negative, got {0}")]
    InvalidGravity(f32),

    #[error("step height must be finite and non-negative, got {0}")]
    InvalidStepHeight(f32),

    #[error("max slope angle must be in (0, pi/2], got {0} rad")]
    InvalidSlopeAngle(f32),

    #[error("wall slide angle must be in [0, pi/2), got {0} rad")]
    InvalidWallSlideAngle(f32),
}

/// Per-character tunables, read-only during a move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gravitational acceleration magnitude (meters/second²).
    pub gravity: f32,

    /// Tallest obstacle climbed without being treated as a wall (meters).
    pub step_height: f32,

    /// Steepest navigable floor, measured from the up axis (radians).
    pub max_slope_angle: f32,

    /// Minimum angle between a wall normal and the reversed movement
    /// direction for the character to slide instead of stopping (radians).
    pub wall_slide_angle: f32,

    /// Layers the character collides with.
    pub layers: CollisionLayers,

    /// Entities the character passes through.
    pub ignored_entities: Vec<EntityId>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            step_height: 0.35,
            max_slope_angle: 45f32.to_radians(),
            wall_slide_angle: 10f32.to_radians(),
            layers: CollisionLayers::MASK_CHARACTER_MOVE,
            ignored_entities: Vec::new(),
        }
    }
}

impl Settings {
    /// Check every value is usable by the resolvers.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(SettingsError::InvalidGravity(self.gravity));
        }
        if !self.step_height.is_finite() || self.step_height < 0.0 {
            return Err(SettingsError::InvalidStepHeight(self.step_height));
        }
        if !(self.max_slope_angle > 0.0 && self.max_slope_angle <= std::f32::consts::FRAC_PI_2) {
            return Err(SettingsError::InvalidSlopeAngle(self.max_slope_angle));
        }
        if !(self.wall_slide_angle >= 0.0 && self.wall_slide_angle < std::f32::consts::FRAC_PI_2) {
            return Err(SettingsError::InvalidWallSlideAngle(self.wall_slide_angle));
        }
        Ok(())
    }

    /// Filter for queries issued on behalf of `character`.
    pub fn query_filter(&self, character: EntityId) -> QueryFilter {
        QueryFilter::new(self.layers)
            .ignoring_all(self.ignored_entities.iter().copied())
            .ignoring(character)
    }
}
