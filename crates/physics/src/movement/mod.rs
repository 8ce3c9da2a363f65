//! Character movement built on sweeps.
//!
//! A move runs in two passes against one snapshot of the scene:
//!
//! - the horizontal pass sweeps an upright cylinder along the desired
//!   displacement, pushing out of overlaps and sliding along floors and
//!   walls;
//! - the vertical pass sweeps the full capsule for gravity, lands on
//!   ledges up to the step height and classifies the floor.
//!
//! # Design
//!
//! Both passes are plain bounded recursion over a [`SweepContext`]. The
//! [`CharacterController`] owns the per-character [`CharacterRuntimeState`]
//! and is the only place that touches the body or the scene lock.

mod body;
mod context;
mod controller;
mod geometry;
mod horizontal;
mod move_result;
mod observer;
mod settings;
mod state;
mod vertical;

use glam::Vec3;

/// World up axis.
pub const UP: Vec3 = Vec3::Z;

pub use body::{CapsuleShape, CharacterBody, KinematicBody, Transform};
pub use context::SweepContext;
pub use controller::CharacterController;
pub use geometry::{
    clamp_horizontal_speed, correct_overlapping_position, horizontal, is_navigable,
    project_on_plane, project_vertically_on_plane, slope_angle,
};
pub use horizontal::{approach_angle, cylinder_extent, resolve_horizontal};
pub use move_result::MoveResult;
pub use observer::{SweepObserver, SweepPass, SweepStep};
pub use settings::{
    Settings, SettingsError, DEPENETRATION_SWEEP_DISTANCE, FLOOR_DETECTION_SLACK, FLOOR_RAY_REACH,
    MAX_RECURSION_DEPTH, MIN_MOVE_DISTANCE, SEPARATION_DISTANCE,
};
pub use state::{CharacterRuntimeState, FloorType, GroundContact};
pub use vertical::{resolve_vertical, VerticalMove};
