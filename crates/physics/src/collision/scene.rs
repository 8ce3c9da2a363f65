//! The query interface movement code needs from a physics engine.

use glam::{Quat, Vec3};

use super::filter::QueryFilter;
use super::query::{QueryError, RayCastResult, SweepResult};

/// Sweep and ray cast queries against a physics scene.
///
/// Cylinders and capsules rest with their axis along world `+Z`;
/// `orientation` rotates them away from that rest pose, so an identity
/// orientation is an upright shape.
///
/// Implementations must be safe to query from several threads at once;
/// exclusive access for edits is handled by wrapping the scene in a
/// `parking_lot::RwLock`.
pub trait PhysicsScene: Send + Sync {
    /// Sweep an upright cylinder from `origin` along `direction`.
    #[allow(clippy::too_many_arguments)]
    fn cylinder_sweep(
        &self,
        half_height: f32,
        radius: f32,
        orientation: Quat,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Result<SweepResult, QueryError>;

    /// Sweep a capsule from `origin` along `direction`.
    ///
    /// `half_height` is measured from the centre to the tip, caps included.
    #[allow(clippy::too_many_arguments)]
    fn capsule_sweep(
        &self,
        half_height: f32,
        radius: f32,
        orientation: Quat,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Result<SweepResult, QueryError>;

    /// Cast a ray from `start` to `end`.
    fn ray_cast(
        &self,
        start: Vec3,
        end: Vec3,
        filter: &QueryFilter,
    ) -> Result<RayCastResult, QueryError>;
}
