//! Results of sweep and ray cast queries.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::filter::EntityId;

/// Errors a scene can report for a query.
///
/// Movement code never propagates these: a failed query is handled as if
/// nothing was hit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// The collision backend has no algorithm for this pair of shapes.
    #[error("unsupported shape pair for {0} query")]
    UnsupportedShapePair(&'static str),

    /// The query arguments were degenerate (zero direction, NaN, ...).
    #[error("invalid query: {0}")]
    InvalidQuery(&'static str),
}

/// Outcome of sweeping a shape through the scene.
///
/// Normals always point out of the obstacle, towards the swept shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Whether anything blocked the sweep.
    pub hit: bool,

    /// Whether the shape already overlapped geometry at the sweep origin.
    ///
    /// When set, `distance` is zero, `normal` is the push-out direction and
    /// `penetration_depth` tells how far to push.
    pub initial_overlap: bool,

    /// Contact normal (zero when nothing was hit).
    pub normal: Vec3,

    /// Contact point on the obstacle, in world space.
    pub contact_point: Vec3,

    /// Position of the shape origin where the sweep stopped.
    pub shape_position: Vec3,

    /// Distance travelled along the sweep direction.
    pub distance: f32,

    /// Distance that was requested.
    pub max_distance: f32,

    /// Overlap depth for initial overlaps. Zero is a legal depth.
    pub penetration_depth: f32,

    /// Entity that was hit.
    pub entity: EntityId,
}

impl Default for SweepResult {
    fn default() -> Self {
        Self::miss(Vec3::ZERO, 0.0)
    }
}

impl SweepResult {
    /// The sweep travelled its whole distance and ended at `end_position`.
    pub fn miss(end_position: Vec3, max_distance: f32) -> Self {
        Self {
            hit: false,
            initial_overlap: false,
            normal: Vec3::ZERO,
            contact_point: end_position,
            shape_position: end_position,
            distance: max_distance,
            max_distance,
            penetration_depth: 0.0,
            entity: EntityId::NONE,
        }
    }

    /// The sweep was stopped after `distance`.
    pub fn blocked(
        shape_position: Vec3,
        distance: f32,
        max_distance: f32,
        normal: Vec3,
        contact_point: Vec3,
        entity: EntityId,
    ) -> Self {
        Self {
            hit: true,
            initial_overlap: false,
            normal,
            contact_point,
            shape_position,
            distance,
            max_distance,
            penetration_depth: 0.0,
            entity,
        }
    }

    /// The shape overlapped geometry before moving at all.
    pub fn overlapping(
        origin: Vec3,
        max_distance: f32,
        normal: Vec3,
        contact_point: Vec3,
        penetration_depth: f32,
        entity: EntityId,
    ) -> Self {
        Self {
            hit: true,
            initial_overlap: true,
            normal,
            contact_point,
            shape_position: origin,
            distance: 0.0,
            max_distance,
            penetration_depth,
            entity,
        }
    }

    /// Requested distance the sweep did not cover.
    #[inline]
    pub fn remaining_distance(&self) -> f32 {
        (self.max_distance - self.distance).max(0.0)
    }
}

/// Outcome of a ray cast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayCastResult {
    /// Whether the ray hit anything.
    pub hit: bool,
    /// Hit point (ray end when nothing was hit).
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
    /// Distance from the ray start.
    pub distance: f32,
    /// Entity that was hit.
    pub entity: EntityId,
}

impl RayCastResult {
    /// A ray that reached `end` without hitting anything.
    pub fn miss(end: Vec3, length: f32) -> Self {
        Self {
            hit: false,
            point: end,
            normal: Vec3::ZERO,
            distance: length,
            entity: EntityId::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_miss() {
        let result = SweepResult::miss(Vec3::new(2.0, 0.0, 0.0), 2.0);
        assert!(!result.hit);
        assert!(!result.initial_overlap);
        assert_eq!(result.remaining_distance(), 0.0);
    }

    #[test]
    fn test_sweep_blocked_remaining() {
        let result = SweepResult::blocked(
            Vec3::new(0.5, 0.0, 0.0),
            0.5,
            2.0,
            Vec3::NEG_X,
            Vec3::new(1.0, 0.0, 0.0),
            EntityId(3),
        );
        assert!(result.hit);
        assert!((result.remaining_distance() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_overlap_has_zero_distance() {
        let result =
            SweepResult::overlapping(Vec3::ZERO, 1.0, Vec3::Z, Vec3::ZERO, 0.2, EntityId(1));
        assert!(result.initial_overlap);
        assert_eq!(result.distance, 0.0);
        assert_eq!(result.penetration_depth, 0.2);
    }
}
