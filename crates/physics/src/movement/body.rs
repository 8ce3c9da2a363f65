//! The character body the controller moves.
//!
//! The controller only needs a handful of things from the body: where it
//! is, how big its capsule is, who it is (to skip itself in queries) and a
//! way to commit a new transform kinematically.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::EntityId;

/// Rigid transform: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Transform with no rotation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// Map a point from local to world space.
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * point
    }
}

/// Collision capsule of a character.
///
/// The capsule stands along the up axis. `local_offset` and
/// `local_rotation` place it relative to the body origin, for bodies
/// whose origin sits at the feet or whose mesh is authored sideways.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsuleShape {
    /// Radius of the cylinder and end caps (meters).
    pub radius: f32,
    /// Centre to tip, caps included (meters).
    pub half_height: f32,
    /// Capsule centre in body space.
    pub local_offset: Vec3,
    /// Rotation correcting the body orientation into an upright capsule.
    pub local_rotation: Quat,
}

impl Default for CapsuleShape {
    fn default() -> Self {
        Self::new(0.4, 0.9)
    }
}

impl CapsuleShape {
    /// Capsule centred on the body origin.
    pub fn new(radius: f32, half_height: f32) -> Self {
        Self {
            radius,
            half_height,
            local_offset: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
        }
    }

    /// Capsule resting with its bottom tip on the body origin.
    pub fn standing_on_origin(radius: f32, half_height: f32) -> Self {
        Self {
            local_offset: Vec3::new(0.0, 0.0, half_height),
            ..Self::new(radius, half_height)
        }
    }

    /// World-space capsule centre for a body at `transform`.
    #[inline]
    pub fn center(&self, transform: &Transform) -> Vec3 {
        transform.transform_point(self.local_offset)
    }

    /// World-space capsule orientation for a body at `transform`.
    #[inline]
    pub fn orientation(&self, transform: &Transform) -> Quat {
        transform.rotation * self.local_rotation
    }
}

/// A body the controller can move.
pub trait CharacterBody {
    /// Handle used to exclude the body from its own queries.
    fn entity(&self) -> EntityId;

    /// Current world transform.
    fn transform(&self) -> Transform;

    /// Collision capsule.
    fn capsule(&self) -> CapsuleShape;

    /// Move kinematically to `transform` over `delta_time`.
    ///
    /// Unlike [`teleport`](Self::teleport) this keeps velocity bookkeeping
    /// consistent with the displacement.
    fn move_to(&mut self, transform: Transform, delta_time: f32);

    /// Jump to `transform` without implying any velocity.
    fn teleport(&mut self, transform: Transform);
}

/// Plain kinematic body, enough to drive the controller without an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicBody {
    pub entity: EntityId,
    pub transform: Transform,
    pub capsule: CapsuleShape,
    /// Velocity implied by the last kinematic move (meters/second).
    pub linear_velocity: Vec3,
}

impl KinematicBody {
    /// Create a body at rest.
    pub fn new(entity: EntityId, transform: Transform, capsule: CapsuleShape) -> Self {
        Self {
            entity,
            transform,
            capsule,
            linear_velocity: Vec3::ZERO,
        }
    }

    /// World-space capsule centre.
    pub fn center(&self) -> Vec3 {
        self.capsule.center(&self.transform)
    }
}

impl CharacterBody for KinematicBody {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn capsule(&self) -> CapsuleShape {
        self.capsule
    }

    fn move_to(&mut self, transform: Transform, delta_time: f32) {
        self.linear_velocity = if delta_time > 0.0 {
            (transform.translation - self.transform.translation) / delta_time
        } else {
            Vec3::ZERO
        };
        self.transform = transform;
    }

    fn teleport(&mut self, transform: Transform) {
        self.transform = transform;
        self.linear_velocity = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capsule_center_follows_offset() {
        let capsule = CapsuleShape::standing_on_origin(0.4, 0.9);
        let transform = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));

        assert_eq!(capsule.center(&transform), Vec3::new(1.0, 2.0, 3.9));
    }

    #[test]
    fn test_move_to_tracks_velocity() {
        let mut body =
            KinematicBody::new(EntityId(1), Transform::IDENTITY, CapsuleShape::default());

        body.move_to(Transform::from_translation(Vec3::new(0.5, 0.0, 0.0)), 0.5);
        assert_eq!(body.linear_velocity, Vec3::X);

        body.move_to(Transform::from_translation(Vec3::new(0.5, 0.0, 0.0)), 0.0);
        assert_eq!(body.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_teleport_clears_velocity() {
        let mut body =
            KinematicBody::new(EntityId(1), Transform::IDENTITY, CapsuleShape::default());
        body.linear_velocity = Vec3::ONE;

        body.teleport(Transform::from_translation(Vec3::splat(10.0)));

        assert_eq!(body.linear_velocity, Vec3::ZERO);
        assert_eq!(body.transform.translation, Vec3::splat(10.0));
    }
}
