//! Stride Physics
//!
//! A kinematic character controller that moves a capsule through a scene
//! with recursive sweeps. It never tunnels through thin geometry, slides
//! along walls and steep slopes, climbs small steps and gentle slopes, and
//! tells gameplay code what the character is standing on.
//!
//! # Architecture
//!
//! - **Collision**: the [`PhysicsScene`] query interface, filters and a
//!   parry3d-backed [`CollisionWorld`]
//! - **Movement**: the horizontal and vertical sweep resolvers and the
//!   [`CharacterController`] that runs them once per frame
//!
//! # Usage
//!
//! ```ignore
//! let scene = parking_lot::RwLock::new(world);
//! let mut controller = CharacterController::new(Settings::default());
//! controller.try_move(&scene, &mut body, dt, desired, Quat::IDENTITY);
//! ```
//!
//! Up is `+Z`. Positions handed to the resolvers are capsule centres.

pub mod collision;
pub mod movement;

// Re-export commonly used types
pub use collision::{
    CollisionLayers, CollisionWorld, EntityId, PhysicsScene, QueryFilter, SweepResult,
};
pub use movement::{
    CapsuleShape, CharacterBody, CharacterController, CharacterRuntimeState, FloorType,
    KinematicBody, Settings, SweepObserver, Transform,
};
