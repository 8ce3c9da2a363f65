//! Collision queries the movement code runs against.
//!
//! # Key Types
//!
//! - [`PhysicsScene`]: the sweep and ray cast interface of a scene
//! - [`SweepResult`] / [`RayCastResult`]: query outcomes
//! - [`QueryFilter`]: which colliders a query sees
//! - [`CollisionWorld`]: a parry3d-backed scene for tests and tools

mod filter;
mod query;
mod scene;
mod world;

pub use filter::{CollisionLayers, EntityId, QueryFilter};
pub use query::{QueryError, RayCastResult, SweepResult};
pub use scene::PhysicsScene;
pub use world::{Collider, CollisionWorld, CONTACT_SKIN};
