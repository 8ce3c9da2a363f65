//! Everything a resolver needs for one move, bundled so recursive calls
//! only pass what changes between steps.

use glam::{Quat, Vec3};

use crate::collision::{PhysicsScene, QueryFilter, QueryError, RayCastResult, SweepResult};

use super::body::CapsuleShape;
use super::observer::{SweepObserver, SweepStep};
use super::settings::Settings;

/// Scene, shape and tunables shared by the horizontal and vertical passes.
///
/// The scene reference is expected to come from a read guard held for the
/// lifetime of the context, so both passes see the same snapshot.
pub struct SweepContext<'a, S: ?Sized> {
    pub scene: &'a S,
    pub settings: &'a Settings,
    pub filter: &'a QueryFilter,
    /// Capsule radius (meters).
    pub radius: f32,
    /// Capsule centre to tip (meters).
    pub half_height: f32,
    /// World orientation of the capsule.
    pub orientation: Quat,
    observer: Option<&'a mut dyn SweepObserver>,
}

impl<'a, S: PhysicsScene + ?Sized> SweepContext<'a, S> {
    pub fn new(
        scene: &'a S,
        settings: &'a Settings,
        filter: &'a QueryFilter,
        capsule: &CapsuleShape,
        orientation: Quat,
    ) -> Self {
        Self {
            scene,
            settings,
            filter,
            radius: capsule.radius,
            half_height: capsule.half_height,
            orientation,
            observer: None,
        }
    }

    /// Report every sweep of this context to `observer`.
    pub fn with_observer(mut self, observer: Option<&'a mut dyn SweepObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub(crate) fn cylinder_sweep(
        &self,
        half_height: f32,
        origin: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> SweepResult {
        let result = self.scene.cylinder_sweep(
            half_height,
            self.radius,
            self.orientation,
            origin,
            direction,
            distance,
            self.filter,
        );
        or_free("cylinder", result, origin, direction, distance)
    }

    pub(crate) fn capsule_sweep(
        &self,
        origin: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> SweepResult {
        let result = self.scene.capsule_sweep(
            self.half_height,
            self.radius,
            self.orientation,
            origin,
            direction,
            distance,
            self.filter,
        );
        or_free("capsule", result, origin, direction, distance)
    }

    /// Ray cast; failures come back as `None`, same as a miss.
    pub(crate) fn ray_cast(&self, start: Vec3, end: Vec3) -> Option<RayCastResult> {
        match self.scene.ray_cast(start, end, self.filter) {
            Ok(ray) if ray.hit => Some(ray),
            Ok(_) => None,
            Err(err) => {
                log::warn!("ray cast failed, treating as a miss: {err}");
                None
            }
        }
    }

    pub(crate) fn report(&mut self, step: SweepStep) {
        log::trace!(
            "{:?} sweep depth={} distance={:.4} hit={} overlap={}",
            step.pass,
            step.depth,
            step.distance,
            step.result.hit,
            step.result.initial_overlap
        );
        if let Some(observer) = self.observer.as_mut() {
            observer.on_sweep_step(&step);
        }
    }
}

/// A failed query is a free path.
fn or_free(
    shape: &str,
    result: Result<SweepResult, QueryError>,
    origin: Vec3,
    direction: Vec3,
    distance: f32,
) -> SweepResult {
    result.unwrap_or_else(|err| {
        log::warn!("{shape} sweep failed, treating the path as free: {err}");
        SweepResult::miss(origin + direction * distance, distance)
    })
}
