//! Character controller.
//!
//! This is the per-frame entry point: it runs the horizontal and vertical
//! resolvers against one snapshot of the scene, folds the outcome into the
//! runtime state and commits the new transform to the body.

use glam::{Quat, Vec3};
use parking_lot::RwLock;

use crate::collision::PhysicsScene;

use super::body::{CharacterBody, Transform};
use super::context::SweepContext;
use super::geometry::project_vertically_on_plane;
use super::horizontal::resolve_horizontal;
use super::observer::SweepObserver;
use super::settings::{Settings, SettingsError};
use super::state::{CharacterRuntimeState, FloorType};
use super::vertical::resolve_vertical;
use super::UP;

/// Moves one character through a scene.
///
/// # Example
///
/// ```ignore
/// let scene = RwLock::new(world);
/// let mut controller = CharacterController::new(Settings::default());
///
/// // Each frame:
/// controller.try_move(&scene, &mut body, delta_time, delta_translation, Quat::IDENTITY);
/// if controller.floor_type() == FloorType::Navigable { /* ... */ }
/// ```
pub struct CharacterController {
    settings: Settings,
    state: CharacterRuntimeState,
    ghost_mode: bool,
    debug_sweeps: bool,
    observer: Option<Box<dyn SweepObserver + Send>>,
}

impl std::fmt::Debug for CharacterController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterController")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("ghost_mode", &self.ghost_mode)
            .field("debug_sweeps", &self.debug_sweeps)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for CharacterController {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl CharacterController {
    /// Create a controller for an airborne character.
    pub fn new(settings: Settings) -> Self {
        debug_assert!(settings.validate().is_ok(), "invalid settings: {settings:?}");
        Self {
            settings,
            state: CharacterRuntimeState::default(),
            ghost_mode: false,
            debug_sweeps: false,
            observer: None,
        }
    }

    /// Move `body` by `delta_translation` and rotate it by `delta_rotation`
    /// for a frame of `delta_time` seconds.
    ///
    /// Call at most once per frame per character. The scene is read-locked
    /// once for both passes and released before the body is moved.
    /// Returns `false` without touching anything when the inputs are not
    /// finite or `delta_time` is negative.
    pub fn try_move<S, B>(
        &mut self,
        scene: &RwLock<S>,
        body: &mut B,
        delta_time: f32,
        delta_translation: Vec3,
        delta_rotation: Quat,
    ) -> bool
    where
        S: PhysicsScene + ?Sized,
        B: CharacterBody + ?Sized,
    {
        let valid = delta_time.is_finite()
            && delta_time >= 0.0
            && delta_translation.is_finite()
            && delta_rotation.is_finite();
        debug_assert!(
            valid,
            "bad move input: dt={delta_time} translation={delta_translation} \
             rotation={delta_rotation}"
        );
        if !valid {
            return false;
        }

        let transform = body.transform();
        let rotation = (transform.rotation * delta_rotation).normalize();

        if self.ghost_mode {
            body.move_to(
                Transform {
                    translation: transform.translation + delta_translation,
                    rotation,
                },
                delta_time,
            );
            return true;
        }

        let capsule = body.capsule();
        let rotated = Transform {
            translation: transform.translation,
            rotation,
        };
        let start = capsule.center(&transform);
        let orientation = capsule.orientation(&rotated);
        let filter = self.settings.query_filter(body.entity());

        let step_offset = if self.state.step_height_enabled {
            self.settings.step_height
        } else {
            0.0
        };

        let on_floor = self.state.floor_type == FloorType::Navigable;
        let desired = if self.state.floor_projection_enabled && on_floor {
            project_vertically_on_plane(delta_translation, self.state.floor_normal)
        } else {
            delta_translation
        };

        if self.state.gravity_enabled {
            self.state.vertical_speed -= self.settings.gravity * delta_time;
        }
        let fall = UP * self.state.vertical_speed * delta_time;

        let observer = if self.debug_sweeps {
            self.observer
                .as_deref_mut()
                .map(|observer| observer as &mut dyn SweepObserver)
        } else {
            None
        };

        let guard = scene.read();
        let mut ctx = SweepContext::new(&*guard, &self.settings, &filter, &capsule, orientation)
            .with_observer(observer);
        let horizontal = resolve_horizontal(&mut ctx, start, desired, step_offset);
        let vertical = resolve_vertical(&mut ctx, horizontal.final_position, fall, step_offset);
        drop(ctx);
        drop(guard);

        self.state.apply_ground_contact(vertical.contact, delta_time);

        let center = vertical.result.final_position;
        log::trace!(
            "moved {start} -> {center}, floor {:?}, vertical speed {:.3}",
            self.state.floor_type,
            self.state.vertical_speed
        );

        body.move_to(
            Transform {
                translation: center - rotation * capsule.local_offset,
                rotation,
            },
            delta_time,
        );
        true
    }

    /// Current floor classification.
    pub fn floor_type(&self) -> FloorType {
        self.state.floor_type
    }

    /// Whether any floor is under the character.
    pub fn has_floor(&self) -> bool {
        self.state.has_floor()
    }

    /// Time spent without a floor (seconds).
    pub fn in_air_time(&self) -> f32 {
        self.state.in_air_time
    }

    /// Normal of the current floor, up when airborne.
    pub fn floor_normal(&self) -> Vec3 {
        self.state.floor_normal
    }

    /// Speed along the up axis (meters/second).
    pub fn vertical_speed(&self) -> f32 {
        self.state.vertical_speed
    }

    /// Override the vertical speed, e.g. for a jump impulse.
    pub fn set_vertical_speed(&mut self, speed: f32) {
        self.state.vertical_speed = speed;
    }

    pub fn set_gravity_enabled(&mut self, enabled: bool) {
        self.state.gravity_enabled = enabled;
    }

    pub fn set_step_height_enabled(&mut self, enabled: bool) {
        self.state.step_height_enabled = enabled;
    }

    pub fn set_floor_projection_enabled(&mut self, enabled: bool) {
        self.state.floor_projection_enabled = enabled;
    }

    /// Ghost mode moves the body without any collision query.
    pub fn set_ghost_mode(&mut self, enabled: bool) {
        self.ghost_mode = enabled;
    }

    pub fn is_ghost_mode(&self) -> bool {
        self.ghost_mode
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings. Invalid settings are rejected and the current
    /// ones kept.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn state(&self) -> &CharacterRuntimeState {
        &self.state
    }

    /// Install (or remove) the observer receiving sweep steps.
    pub fn set_observer(&mut self, observer: Option<Box<dyn SweepObserver + Send>>) {
        self.observer = observer;
    }

    /// Report sweep steps to the observer. Off by default.
    pub fn set_debug_sweeps(&mut self, enabled: bool) {
        self.debug_sweeps = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionLayers, CollisionWorld, EntityId};
    use crate::movement::body::{CapsuleShape, KinematicBody};
    use crate::movement::observer::SweepStep;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn floor_scene() -> RwLock<CollisionWorld> {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(0.0, 0.0, -0.5),
            Vec3::new(50.0, 50.0, 0.5),
            CollisionLayers::STATIC,
        );
        RwLock::new(world)
    }

    fn body_at(center: Vec3) -> KinematicBody {
        KinematicBody::new(
            EntityId(100),
            Transform::from_translation(center),
            CapsuleShape::new(0.4, 1.0),
        )
    }

    #[test]
    fn test_ghost_mode_ignores_geometry() {
        let scene = floor_scene();
        let mut body = body_at(Vec3::new(0.0, 0.0, 1.01));
        let mut controller = CharacterController::default();
        controller.set_ghost_mode(true);

        let fall = Vec3::new(0.0, 0.0, -5.0);
        assert!(controller.try_move(&scene, &mut body, 0.1, fall, Quat::IDENTITY));

        assert!((body.transform.translation - Vec3::new(0.0, 0.0, -3.99)).length() < 1e-5);
        assert_eq!(controller.floor_type(), FloorType::NoFloor);
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let scene = floor_scene();
        let mut body = body_at(Vec3::new(0.0, 0.0, 1.01));
        let mut controller = CharacterController::default();

        let moved = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let broken = Vec3::new(f32::NAN, 0.0, 0.0);
            controller.try_move(&scene, &mut body, 0.1, broken, Quat::IDENTITY)
        }));

        // Debug builds assert, release builds refuse
        assert!(matches!(moved, Err(_) | Ok(false)));
        assert_eq!(body.transform.translation, Vec3::new(0.0, 0.0, 1.01));
    }

    #[test]
    fn test_standing_on_floor() {
        let scene = floor_scene();
        let mut body = body_at(Vec3::new(0.0, 0.0, 1.01));
        let mut controller = CharacterController::default();

        for _ in 0..5 {
            assert!(controller.try_move(&scene, &mut body, 1.0 / 60.0, Vec3::ZERO, Quat::IDENTITY));
        }

        assert_eq!(controller.floor_type(), FloorType::Navigable);
        assert_eq!(controller.vertical_speed(), 0.0);
        assert_eq!(controller.in_air_time(), 0.0);
        assert!((body.transform.translation.z - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_falls_without_floor() {
        let scene = RwLock::new(CollisionWorld::new());
        let mut body = body_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controller = CharacterController::default();

        controller.try_move(&scene, &mut body, 0.1, Vec3::ZERO, Quat::IDENTITY);
        controller.try_move(&scene, &mut body, 0.1, Vec3::ZERO, Quat::IDENTITY);

        assert!(!controller.has_floor());
        assert!((controller.in_air_time() - 0.2).abs() < 1e-5);
        assert!(controller.vertical_speed() < 0.0);
        assert!(body.transform.translation.z < 10.0);
        assert!(body.linear_velocity.z < 0.0);
    }

    #[test]
    fn test_gravity_toggle() {
        let scene = RwLock::new(CollisionWorld::new());
        let mut body = body_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controller = CharacterController::default();
        controller.set_gravity_enabled(false);

        controller.try_move(&scene, &mut body, 0.1, Vec3::ZERO, Quat::IDENTITY);

        assert_eq!(controller.vertical_speed(), 0.0);
        assert_eq!(body.transform.translation.z, 10.0);
    }

    #[test]
    fn test_jump_hits_ceiling() {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(0.0, 0.0, 3.5),
            Vec3::new(10.0, 10.0, 0.5),
            CollisionLayers::STATIC,
        );
        let scene = RwLock::new(world);
        let mut body = body_at(Vec3::new(0.0, 0.0, 1.5));
        let mut controller = CharacterController::default();
        controller.set_gravity_enabled(false);
        controller.set_vertical_speed(20.0);

        controller.try_move(&scene, &mut body, 0.1, Vec3::ZERO, Quat::IDENTITY);

        // Capsule top stops below the ceiling at z=3
        assert!(body.transform.translation.z < 2.0);
        assert!(body.transform.translation.z > 1.9);
        assert_eq!(controller.vertical_speed(), 0.0);
        assert_eq!(controller.floor_type(), FloorType::NoFloor);
    }

    #[test]
    fn test_rotation_is_applied() {
        let scene = floor_scene();
        let mut body = body_at(Vec3::new(0.0, 0.0, 1.01));
        let mut controller = CharacterController::default();
        let turn = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);

        controller.try_move(&scene, &mut body, 1.0 / 60.0, Vec3::ZERO, turn);

        assert!(body.transform.rotation.angle_between(turn) < 1e-4);
    }

    #[test]
    fn test_set_settings_validates() {
        let mut controller = CharacterController::default();
        let bad = Settings {
            step_height: -1.0,
            ..Default::default()
        };

        assert_eq!(controller.set_settings(bad), Err(SettingsError::InvalidStepHeight(-1.0)));
        assert_eq!(controller.settings().step_height, Settings::default().step_height);

        let good = Settings {
            step_height: 0.5,
            ..Default::default()
        };
        assert!(controller.set_settings(good).is_ok());
        assert_eq!(controller.settings().step_height, 0.5);
    }

    #[test]
    fn test_observer_only_with_debug_sweeps() {
        let scene = floor_scene();
        let mut body = body_at(Vec3::new(0.0, 0.0, 1.01));
        let steps: Arc<Mutex<Vec<SweepStep>>> = Arc::default();
        let sink = Arc::clone(&steps);

        let mut controller = CharacterController::default();
        controller.set_observer(Some(Box::new(move |step: &SweepStep| sink.lock().push(*step))));

        controller.try_move(&scene, &mut body, 1.0 / 60.0, Vec3::X * 0.1, Quat::IDENTITY);
        assert!(steps.lock().is_empty());

        controller.set_debug_sweeps(true);
        controller.try_move(&scene, &mut body, 1.0 / 60.0, Vec3::X * 0.1, Quat::IDENTITY);

        let steps = steps.lock();
        assert!(steps.len() >= 2);
        assert!(steps.iter().any(|step| step.pass == crate::movement::SweepPass::Horizontal));
        assert!(steps.iter().any(|step| step.pass == crate::movement::SweepPass::VerticalDown));
    }
}
