//! Vertical pass: capsule sweep for gravity, step height and floor
//! classification.
//!
//! Moving up is a plain sweep that stops at ceilings. Moving down (or not
//! at all) lifts the capsule by the step height, sweeps down past the
//! requested distance plus [`FLOOR_DETECTION_SLACK`], and:
//!
//! - lands on the first surface that is flat enough,
//! - slides down surfaces that are too steep, without step help,
//! - reports a floor found only inside the slack without stopping on it.
//!
//! Capsule caps make sharp edges look like slopes, so the normal of a
//! floor contact is re-read with a short vertical ray through the contact.

use glam::Vec3;

use crate::collision::{PhysicsScene, SweepResult};

use super::context::SweepContext;
use super::geometry::{correct_overlapping_position, is_navigable, project_on_plane};
use super::move_result::MoveResult;
use super::observer::{SweepPass, SweepStep};
use super::settings::{
    FLOOR_DETECTION_SLACK, FLOOR_RAY_REACH, MAX_RECURSION_DEPTH, MIN_MOVE_DISTANCE,
};
use super::state::{FloorType, GroundContact};
use super::UP;

/// Result of the vertical pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalMove {
    pub result: MoveResult,
    /// What the chain ended up touching.
    pub contact: GroundContact,
}

impl VerticalMove {
    fn new(result: MoveResult, contact: GroundContact) -> Self {
        Self { result, contact }
    }
}

/// Move the character from `start` (capsule centre) by `displacement`,
/// normally the gravity-driven fall of this frame.
///
/// A zero displacement still checks for a floor under the character.
pub fn resolve_vertical<S: PhysicsScene + ?Sized>(
    ctx: &mut SweepContext<'_, S>,
    start: Vec3,
    displacement: Vec3,
    step_offset: f32,
) -> VerticalMove {
    sweep(ctx, start, displacement, step_offset, 0)
}

fn sweep<S: PhysicsScene + ?Sized>(
    ctx: &mut SweepContext<'_, S>,
    start: Vec3,
    displacement: Vec3,
    step_offset: f32,
    depth: u32,
) -> VerticalMove {
    if depth > MAX_RECURSION_DEPTH {
        log::debug!("vertical sweep cut at depth {depth}");
        let remaining = displacement.length();
        return VerticalMove::new(
            MoveResult::unchanged(start, remaining, SweepResult::miss(start, 0.0)),
            GroundContact::None,
        );
    }

    if displacement.dot(UP) > 0.0 {
        sweep_up(ctx, start, displacement, step_offset, depth)
    } else {
        sweep_down(ctx, start, displacement, step_offset, depth)
    }
}

fn sweep_up<S: PhysicsScene + ?Sized>(
    ctx: &mut SweepContext<'_, S>,
    start: Vec3,
    displacement: Vec3,
    step_offset: f32,
    depth: u32,
) -> VerticalMove {
    let distance = displacement.length();
    let direction = displacement / distance;
    let result = ctx.capsule_sweep(start, direction, distance);

    ctx.report(SweepStep {
        pass: SweepPass::VerticalUp,
        depth,
        origin: start,
        direction,
        distance,
        result,
    });

    if result.initial_overlap {
        // Horizontal and downward passes should have left us clear
        log::warn!(
            "capsule overlaps geometry before moving up at {start} (depth {:.4})",
            result.penetration_depth
        );
        let corrected = correct_overlapping_position(start, &result);
        let next = sweep(ctx, corrected, displacement, step_offset, depth + 1);
        return VerticalMove::new(MoveResult::corrective(start, next.result), next.contact);
    }

    if result.hit {
        let contact = start + direction * result.distance;
        return VerticalMove::new(
            MoveResult::finished(start, contact, distance - result.distance, result),
            GroundContact::Ceiling {
                normal: result.normal,
            },
        );
    }

    VerticalMove::new(
        MoveResult::finished(start, start + displacement, 0.0, result),
        GroundContact::None,
    )
}

fn sweep_down<S: PhysicsScene + ?Sized>(
    ctx: &mut SweepContext<'_, S>,
    start: Vec3,
    displacement: Vec3,
    step_offset: f32,
    depth: u32,
) -> VerticalMove {
    let requested = displacement.length();
    let floor_check_only = requested < MIN_MOVE_DISTANCE;
    let (direction, requested) = if floor_check_only {
        (-UP, 0.0)
    } else {
        (displacement / requested, requested)
    };

    // Start one step higher so ledges up to the step height are landed on
    let step_offset = step_offset.max(0.0);
    let origin = start + UP * step_offset;
    let travel = requested + step_offset;
    let distance = travel + FLOOR_DETECTION_SLACK;
    let result = ctx.capsule_sweep(origin, direction, distance);

    ctx.report(SweepStep {
        pass: SweepPass::VerticalDown,
        depth,
        origin,
        direction,
        distance,
        result,
    });

    if result.initial_overlap {
        let corrected = correct_overlapping_position(origin, &result) - UP * step_offset;
        let next = sweep(ctx, corrected, displacement, step_offset, depth + 1);
        return VerticalMove::new(MoveResult::corrective(start, next.result), next.contact);
    }

    if !result.hit {
        let end = if floor_check_only { start } else { start + displacement };
        return VerticalMove::new(
            MoveResult::finished(start, end, 0.0, result),
            GroundContact::None,
        );
    }

    let normal = floor_normal(ctx, &result);
    let navigable = is_navigable(normal, ctx.settings.max_slope_angle);
    let floor = |floor_type| GroundContact::Floor { normal, floor_type };

    // Only the slack reached the floor: it is there, but does not stop us
    if result.distance >= travel {
        let end = if floor_check_only { start } else { origin + direction * travel };
        let floor_type = if navigable {
            FloorType::Navigable
        } else {
            FloorType::Unnavigable
        };
        return VerticalMove::new(MoveResult::finished(start, end, 0.0, result), floor(floor_type));
    }

    let contact = origin + direction * result.distance;
    let remaining = travel - result.distance;
    let stopped = MoveResult::finished(start, contact, remaining, result);

    if navigable {
        return VerticalMove::new(stopped, floor(FloorType::Navigable));
    }

    let slide = project_on_plane(direction * remaining, normal);
    if slide.length() < MIN_MOVE_DISTANCE || slide.dot(UP) >= 0.0 {
        return VerticalMove::new(stopped, floor(FloorType::Unnavigable));
    }

    // Sliding off a steep surface gives up step help for the rest of the chain
    let next = sweep(ctx, contact, slide, 0.0, depth + 1);
    let contact = match next.contact {
        GroundContact::None => floor(FloorType::Unnavigable),
        touched => touched,
    };
    VerticalMove::new(stopped.subsequent(next.result), contact)
}

/// Normal of the surface under a capsule contact, read with a short ray
/// along the up axis. Edge contacts the ray misses count as flat.
fn floor_normal<S: PhysicsScene + ?Sized>(
    ctx: &SweepContext<'_, S>,
    result: &SweepResult,
) -> Vec3 {
    let above = result.contact_point + UP * FLOOR_RAY_REACH;
    let below = result.contact_point - UP * FLOOR_RAY_REACH;
    match ctx.ray_cast(above, below) {
        Some(ray) if ray.normal.length_squared() > f32::EPSILON => ray.normal.normalize(),
        _ => UP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{
        CollisionLayers, CollisionWorld, EntityId, QueryError, QueryFilter, RayCastResult,
    };
    use crate::movement::body::CapsuleShape;
    use crate::movement::observer::SweepObserver;
    use crate::movement::settings::Settings;
    use glam::Quat;

    const SOLID: CollisionLayers = CollisionLayers::STATIC;

    fn flat_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(0.0, 0.0, -0.5), Vec3::new(20.0, 20.0, 0.5), SOLID);
        world
    }

    fn run<S: PhysicsScene>(scene: &S, start: Vec3, displacement: Vec3, step: f32) -> VerticalMove {
        run_recorded(scene, start, displacement, step).0
    }

    fn run_recorded<S: PhysicsScene>(
        scene: &S,
        start: Vec3,
        displacement: Vec3,
        step: f32,
    ) -> (VerticalMove, Vec<SweepStep>) {
        let settings = Settings::default();
        let filter = QueryFilter::new(SOLID);
        let capsule = CapsuleShape::new(0.4, 1.0);
        let mut steps = Vec::new();
        let mut observer = |step: &SweepStep| steps.push(*step);
        let mut ctx = SweepContext::new(scene, &settings, &filter, &capsule, Quat::IDENTITY)
            .with_observer(Some(&mut observer as &mut dyn SweepObserver));
        let fall = resolve_vertical(&mut ctx, start, displacement, step);
        drop(ctx);
        (fall, steps)
    }

    /// Lands every capsule on a box edge: the sweep reports the rounded
    /// cap's normal and the vertical ray passes beside the box.
    struct BoxEdge;

    const EDGE_NORMAL: Vec3 = Vec3::new(0.94, 0.0, 0.34);

    impl PhysicsScene for BoxEdge {
        fn cylinder_sweep(
            &self,
            _half_height: f32,
            _radius: f32,
            _orientation: Quat,
            origin: Vec3,
            direction: Vec3,
            max_distance: f32,
            _filter: &QueryFilter,
        ) -> Result<SweepResult, QueryError> {
            Ok(SweepResult::miss(origin + direction * max_distance, max_distance))
        }

        fn capsule_sweep(
            &self,
            _half_height: f32,
            _radius: f32,
            _orientation: Quat,
            origin: Vec3,
            direction: Vec3,
            max_distance: f32,
            _filter: &QueryFilter,
        ) -> Result<SweepResult, QueryError> {
            let position = origin + direction * 0.3;
            let edge = position - UP * 0.9 - EDGE_NORMAL * 0.4;
            Ok(SweepResult::blocked(position, 0.3, max_distance, EDGE_NORMAL, edge, EntityId(3)))
        }

        fn ray_cast(
            &self,
            _start: Vec3,
            end: Vec3,
            _filter: &QueryFilter,
        ) -> Result<RayCastResult, QueryError> {
            Ok(RayCastResult::miss(end, 0.0))
        }
    }

    #[test]
    fn test_lands_on_flat_floor() {
        let world = flat_world();
        let fall = run(&world, Vec3::new(0.0, 0.0, 1.2), Vec3::new(0.0, 0.0, -0.5), 0.0);

        assert!((fall.result.final_position.z - 1.0).abs() < 0.01);
        assert!(matches!(
            fall.contact,
            GroundContact::Floor {
                floor_type: FloorType::Navigable,
                ..
            }
        ));
    }

    #[test]
    fn test_free_fall() {
        let world = flat_world();
        let start = Vec3::new(0.0, 0.0, 5.0);
        let fall = run(&world, start, Vec3::new(0.0, 0.0, -0.5), 0.35);

        assert!((fall.result.final_position.z - 4.5).abs() < 1e-4);
        assert_eq!(fall.contact, GroundContact::None);
    }

    #[test]
    fn test_floor_in_slack_does_not_stop() {
        let world = flat_world();
        // Bottom 0.02 above the floor, asking to fall 0.01
        let start = Vec3::new(0.0, 0.0, 1.02);
        let fall = run(&world, start, Vec3::new(0.0, 0.0, -0.01), 0.0);

        assert!((fall.result.final_position.z - 1.01).abs() < 1e-4);
        assert!(matches!(fall.contact, GroundContact::Floor { .. }));
    }

    #[test]
    fn test_zero_move_keeps_position() {
        let world = flat_world();
        let start = Vec3::new(0.0, 0.0, 1.01);
        let check = run(&world, start, Vec3::ZERO, 0.35);

        assert_eq!(check.result.final_position, start);
        assert!(matches!(
            check.contact,
            GroundContact::Floor {
                floor_type: FloorType::Navigable,
                ..
            }
        ));
    }

    #[test]
    fn test_ceiling_stops_rise() {
        let mut world = flat_world();
        world.add_box(Vec3::new(0.0, 0.0, 3.5), Vec3::new(20.0, 20.0, 0.5), SOLID);

        // Top at 2.01, ceiling at 3.0
        let rise = run(&world, Vec3::new(0.0, 0.0, 1.01), Vec3::new(0.0, 0.0, 2.0), 0.35);

        assert!((rise.result.final_position.z - 2.0).abs() < 0.01);
        assert!(matches!(rise.contact, GroundContact::Ceiling { .. }));
    }

    #[test]
    fn test_step_lands_on_ledge() {
        let mut world = flat_world();
        // Ledge 0.3 high under the character
        world.add_box(Vec3::new(0.0, 0.0, 0.15), Vec3::new(2.0, 2.0, 0.15), SOLID);

        // Capsule bottom at 0.001, sunk into the ledge
        let start = Vec3::new(0.0, 0.0, 1.001);
        let fall = run(&world, start, Vec3::new(0.0, 0.0, -0.01), 0.4);

        assert!((fall.result.final_position.z - 1.3).abs() < 0.01);
        assert!(!fall.result.was_corrected());
    }

    #[test]
    fn test_edge_contact_without_ray_hit_is_navigable() {
        let start = Vec3::new(0.0, 0.0, 2.0);
        let fall = run(&BoxEdge, start, Vec3::new(0.0, 0.0, -0.5), 0.0);

        // Stopped on the edge, not slid off it
        assert!((fall.result.final_position.z - 1.7).abs() < 1e-5);
        assert!((fall.result.remaining_distance - 0.2).abs() < 1e-5);
        assert_eq!(
            fall.contact,
            GroundContact::Floor {
                normal: UP,
                floor_type: FloorType::Navigable,
            }
        );
    }

    #[test]
    fn test_steep_landing_slides_without_step() {
        let slope = 60f32.to_radians();
        let normal = Vec3::new(-slope.sin(), 0.0, slope.cos());
        let mut world = CollisionWorld::new();
        world.add_half_space(Vec3::ZERO, normal, SOLID);

        // Bottom sphere 0.2 off the slope, falling far enough to reach it
        let start = UP * 0.6 + normal * 0.6;
        let (fall, steps) = run_recorded(&world, start, Vec3::new(0.0, 0.0, -2.0), 0.35);

        let landing = steps[0];
        assert_eq!(landing.pass, SweepPass::VerticalDown);
        assert_eq!(landing.depth, 0);
        assert!(landing.result.hit && !landing.result.initial_overlap);
        assert!(landing.result.distance < 2.35);

        let slide = steps
            .iter()
            .find(|step| step.depth == 1)
            .expect("no slide after the steep landing");
        assert_eq!(slide.pass, SweepPass::VerticalDown);
        assert!(slide.direction.x < -0.1, "slide is vertical: {}", slide.direction);
        assert!(slide.direction.dot(UP) < 0.0);
        assert!(slide.direction.dot(normal).abs() < 1e-3);

        // Starts at the landing contact, not lifted by the step height
        let contact = landing.origin + landing.direction * landing.result.distance;
        assert!((slide.origin - contact).length() < 1e-4, "{} vs {}", slide.origin, contact);

        assert!(matches!(
            fall.contact,
            GroundContact::Floor {
                floor_type: FloorType::Unnavigable,
                ..
            }
        ));
        assert!(fall.result.final_position.x < contact.x);
    }
}
