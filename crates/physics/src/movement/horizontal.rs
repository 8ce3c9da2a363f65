//! Horizontal pass: cylinder sweep with depenetration, floor and wall
//! reprojection, and a speed clamp.
//!
//! The character is swept as an upright cylinder whose bottom is raised by
//! the step height, so obstacles up to that height are passed over here and
//! climbed by the vertical pass afterwards.
//!
//! # Algorithm
//!
//! 1. Sweep the cylinder along the displacement (or sweep a tiny distance
//!    down when the displacement is zero, only to find overlaps).
//! 2. Started inside geometry: push out and retry the full displacement.
//! 3. Free path: done.
//! 4. Hit a navigable floor: bend the displacement onto the floor plane
//!    (vertically, keeping the heading) and continue.
//! 5. Hit a wall at a glancing angle: slide along it and continue.
//!    Hit it head-on: stop.
//!
//! Continued moves never go faster horizontally than the move they came
//! from, and the chain is cut at [`MAX_RECURSION_DEPTH`].

use glam::Vec3;

use crate::collision::{PhysicsScene, SweepResult};

use super::context::SweepContext;
use super::geometry::{
    clamp_horizontal_speed, correct_overlapping_position, is_navigable, project_on_plane,
    project_vertically_on_plane,
};
use super::move_result::MoveResult;
use super::observer::{SweepPass, SweepStep};
use super::settings::{DEPENETRATION_SWEEP_DISTANCE, MAX_RECURSION_DEPTH, MIN_MOVE_DISTANCE};
use super::UP;

/// Sweep the character from `start` (capsule centre) along `displacement`.
///
/// `step_offset` raises the bottom of the swept cylinder; pass zero to
/// treat every obstacle as a wall.
pub fn resolve_horizontal<S: PhysicsScene + ?Sized>(
    ctx: &mut SweepContext<'_, S>,
    start: Vec3,
    displacement: Vec3,
    step_offset: f32,
) -> MoveResult {
    sweep(ctx, start, displacement, step_offset, 0)
}

/// Half-height and centre lift of the swept cylinder.
///
/// The step is capped at the capsule's half-height so the cylinder keeps
/// at least half of the capsule's height.
pub fn cylinder_extent(half_height: f32, step_offset: f32) -> (f32, f32) {
    let step = step_offset.clamp(0.0, half_height);
    (half_height - step * 0.5, step * 0.5)
}

/// Angle between a wall normal and the reversed movement direction.
///
/// Zero means a head-on hit; values near 90° mean the move barely grazes
/// the wall. Degenerate normals count as head-on.
pub fn approach_angle(normal: Vec3, direction: Vec3) -> f32 {
    if normal.length_squared() <= f32::EPSILON || direction.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    normal.angle_between(-direction)
}

fn sweep<S: PhysicsScene + ?Sized>(
    ctx: &mut SweepContext<'_, S>,
    start: Vec3,
    displacement: Vec3,
    step_offset: f32,
    depth: u32,
) -> MoveResult {
    let distance = displacement.length();

    if depth > MAX_RECURSION_DEPTH {
        log::debug!("horizontal sweep cut at depth {depth}, {distance:.4}m left");
        return MoveResult::unchanged(start, distance, SweepResult::miss(start, 0.0));
    }

    // A zero move still sweeps, to find and resolve an existing overlap
    let depenetration_only = distance < MIN_MOVE_DISTANCE;
    let (direction, sweep_distance) = if depenetration_only {
        (-UP, DEPENETRATION_SWEEP_DISTANCE)
    } else {
        (displacement / distance, distance)
    };

    let (half_height, lift) = cylinder_extent(ctx.half_height, step_offset);
    let origin = start + UP * lift;
    let result = ctx.cylinder_sweep(half_height, origin, direction, sweep_distance);

    ctx.report(SweepStep {
        pass: SweepPass::Horizontal,
        depth,
        origin,
        direction,
        distance: sweep_distance,
        result,
    });

    if result.initial_overlap {
        let corrected = correct_overlapping_position(start, &result);
        let next = sweep(ctx, corrected, displacement, step_offset, depth + 1);
        return MoveResult::corrective(start, next);
    }

    if depenetration_only {
        return MoveResult::unchanged(start, 0.0, result);
    }

    if !result.hit {
        return MoveResult::finished(start, start + displacement, 0.0, result);
    }

    let contact = start + direction * result.distance;
    let remaining = (distance - result.distance).max(0.0);
    let stopped = MoveResult::finished(start, contact, remaining, result);

    if remaining < MIN_MOVE_DISTANCE {
        return stopped;
    }

    let reprojected = if is_navigable(result.normal, ctx.settings.max_slope_angle) {
        project_vertically_on_plane(displacement, result.normal).normalize_or_zero() * remaining
    } else if approach_angle(result.normal, direction) > ctx.settings.wall_slide_angle {
        project_on_plane(direction * remaining, result.normal)
    } else {
        log::debug!("head-on wall hit at {contact}, stopping");
        return stopped;
    };

    let reprojected = clamp_horizontal_speed(reprojected, displacement);
    if reprojected.length() < MIN_MOVE_DISTANCE {
        return stopped;
    }

    let next = sweep(ctx, contact, reprojected, step_offset, depth + 1);
    stopped.subsequent(next)
}
