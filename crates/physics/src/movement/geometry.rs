//! Vector helpers shared by the resolvers: plane projections, the speed
//! clamp, slope classification and depenetration.

use glam::Vec3;

use crate::collision::SweepResult;

use super::settings::SEPARATION_DISTANCE;
use super::UP;

/// Angle between a surface normal and the up axis (radians).
///
/// Degenerate normals count as vertical walls.
pub fn slope_angle(normal: Vec3) -> f32 {
    let normal = normal.normalize_or_zero();
    if normal == Vec3::ZERO {
        return std::f32::consts::FRAC_PI_2;
    }
    normal.dot(UP).clamp(-1.0, 1.0).acos()
}

/// Whether a surface can be walked on. The comparison is strict.
#[inline]
pub fn is_navigable(normal: Vec3, max_slope_angle: f32) -> bool {
    slope_angle(normal) < max_slope_angle
}

/// Remove the component of `vector` going along `normal`.
///
/// This is the slide projection: vertical momentum survives, so a falling
/// character keeps falling while sliding along a wall.
pub fn project_on_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    let normal = normal.normalize_or_zero();
    vector - normal * vector.dot(normal)
}

/// Move `vector` along the up axis until it lies in the plane of `normal`.
///
/// Unlike [`project_on_plane`] the horizontal part is untouched, so walking
/// up or down a slope never skews the heading. Falls back to the regular
/// projection for (near) vertical planes.
pub fn project_vertically_on_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    let normal = normal.normalize_or_zero();
    let up_dot = normal.dot(UP);
    if up_dot.abs() < 1.0e-4 {
        return project_on_plane(vector, normal);
    }
    vector - UP * (vector.dot(normal) / up_dot)
}

/// Part of `vector` perpendicular to the up axis.
#[inline]
pub fn horizontal(vector: Vec3) -> Vec3 {
    vector - UP * vector.dot(UP)
}

/// Scale down the horizontal part of `vector` so it is no longer than the
/// horizontal part of `reference`. The vertical part is kept.
pub fn clamp_horizontal_speed(vector: Vec3, reference: Vec3) -> Vec3 {
    let flat = horizontal(vector);
    let length = flat.length();
    let limit = horizontal(reference).length();
    if length <= limit || length <= f32::EPSILON {
        return vector;
    }
    vector - flat + flat * (limit / length)
}

/// Push `start` out of the overlap reported by `sweep`.
///
/// The push runs along the contact normal for the penetration depth plus
/// [`SEPARATION_DISTANCE`]. A depth of exactly zero comes with an
/// unreliable normal, so the direction is rebuilt from the contact point
/// towards the sweep origin instead.
pub fn correct_overlapping_position(start: Vec3, sweep: &SweepResult) -> Vec3 {
    let direction = if sweep.penetration_depth == 0.0 {
        let rebuilt = (sweep.shape_position - sweep.contact_point).normalize_or_zero();
        if rebuilt == Vec3::ZERO {
            sweep.normal.normalize_or_zero()
        } else {
            rebuilt
        }
    } else {
        sweep.normal.normalize_or_zero()
    };
    let direction = if direction == Vec3::ZERO { UP } else { direction };

    start + direction * (sweep.penetration_depth.max(0.0) + SEPARATION_DISTANCE)
}
