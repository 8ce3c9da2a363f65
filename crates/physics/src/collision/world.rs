//! Reference physics scene built on parry3d.
//!
//! [`CollisionWorld`] stores colliders in a flat list and answers the
//! queries of [`PhysicsScene`] by testing every accepted collider. It has
//! no broad phase and no dynamics; it exists so the movement code can run
//! against real geometry in tests and small tools.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::na::{Quaternion, Translation3, Unit, UnitQuaternion};
use parry3d::query::{self, Ray, ShapeCastOptions};
use parry3d::shape::{Cuboid, Shape, SharedShape};

use super::filter::{CollisionLayers, EntityId, QueryFilter};
use super::query::{QueryError, RayCastResult, SweepResult};
use super::scene::PhysicsScene;

/// Gap left between a swept shape and whatever stopped it (meters).
pub const CONTACT_SKIN: f32 = 0.001;

/// A collider in the world.
#[derive(Clone)]
pub struct Collider {
    /// Handle returned when the collider was added.
    pub entity: EntityId,
    /// The collision shape.
    pub shape: SharedShape,
    /// Position and orientation in world space.
    pub transform: Isometry<Real>,
    /// Layers this collider belongs to.
    pub layers: CollisionLayers,
}

impl std::fmt::Debug for Collider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collider")
            .field("entity", &self.entity)
            .field("shape", &self.shape.shape_type())
            .field("transform", &self.transform)
            .field("layers", &self.layers)
            .finish()
    }
}

/// The collision world containing all geometry.
///
/// # Thread Safety
///
/// Queries only need `&self`. Share the world behind a
/// `parking_lot::RwLock` and take the write lock for edits.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    colliders: Vec<Collider>,
    next_id: u64,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis-aligned box.
    pub fn add_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        layers: CollisionLayers,
    ) -> EntityId {
        self.add_oriented_box(center, Quat::IDENTITY, half_extents, layers)
    }

    /// Add a rotated box.
    pub fn add_oriented_box(
        &mut self,
        center: Vec3,
        rotation: Quat,
        half_extents: Vec3,
        layers: CollisionLayers,
    ) -> EntityId {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.insert(shape, isometry(center, rotation), layers)
    }

    /// Add an infinite plane. Everything behind `normal` is solid.
    pub fn add_half_space(
        &mut self,
        point: Vec3,
        normal: Vec3,
        layers: CollisionLayers,
    ) -> EntityId {
        let normal = Unit::new_normalize(to_vector(normal));
        self.insert(SharedShape::halfspace(normal), isometry(point, Quat::IDENTITY), layers)
    }

    /// Add a convex hull.
    ///
    /// Returns `None` if the hull couldn't be computed.
    pub fn add_convex_hull(
        &mut self,
        points: &[Vec3],
        layers: CollisionLayers,
    ) -> Option<EntityId> {
        let points: Vec<Point<Real>> = points.iter().copied().map(to_point).collect();
        let shape = SharedShape::convex_hull(&points)?;
        Some(self.insert(shape, Isometry::identity(), layers))
    }

    /// Add a triangle mesh.
    ///
    /// Fails if there are no triangles or an index is out of range.
    pub fn add_triangle_mesh(
        &mut self,
        vertices: &[Vec3],
        indices: &[[u32; 3]],
        layers: CollisionLayers,
    ) -> Result<EntityId, QueryError> {
        let in_range = |index: &u32| (*index as usize) < vertices.len();
        if indices.is_empty() || !indices.iter().flatten().all(in_range) {
            return Err(QueryError::InvalidQuery("malformed triangle mesh"));
        }

        let vertices: Vec<Point<Real>> = vertices.iter().copied().map(to_point).collect();
        let shape = SharedShape::trimesh(vertices, indices.to_vec());
        Ok(self.insert(shape, Isometry::identity(), layers))
    }

    /// Remove a collider. Returns whether it existed.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let before = self.colliders.len();
        self.colliders.retain(|collider| collider.entity != entity);
        self.colliders.len() != before
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    /// Get the number of colliders.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn insert(
        &mut self,
        shape: SharedShape,
        transform: Isometry<Real>,
        layers: CollisionLayers,
    ) -> EntityId {
        let entity = EntityId(self.next_id);
        self.next_id += 1;
        self.colliders.push(Collider {
            entity,
            shape,
            transform,
            layers,
        });
        entity
    }

    fn accepted<'a>(&'a self, filter: &'a QueryFilter) -> impl Iterator<Item = &'a Collider> + 'a {
        self.colliders
            .iter()
            .filter(move |collider| filter.accepts(collider.entity, collider.layers))
    }

    /// Sweep any shape. Overlaps at the origin win over blocking hits.
    #[allow(clippy::too_many_arguments)]
    fn sweep(
        &self,
        shape: &SharedShape,
        orientation: Quat,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
        kind: &'static str,
    ) -> Result<SweepResult, QueryError> {
        let direction = direction.normalize_or_zero();
        let finite = origin.is_finite() && max_distance.is_finite();
        if direction == Vec3::ZERO || !finite || max_distance < 0.0 {
            return Err(QueryError::InvalidQuery(
                "sweep needs a direction and a finite distance",
            ));
        }

        let pose = isometry(origin, orientation * upright());

        // Deepest overlap at the origin, if any
        let mut deepest: Option<(f32, Vec3, Vec3, EntityId)> = None;
        for collider in self.accepted(filter) {
            // Collider first, so normal1 points out of it towards the shape
            let contact = query::contact(
                &collider.transform,
                collider.shape.as_ref(),
                &pose,
                shape.as_ref(),
                0.0,
            )
            .map_err(|_| QueryError::UnsupportedShapePair(kind))?;
            let mut overlap =
                contact.map(|c| (-c.dist, from_vector(&c.normal1), from_point(&c.point1)));

            // EPA loses deep overlaps against boxes much larger than the shape
            if let Some(cuboid) = collider.shape.as_cuboid() {
                let shallow = overlap.map_or(true, |(depth, ..)| depth < CONTACT_SKIN);
                if shallow
                    && query::intersection_test(
                        &collider.transform,
                        collider.shape.as_ref(),
                        &pose,
                        shape.as_ref(),
                    )
                    .map_err(|_| QueryError::UnsupportedShapePair(kind))?
                {
                    overlap = cuboid_penetration(cuboid, &collider.transform, shape.as_ref(), &pose)
                        .or(overlap);
                }
            }

            if let Some((depth, normal, point)) = overlap {
                if depth >= 0.0 && deepest.as_ref().map_or(true, |(best, ..)| depth > *best) {
                    deepest = Some((depth, normal, point, collider.entity));
                }
            }
        }

        if let Some((depth, normal, point, entity)) = deepest {
            return Ok(SweepResult::overlapping(
                origin,
                max_distance,
                normal,
                point,
                depth,
                entity,
            ));
        }

        // Earliest time of impact along the direction
        let velocity = to_vector(direction);
        let mut closest: Option<(f32, Vec3, Vec3, EntityId)> = None;
        for collider in self.accepted(filter) {
            let options = ShapeCastOptions {
                max_time_of_impact: max_distance,
                target_distance: 0.0,
                stop_at_penetration: true,
                compute_impact_geometry_on_penetration: true,
            };
            let hit = query::cast_shapes(
                &pose,
                &velocity,
                shape.as_ref(),
                &collider.transform,
                &Vector::zeros(),
                collider.shape.as_ref(),
                options,
            )
            .map_err(|_| QueryError::UnsupportedShapePair(kind))?;

            if let Some(hit) = hit {
                let toi = hit.time_of_impact;
                if toi <= max_distance && closest.as_ref().map_or(true, |(best, ..)| toi < *best) {
                    let normal =
                        from_vector(&(collider.transform.rotation * hit.normal2.into_inner()));
                    let point = from_point(&(collider.transform * hit.witness2));
                    closest = Some((toi, normal, point, collider.entity));
                }
            }
        }

        Ok(match closest {
            Some((toi, normal, point, entity)) => {
                let distance = (toi - CONTACT_SKIN).max(0.0);
                SweepResult::blocked(
                    origin + direction * distance,
                    distance,
                    max_distance,
                    normal.normalize_or_zero(),
                    point,
                    entity,
                )
            }
            None => SweepResult::miss(origin + direction * max_distance, max_distance),
        })
    }
}

impl PhysicsScene for CollisionWorld {
    fn cylinder_sweep(
        &self,
        half_height: f32,
        radius: f32,
        orientation: Quat,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Result<SweepResult, QueryError> {
        if half_height <= 0.0 || radius <= 0.0 {
            return Err(QueryError::InvalidQuery("cylinder needs a positive size"));
        }
        let shape = SharedShape::cylinder(half_height, radius);
        self.sweep(&shape, orientation, origin, direction, max_distance, filter, "cylinder")
    }

    fn capsule_sweep(
        &self,
        half_height: f32,
        radius: f32,
        orientation: Quat,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Result<SweepResult, QueryError> {
        if radius <= 0.0 {
            return Err(QueryError::InvalidQuery("capsule needs a positive radius"));
        }
        // Parry capsules are defined by the half-length of the inner segment
        let shape = SharedShape::capsule_y((half_height - radius).max(0.0), radius);
        self.sweep(&shape, orientation, origin, direction, max_distance, filter, "capsule")
    }

    fn ray_cast(
        &self,
        start: Vec3,
        end: Vec3,
        filter: &QueryFilter,
    ) -> Result<RayCastResult, QueryError> {
        let delta = end - start;
        let length = delta.length();
        if !length.is_finite() || length < 1e-6 {
            return Err(QueryError::InvalidQuery("ray needs distinct finite end points"));
        }

        let dir = delta / length;
        let ray = Ray::new(to_point(start), to_vector(dir));

        let mut closest: Option<(f32, Vec3, EntityId)> = None;
        for collider in self.accepted(filter) {
            if let Some(hit) = collider
                .shape
                .cast_ray_and_get_normal(&collider.transform, &ray, length, true)
            {
                let toi = hit.time_of_impact;
                if closest.as_ref().map_or(true, |(best, ..)| toi < *best) {
                    closest = Some((toi, from_vector(&hit.normal), collider.entity));
                }
            }
        }

        Ok(match closest {
            Some((distance, normal, entity)) => RayCastResult {
                hit: true,
                point: start + dir * distance,
                normal: normal.normalize_or_zero(),
                distance,
                entity,
            },
            None => RayCastResult::miss(end, length),
        })
    }
}

/// How far `shape` has to move out of `cuboid` along each face normal.
///
/// Returns the shallowest face as depth, outward normal and the deepest
/// point of the shape pushed back onto that face. Face normals only, so
/// the depth can exceed the true one near edges.
fn cuboid_penetration(
    cuboid: &Cuboid,
    cuboid_pose: &Isometry<Real>,
    shape: &dyn Shape,
    pose: &Isometry<Real>,
) -> Option<(f32, Vec3, Vec3)> {
    let support = shape.as_support_map()?;
    let center = cuboid_pose.translation.vector;

    let mut best: Option<(f32, Vec3, Vec3)> = None;
    for axis in 0..3 {
        let face_axis = cuboid_pose.rotation * Vector::ith(axis, 1.0);
        for normal in [face_axis, -face_axis] {
            let face = center.dot(&normal) + cuboid.half_extents[axis];
            let deepest = support.support_point(pose, &-normal);
            let depth = face - deepest.coords.dot(&normal);
            if best.as_ref().map_or(true, |(shallowest, ..)| depth < *shallowest) {
                let on_face = deepest + normal * depth;
                best = Some((depth, from_vector(&normal), from_point(&on_face)));
            }
        }
    }
    best
}

// ============================================================================
// glam <-> nalgebra
// ============================================================================

/// Rotation taking parry's `+Y` shape axis onto the world up axis `+Z`.
fn upright() -> Quat {
    Quat::from_rotation_x(FRAC_PI_2)
}

fn isometry(translation: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(
        rotation.w, rotation.x, rotation.y, rotation.z,
    ));
    Isometry::from_parts(Translation3::new(translation.x, translation.y, translation.z), rotation)
}

fn to_point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

fn from_point(p: &Point<Real>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

// ============================================================================
// Tests
// ============================================================================
