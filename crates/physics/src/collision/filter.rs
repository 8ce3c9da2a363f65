//! Collision layers, entity handles and query filters.
//!
//! Every sweep and ray cast is filtered by a layer mask plus a list of
//! entities to skip (usually the moving character itself).

use serde::{Deserialize, Serialize};

/// Opaque handle for something living in the physics scene.
///
/// The movement code never looks inside a collider; it only compares
/// handles to exclude itself and whatever the caller asked to ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Placeholder used for results that did not touch any entity.
    pub const NONE: Self = Self(u64::MAX);
}

/// Collision layer bit mask.
///
/// A collider belongs to one or more layers; a query only sees colliders
/// whose layers intersect its mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionLayers(pub u32);

impl CollisionLayers {
    /// Belongs to nothing, sees nothing.
    pub const NONE: Self = Self(0);

    /// Static world geometry - floors, walls, props that never move.
    pub const STATIC: Self = Self(1 << 0);

    /// Moving geometry - platforms, doors, pushable crates.
    pub const DYNAMIC: Self = Self(1 << 1);

    /// Other characters.
    pub const CHARACTER: Self = Self(1 << 2);

    /// Trigger volumes. Never blocks movement.
    pub const TRIGGER: Self = Self(1 << 3);

    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Default mask for character movement queries.
    pub const MASK_CHARACTER_MOVE: Self = Self(Self::STATIC.0 | Self::DYNAMIC.0);

    /// Check if all of `other`'s layers are set.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any layer is shared.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Combine two masks.
    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Remove layers from this mask.
    #[inline]
    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl std::ops::BitOr for CollisionLayers {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for CollisionLayers {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Filter applied to every scene query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Only colliders on these layers are considered.
    pub layers: CollisionLayers,
    /// Entities skipped regardless of their layers.
    pub ignored: Vec<EntityId>,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self::new(CollisionLayers::MASK_CHARACTER_MOVE)
    }
}

impl QueryFilter {
    /// Create a filter that sees `layers` and ignores nobody.
    pub fn new(layers: CollisionLayers) -> Self {
        Self {
            layers,
            ignored: Vec::new(),
        }
    }

    /// Add an entity to the ignore list.
    pub fn ignoring(mut self, entity: EntityId) -> Self {
        if !self.ignored.contains(&entity) {
            self.ignored.push(entity);
        }
        self
    }

    /// Add several entities to the ignore list.
    pub fn ignoring_all(mut self, entities: impl IntoIterator<Item = EntityId>) -> Self {
        for entity in entities {
            self = self.ignoring(entity);
        }
        self
    }

    /// Whether a collider owned by `entity` on `layers` takes part in the query.
    #[inline]
    pub fn accepts(&self, entity: EntityId, layers: CollisionLayers) -> bool {
        self.layers.intersects(layers) && !self.ignored.contains(&entity)
    }
}
