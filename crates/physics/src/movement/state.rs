//! Floor classification and the state a character keeps between frames.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::UP;

/// What the character is standing on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloorType {
    /// A floor flat enough to walk on.
    Navigable,
    /// A slope too steep to stand on.
    Unnavigable,
    /// Airborne.
    #[default]
    NoFloor,
}

/// What the vertical resolver touched at the end of its sweep chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum GroundContact {
    /// Nothing below (or above) within reach.
    #[default]
    None,
    /// A surface below the character.
    Floor {
        /// Refined surface normal.
        normal: Vec3,
        /// Classification of that surface.
        floor_type: FloorType,
    },
    /// A surface above the character, hit while moving up.
    Ceiling {
        /// Surface normal.
        normal: Vec3,
    },
}

/// Persistent per-character state, updated once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRuntimeState {
    /// Current floor classification.
    pub floor_type: FloorType,

    /// Normal of the current floor (up when airborne).
    pub floor_normal: Vec3,

    /// Speed along the up axis (meters/second, positive is up).
    pub vertical_speed: f32,

    /// Time spent without a floor (seconds).
    pub in_air_time: f32,

    /// Whether gravity is integrated.
    pub gravity_enabled: bool,

    /// Whether the resolvers step over small obstacles.
    pub step_height_enabled: bool,

    /// Whether the desired displacement is projected on a navigable floor.
    pub floor_projection_enabled: bool,
}

impl Default for CharacterRuntimeState {
    fn default() -> Self {
        Self {
            floor_type: FloorType::NoFloor,
            floor_normal: UP,
            vertical_speed: 0.0,
            in_air_time: 0.0,
            gravity_enabled: true,
            step_height_enabled: true,
            floor_projection_enabled: true,
        }
    }
}

impl CharacterRuntimeState {
    /// Whether any floor, navigable or not, is under the character.
    #[inline]
    pub fn has_floor(&self) -> bool {
        self.floor_type != FloorType::NoFloor
    }

    /// Fold the vertical resolver's outcome into the state.
    pub fn apply_ground_contact(&mut self, contact: GroundContact, delta_time: f32) {
        match contact {
            GroundContact::Floor { normal, floor_type } => {
                self.floor_type = floor_type;
                self.floor_normal = normal;
                self.vertical_speed = 0.0;
                self.in_air_time = 0.0;
            }
            GroundContact::Ceiling { .. } => {
                self.floor_type = FloorType::NoFloor;
                self.floor_normal = UP;
                self.vertical_speed = self.vertical_speed.min(0.0);
                self.in_air_time += delta_time;
            }
            GroundContact::None => {
                self.floor_type = FloorType::NoFloor;
                self.floor_normal = UP;
                self.in_air_time += delta_time;
            }
        }
    }
}
