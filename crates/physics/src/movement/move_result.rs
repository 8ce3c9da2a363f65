//! Outcome of a chain of sweeps.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::SweepResult;

/// Where a (possibly recursive) sweep started, got pushed to, and ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveResult {
    /// Position the chain started from.
    pub initial_position: Vec3,

    /// Start position after depenetration (equal to `initial_position`
    /// when nothing overlapped).
    pub corrected_position: Vec3,

    /// Position the chain ended at.
    pub final_position: Vec3,

    /// Requested distance that was not travelled. Never negative.
    pub remaining_distance: f32,

    /// Raw result of the last sweep in the chain.
    pub sweep: SweepResult,
}

impl MoveResult {
    /// Nothing moved; `remaining_distance` is left for the caller.
    pub fn unchanged(position: Vec3, remaining_distance: f32, sweep: SweepResult) -> Self {
        Self {
            initial_position: position,
            corrected_position: position,
            final_position: position,
            remaining_distance: remaining_distance.max(0.0),
            sweep,
        }
    }

    /// A single sweep from `start` that ended at `end`.
    pub fn finished(start: Vec3, end: Vec3, remaining_distance: f32, sweep: SweepResult) -> Self {
        Self {
            initial_position: start,
            corrected_position: start,
            final_position: end,
            remaining_distance: remaining_distance.max(0.0),
            sweep,
        }
    }

    /// Merge the move that ran after pushing `start` out of an overlap.
    ///
    /// The pushed-out start and everything after it come from `corrected`.
    pub fn corrective(start: Vec3, corrected: MoveResult) -> Self {
        Self {
            initial_position: start,
            ..corrected
        }
    }

    /// Merge the move that continued from this one's end position.
    pub fn subsequent(self, next: MoveResult) -> Self {
        Self {
            initial_position: self.initial_position,
            corrected_position: self.corrected_position,
            final_position: next.final_position,
            remaining_distance: next.remaining_distance,
            sweep: next.sweep,
        }
    }

    /// Total displacement from the initial position.
    #[inline]
    pub fn displacement(&self) -> Vec3 {
        self.final_position - self.initial_position
    }

    /// Whether the start had to be pushed out of geometry.
    #[inline]
    pub fn was_corrected(&self) -> bool {
        self.corrected_position != self.initial_position
    }
}
