//! Debug hook called at every sweep the resolvers issue.
//!
//! Keeps drawing and logging of intermediate sweeps out of the resolvers.

use glam::Vec3;

use crate::collision::SweepResult;

/// Which resolver issued a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepPass {
    /// Cylinder sweep of the horizontal resolver.
    Horizontal,
    /// Capsule sweep of the vertical resolver, moving up.
    VerticalUp,
    /// Capsule sweep of the vertical resolver, moving down.
    VerticalDown,
}

/// One sweep, as seen by an observer.
#[derive(Debug, Clone, Copy)]
pub struct SweepStep {
    pub pass: SweepPass,
    /// Recursion depth, 0 for the first sweep of a pass.
    pub depth: u32,
    /// Origin of the swept shape.
    pub origin: Vec3,
    pub direction: Vec3,
    pub distance: f32,
    pub result: SweepResult,
}

/// Receives every sweep step while debug sweeps are enabled.
pub trait SweepObserver {
    fn on_sweep_step(&mut self, step: &SweepStep);
}

impl<F: FnMut(&SweepStep)> SweepObserver for F {
    fn on_sweep_step(&mut self, step: &SweepStep) {
        self(step);
    }
}
