//! Common traits defining interfaces for tracking algorithms

use crate::common::types::*;

/// Trait for path tracking/following algorithms driven once per control cycle
pub trait PathTracker {
    /// Compute the wheel command for the current pose
    fn track(&mut self, pose: &Pose2D) -> WheelCommand;

    /// Check if the end of the path has been reached
    fn is_finished(&self) -> bool;

    /// Re-arm the tracker to follow its path from the start
    fn reset(&mut self);
}
