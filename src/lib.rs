//! diff_drive_pursuit - trajectory generation and pure pursuit tracking
//!
//! This crate turns a sparse list of waypoints into a smooth, speed-profiled
//! trajectory for a differential drive robot and follows it with a pure
//! pursuit controller that outputs left/right wheel velocities.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod path_planning;
pub mod path_tracking;

// Re-export common types for convenience
pub use common::{Point2D, Pose2D, WayPoint, Tangent, TrajPoint, DriveCharacterization, WheelCommand, Path2D};
pub use common::PathTracker;
pub use common::{RoboticsError, RoboticsResult};
pub use path_planning::{Trajectory, TrajectoryBuilder, TrajectoryConfig};
pub use path_tracking::{PurePursuitController, PurePursuitConfig, DiffDriveState};
