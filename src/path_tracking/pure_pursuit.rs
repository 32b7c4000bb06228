//! Pure pursuit path tracking for a differential drive robot
//!
//! Each control cycle the controller finds the trajectory point closest to
//! the robot, picks a lookahead point roughly one lookahead radius further
//! along, and steers along the arc that passes through it. The speed demand
//! is the profiled velocity of the closest point.
//!
//! The searches are pure functions over `(trajectory, position, start)`.
//! The controller owns the cursor that feeds them and only ever moves it
//! forward, so a trajectory can be shared between several controllers.
//!
//! Ref:
//!     - PythonRobotics: https://github.com/AtsushiSakai/PythonRobotics
//!     - R. C. Coulter, "Implementation of the Pure Pursuit Path Tracking
//!       Algorithm", CMU-RI-TR-92-01

use std::sync::Arc;

use itertools::Itertools;
use log::{info, trace, warn};
use ordered_float::OrderedFloat;
use serde::Deserialize;

use crate::common::{
    DriveCharacterization, PathTracker, Point2D, Pose2D, RoboticsError, RoboticsResult,
    TrajPoint, WheelCommand,
};
use crate::path_planning::Trajectory;

/// Configuration for the pure pursuit controller
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PurePursuitConfig {
    /// Maximum lookahead distance [m]
    pub lookahead_distance: f64,
    /// Half width of the band around the lookahead radius [m]
    pub lookahead_tolerance: f64,
    /// Distance to the lookahead point at which the path is complete [m]
    pub completion_tolerance: f64,
    /// Calibration constant k applied to the differential term
    pub wheel_gain: f64,
}

impl Default for PurePursuitConfig {
    fn default() -> Self {
        Self {
            lookahead_distance: 6.0,
            lookahead_tolerance: 0.5,
            completion_tolerance: 1.0,
            wheel_gain: 1.0,
        }
    }
}

impl PurePursuitConfig {
    fn validate(&self) -> RoboticsResult<()> {
        if !(self.lookahead_distance.is_finite() && self.lookahead_distance > 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "lookahead_distance must be positive, got {}", self.lookahead_distance
            )));
        }
        if !(self.lookahead_tolerance >= 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "lookahead_tolerance must not be negative, got {}", self.lookahead_tolerance
            )));
        }
        if !(self.completion_tolerance >= 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "completion_tolerance must not be negative, got {}", self.completion_tolerance
            )));
        }
        if !self.wheel_gain.is_finite() {
            return Err(RoboticsError::InvalidParameter(format!(
                "wheel_gain must be finite, got {}", self.wheel_gain
            )));
        }
        Ok(())
    }
}

/// Search positions of a controller along its trajectory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackingCursor {
    pub closest_index: usize,
    pub lookahead_index: usize,
}

/// Execution mode of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
    Tracking,
    /// Terminal until `reset`
    Finished,
}

/// Index of the point nearest to `position`, searching from `start` onward.
///
/// Ties resolve to the earliest index. Returns `None` if `start` is past the
/// end of the trajectory.
pub fn find_closest_point(trajectory: &Trajectory, position: &Point2D, start: usize) -> Option<usize> {
    trajectory.points_from(start)
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| OrderedFloat(p.position().distance_squared(position)))
        .map(|(i, _)| start + i)
}

/// Index of the farthest point, from `start` onward, whose distance to
/// `position` is within `tolerance` of `radius`.
pub fn find_lookahead_point(
    trajectory: &Trajectory,
    position: &Point2D,
    start: usize,
    radius: f64,
    tolerance: f64,
) -> Option<usize> {
    trajectory.points_from(start)
        .iter()
        .enumerate()
        .filter(|(_, p)| (p.position().distance(position) - radius).abs() <= tolerance)
        .map(|(i, _)| start + i)
        .last()
}

/// Index of the first point at least `distance` of path length past `start`.
///
/// Falls back to the last index when less than `distance` of path remains.
pub fn find_point_along(trajectory: &Trajectory, start: usize, distance: f64) -> usize {
    let mut travelled = 0.0;
    for (i, (a, b)) in trajectory.points_from(start).iter().tuple_windows().enumerate() {
        travelled += a.distance(b);
        if travelled >= distance {
            return start + i + 1;
        }
    }
    trajectory.len().saturating_sub(1)
}

/// Signed curvature of the arc from `pose`, tangent to its heading, through
/// `target`. Positive when the target is to the left of the heading.
pub fn arc_curvature(target: &Point2D, pose: &Pose2D) -> f64 {
    let to_target = target.to_vector() - pose.position().to_vector();
    let dist_sq = to_target.norm_squared();
    if dist_sq == 0.0 {
        return 0.0;
    }

    // perpendicular offset of the target from the heading line
    let cross = pose.heading_vector().perp(&to_target);
    let offset = cross.abs();
    let sign = if cross > 0.0 { 1.0 } else { -1.0 };

    sign * 2.0 * offset / dist_sq
}

/// Pure pursuit trajectory tracking controller
pub struct PurePursuitController {
    config: PurePursuitConfig,
    trajectory: Arc<Trajectory>,
    drive: DriveCharacterization,
    cursor: TrackingCursor,
    mode: TrackingMode,
}

impl PurePursuitController {
    /// Create a new controller following `trajectory`
    pub fn new(
        trajectory: Arc<Trajectory>,
        drive: DriveCharacterization,
        config: PurePursuitConfig,
    ) -> RoboticsResult<Self> {
        config.validate()?;
        if trajectory.is_empty() {
            return Err(RoboticsError::InvalidParameter(
                "cannot track an empty trajectory".to_string(),
            ));
        }
        let invalid = drive.invalid_fields();
        if !invalid.is_empty() {
            return Err(RoboticsError::InvalidParameter(format!(
                "drive characterization fields must be positive and finite: {}",
                invalid.join(", ")
            )));
        }

        Ok(PurePursuitController {
            config,
            trajectory,
            drive,
            cursor: TrackingCursor::default(),
            mode: TrackingMode::Tracking,
        })
    }

    /// Create with the default tracking config
    pub fn with_defaults(trajectory: Arc<Trajectory>, drive: DriveCharacterization) -> RoboticsResult<Self> {
        Self::new(trajectory, drive, PurePursuitConfig::default())
    }

    pub fn config(&self) -> &PurePursuitConfig {
        &self.config
    }

    pub fn trajectory(&self) -> &Arc<Trajectory> {
        &self.trajectory
    }

    pub fn drive(&self) -> &DriveCharacterization {
        &self.drive
    }

    pub fn cursor(&self) -> TrackingCursor {
        self.cursor
    }

    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    /// Move the cursor explicitly.
    ///
    /// Returns false, leaving the cursor untouched, if either index is out of
    /// bounds.
    pub fn set_cursor(&mut self, closest_index: usize, lookahead_index: usize) -> bool {
        let len = self.trajectory.len();
        if closest_index >= len || lookahead_index >= len {
            warn!(
                "Rejected cursor ({}, {}) for trajectory of {} points",
                closest_index, lookahead_index, len
            );
            return false;
        }
        self.cursor = TrackingCursor { closest_index, lookahead_index };
        true
    }

    /// Lookahead radius for the given closest point, shrunk on tight turns
    pub fn lookahead_radius(&self, closest: &TrajPoint) -> f64 {
        let k = closest.curvature.abs();
        if k == 0.0 {
            self.config.lookahead_distance
        } else {
            (1.0 / k).min(self.config.lookahead_distance)
        }
    }

    /// Wheel command steering from `pose` towards `target` at `velocity`
    pub fn pursue_point(&self, target: &Point2D, pose: &Pose2D, velocity: f64) -> WheelCommand {
        let curvature = arc_curvature(target, pose);
        let differential = curvature * self.drive.track_width / 2.0 * self.config.wheel_gain;
        WheelCommand::new(velocity * (1.0 - differential), velocity * (1.0 + differential))
    }

    /// Run one control cycle
    pub fn track(&mut self, pose: &Pose2D) -> WheelCommand {
        if self.mode == TrackingMode::Finished {
            return WheelCommand::zero();
        }

        let position = pose.position();

        // ---- CLOSEST POINT ----
        let closest_index = find_closest_point(&self.trajectory, &position, self.cursor.closest_index)
            .unwrap_or(self.cursor.closest_index);
        self.cursor.closest_index = closest_index;
        let closest = self.trajectory.points()[closest_index];

        // ---- LOOKAHEAD POINT ----
        let radius = self.lookahead_radius(&closest);
        let search_start = self.cursor.lookahead_index.max(closest_index);
        let lookahead_index = find_lookahead_point(
            &self.trajectory,
            &position,
            search_start,
            radius,
            self.config.lookahead_tolerance,
        )
        // Nothing in the band: the path ahead either folds back inside the
        // radius or lies entirely outside it. Chase the point one radius on.
        .unwrap_or_else(|| find_point_along(&self.trajectory, search_start, radius));
        self.cursor.lookahead_index = lookahead_index;
        let lookahead = self.trajectory.points()[lookahead_index].position();

        // ---- COMPLETION ----
        let lookahead_dist = lookahead.distance(&position);
        if lookahead_dist <= self.config.completion_tolerance {
            info!(
                "Path complete at ({:.3}, {:.3}), {:.3} from lookahead point {}",
                pose.x, pose.y, lookahead_dist, lookahead_index
            );
            self.mode = TrackingMode::Finished;
            return WheelCommand::zero();
        }

        // ---- COMMAND GENERATION ----

        // The start of the profile is at rest, so pull away at the speed of
        // the next sample instead.
        let target_velocity = if closest_index == 0 {
            self.trajectory.get(1).map_or(closest.velocity, |p| p.velocity)
        } else {
            closest.velocity
        };

        let cmd = self.pursue_point(&lookahead, pose, target_velocity);
        trace!(
            "closest {} lookahead {} radius {:.3} velocity {:.3} -> left {:.3} right {:.3}",
            closest_index, lookahead_index, radius, target_velocity, cmd.left, cmd.right
        );
        cmd
    }

    pub fn is_finished(&self) -> bool {
        self.mode == TrackingMode::Finished
    }

    /// Clear the cursor and finished flag so the path can be run again
    pub fn reset(&mut self) {
        self.cursor = TrackingCursor::default();
        self.mode = TrackingMode::Tracking;
        info!("Pure pursuit reset");
    }
}

impl PathTracker for PurePursuitController {
    fn track(&mut self, pose: &Pose2D) -> WheelCommand {
        PurePursuitController::track(self, pose)
    }

    fn is_finished(&self) -> bool {
        PurePursuitController::is_finished(self)
    }

    fn reset(&mut self) {
        PurePursuitController::reset(self)
    }
}
