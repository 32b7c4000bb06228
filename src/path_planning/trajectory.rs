//! Trajectory generation from sparse waypoints
//!
//! Building a trajectory runs four steps once:
//!
//! 1. Interior waypoint tangents by central difference (Catmull-Rom style).
//!    Endpoint tangents come from the waypoints themselves.
//! 2. Dense sampling of a cubic Hermite segment per waypoint pair.
//! 3. Curvature at every sample from the circle through it and its two
//!    neighbours.
//! 4. A velocity profile capped by top speed and curvature, then limited
//!    by a forward (acceleration) and a backward (deceleration) pass.
//!
//! The result is immutable and may be shared between trackers.

use itertools::Itertools;
use log::debug;
use nalgebra::Vector2;
use serde::Deserialize;

use crate::common::{
    DriveCharacterization, Path2D, Point2D, RoboticsError, RoboticsResult, TrajPoint, WayPoint,
};
use super::hermite_interpolator::interpolate;

/// Configuration for trajectory generation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// Approximate distance between samples [m]
    pub point_spacing: f64,
    /// Circles at or above this radius are treated as straight [m]
    pub max_radius: f64,
    /// Circumcircle determinants below this magnitude are treated as collinear
    pub collinear_epsilon: f64,
    /// Lateral scaling constant K in `max_velocity / (curvature * K)`
    pub curvature_speed_scale: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            point_spacing: 0.25,
            max_radius: 1.0e4,
            collinear_epsilon: 1.0e-9,
            curvature_speed_scale: 50.0,
        }
    }
}

impl TrajectoryConfig {
    fn validate(&self) -> RoboticsResult<()> {
        if !(self.point_spacing.is_finite() && self.point_spacing > 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "point_spacing must be positive, got {}", self.point_spacing
            )));
        }
        if !(self.max_radius > 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "max_radius must be positive, got {}", self.max_radius
            )));
        }
        if !(self.collinear_epsilon >= 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "collinear_epsilon must not be negative, got {}", self.collinear_epsilon
            )));
        }
        if !(self.curvature_speed_scale.is_finite() && self.curvature_speed_scale > 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "curvature_speed_scale must be positive, got {}", self.curvature_speed_scale
            )));
        }
        Ok(())
    }
}

/// Arc-length ordered, speed-profiled path
#[derive(Debug, Clone)]
pub struct Trajectory {
    points: Vec<TrajPoint>,
}

impl Trajectory {
    /// Build a trajectory with the default generation config
    pub fn new(waypoints: &[WayPoint], drive: &DriveCharacterization) -> RoboticsResult<Self> {
        TrajectoryBuilder::with_defaults().build(waypoints, drive)
    }

    /// All trajectory points
    pub fn points(&self) -> &[TrajPoint] {
        &self.points
    }

    /// Points from `index` to the end. Empty if `index` is past the end.
    ///
    /// Callers searching forward should only ever pass non-decreasing
    /// indices.
    pub fn points_from(&self, index: usize) -> &[TrajPoint] {
        &self.points[index.min(self.points.len())..]
    }

    pub fn get(&self, index: usize) -> Option<&TrajPoint> {
        self.points.get(index)
    }

    pub fn first(&self) -> Option<&TrajPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrajPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total_length(&self) -> f64 {
        self.points.iter()
            .tuple_windows()
            .map(|(a, b)| a.distance(b))
            .sum()
    }

    /// Highest profiled velocity along the trajectory
    pub fn max_velocity(&self) -> f64 {
        self.points.iter().map(|p| p.velocity).fold(0.0, f64::max)
    }

    pub fn to_path2d(&self) -> Path2D {
        Path2D::from_points(self.points.iter().map(|p| p.position()).collect())
    }
}

/// Builds trajectories from waypoints
#[derive(Debug, Clone)]
pub struct TrajectoryBuilder {
    config: TrajectoryConfig,
}

impl TrajectoryBuilder {
    pub fn new(config: TrajectoryConfig) -> Self {
        TrajectoryBuilder { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(TrajectoryConfig::default())
    }

    pub fn config(&self) -> &TrajectoryConfig {
        &self.config
    }

    pub fn build(
        &self,
        waypoints: &[WayPoint],
        drive: &DriveCharacterization,
    ) -> RoboticsResult<Trajectory> {
        self.config.validate()?;
        validate_waypoints(waypoints)?;

        let invalid = drive.invalid_fields();
        if !invalid.is_empty() {
            return Err(RoboticsError::InvalidParameter(format!(
                "drive characterization fields must be positive and finite: {}",
                invalid.join(", ")
            )));
        }

        let tangents = estimate_tangents(waypoints);
        if let Some(i) = tangents.iter().position(|m| !(m.x.is_finite() && m.y.is_finite())) {
            return Err(RoboticsError::NumericalError(format!(
                "tangent at waypoint {} is not finite", i
            )));
        }

        let mut points: Vec<TrajPoint> = Vec::new();
        for i in 0..waypoints.len() - 1 {
            let segment = interpolate(
                waypoints[i].position(),
                tangents[i],
                waypoints[i + 1].position(),
                tangents[i + 1],
                self.config.point_spacing,
            )?;
            points.extend(segment.into_iter().map(|p| TrajPoint::new(p.x, p.y)));
        }
        if let Some(end) = waypoints.last() {
            points.push(TrajPoint::new(end.x, end.y));
        }

        calc_curvature(&mut points, &self.config);
        calc_feasible_velocity(&mut points, drive, self.config.curvature_speed_scale);
        limit_acceleration(&mut points, drive.max_acceleration);

        let trajectory = Trajectory { points };
        debug!(
            "Built trajectory from {} waypoints: {} points, length {:.3}, peak velocity {:.3}",
            waypoints.len(),
            trajectory.len(),
            trajectory.total_length(),
            trajectory.max_velocity()
        );

        Ok(trajectory)
    }
}

fn validate_waypoints(waypoints: &[WayPoint]) -> RoboticsResult<()> {
    if waypoints.len() < 2 {
        return Err(RoboticsError::PlanningError(format!(
            "need at least 2 waypoints, got {}", waypoints.len()
        )));
    }
    if let Some(i) = waypoints.iter().position(|w| !w.position().is_finite()) {
        return Err(RoboticsError::InvalidParameter(format!(
            "waypoint {} has a non-finite coordinate", i
        )));
    }
    if let Some(i) = waypoints.windows(2)
        .position(|w| w[0].position().distance(&w[1].position()) < f64::EPSILON)
    {
        return Err(RoboticsError::PlanningError(format!(
            "waypoints {} and {} coincide", i, i + 1
        )));
    }
    Ok(())
}

/// Tangent vector at every waypoint.
///
/// Interior tangents are half the vector between the two neighbours; the
/// endpoints resolve their own tangent against the adjacent chord.
pub fn estimate_tangents(waypoints: &[WayPoint]) -> Vec<Vector2<f64>> {
    let n = waypoints.len();
    if n < 2 {
        return vec![Vector2::zeros(); n];
    }

    let p: Vec<Vector2<f64>> = waypoints.iter().map(|w| w.position().to_vector()).collect();
    let mut tangents = Vec::with_capacity(n);
    tangents.push(waypoints[0].resolve_tangent(p[1] - p[0]));
    for i in 1..n - 1 {
        tangents.push((p[i + 1] - p[i - 1]) * 0.5);
    }
    tangents.push(waypoints[n - 1].resolve_tangent(p[n - 1] - p[n - 2]));
    tangents
}

/// Signed curvature of the circle through three points.
///
/// Positive when `p0 -> p1 -> p2` turns left. Returns 0 for (near-)collinear
/// triples and for circles with radius at or above `max_radius`.
pub fn circumcircle_curvature(
    p0: &Point2D,
    p1: &Point2D,
    p2: &Point2D,
    max_radius: f64,
    collinear_epsilon: f64,
) -> f64 {
    let det = 2.0 * (p0.x * (p1.y - p2.y) + p1.x * (p2.y - p0.y) + p2.x * (p0.y - p1.y));
    if det.abs() <= collinear_epsilon {
        return 0.0;
    }

    let s0 = p0.x * p0.x + p0.y * p0.y;
    let s1 = p1.x * p1.x + p1.y * p1.y;
    let s2 = p2.x * p2.x + p2.y * p2.y;
    let h = (s0 * (p1.y - p2.y) + s1 * (p2.y - p0.y) + s2 * (p0.y - p1.y)) / det;
    let k = (s0 * (p2.x - p1.x) + s1 * (p0.x - p2.x) + s2 * (p1.x - p0.x)) / det;
    let r = p0.distance(&Point2D::new(h, k));

    if !r.is_finite() || r >= max_radius || r == 0.0 {
        return 0.0;
    }

    // det is twice the signed area, positive for a left turn
    det.signum() / r
}

/// Fill in the curvature of every interior point; endpoints stay 0
pub fn calc_curvature(points: &mut [TrajPoint], config: &TrajectoryConfig) {
    let n = points.len();
    if n < 3 {
        points.iter_mut().for_each(|p| p.curvature = 0.0);
        return;
    }

    let positions: Vec<Point2D> = points.iter().map(|p| p.position()).collect();
    points[0].curvature = 0.0;
    points[n - 1].curvature = 0.0;
    for i in 1..n - 1 {
        points[i].curvature = circumcircle_curvature(
            &positions[i - 1],
            &positions[i],
            &positions[i + 1],
            config.max_radius,
            config.collinear_epsilon,
        );
    }
}

/// Per-point speed cap from top speed and curvature; endpoints are 0
pub fn calc_feasible_velocity(
    points: &mut [TrajPoint],
    drive: &DriveCharacterization,
    curvature_speed_scale: f64,
) {
    for p in points.iter_mut() {
        let k = p.curvature.abs();
        p.velocity = if k == 0.0 {
            drive.max_velocity
        } else {
            drive.max_velocity.min(drive.max_velocity / (k * curvature_speed_scale))
        };
    }
    if let Some(p) = points.first_mut() {
        p.velocity = 0.0;
    }
    if let Some(p) = points.last_mut() {
        p.velocity = 0.0;
    }
}

/// Forward then backward pass bounding the speed change between samples
pub fn limit_acceleration(points: &mut [TrajPoint], max_acceleration: f64) {
    let n = points.len();
    if n < 3 {
        return;
    }

    for i in 1..n - 1 {
        let reachable = (points[i - 1].velocity.powi(2)
            + 2.0 * max_acceleration * points[i].distance(&points[i - 1]))
        .sqrt();
        points[i].velocity = points[i].velocity.min(reachable);
    }

    for i in (1..n - 1).rev() {
        let reachable = (points[i + 1].velocity.powi(2)
            + 2.0 * max_acceleration * points[i].distance(&points[i + 1]))
        .sqrt();
        points[i].velocity = points[i].velocity.min(reachable);
    }
}
