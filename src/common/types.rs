//! Common types used throughout diff_drive_pursuit

use std::ops::Add;

use nalgebra::Vector2;
use serde::Deserialize;

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// 2D pose (position + heading)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    /// Heading in radians, counter-clockwise from +x
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, yaw: 0.0 }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        self.position().distance(other)
    }

    /// Unit vector pointing along the heading
    pub fn heading_vector(&self) -> Vector2<f64> {
        Vector2::new(self.yaw.cos(), self.yaw.sin())
    }

    /// Normalize yaw to [-pi, pi]
    pub fn normalize_yaw(&mut self) {
        while self.yaw > std::f64::consts::PI {
            self.yaw -= 2.0 * std::f64::consts::PI;
        }
        while self.yaw < -std::f64::consts::PI {
            self.yaw += 2.0 * std::f64::consts::PI;
        }
    }
}

impl Add for Pose2D {
    type Output = Pose2D;

    fn add(self, rhs: Pose2D) -> Pose2D {
        Pose2D::new(self.x + rhs.x, self.y + rhs.y, self.yaw + rhs.yaw)
    }
}

/// How the path tangent at a waypoint is supplied
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tangent {
    /// Derived from the neighbouring waypoints
    Auto,
    /// Direction in radians; magnitude is taken from the adjacent chord
    Heading(f64),
    /// Explicit tangent vector (direction and scale)
    Vector(f64, f64),
}

impl Default for Tangent {
    fn default() -> Self {
        Tangent::Auto
    }
}

/// Sparse, authored point that the trajectory must pass through
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WayPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub tangent: Tangent,
}

impl WayPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, tangent: Tangent::Auto }
    }

    pub fn with_heading(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, tangent: Tangent::Heading(heading) }
    }

    pub fn with_tangent(x: f64, y: f64, tx: f64, ty: f64) -> Self {
        Self { x, y, tangent: Tangent::Vector(tx, ty) }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Tangent vector for an endpoint, given the chord to its neighbour.
    ///
    /// `chord` always points in the direction of travel.
    pub fn resolve_tangent(&self, chord: Vector2<f64>) -> Vector2<f64> {
        match self.tangent {
            Tangent::Auto => chord,
            Tangent::Heading(theta) => chord.norm() * Vector2::new(theta.cos(), theta.sin()),
            Tangent::Vector(tx, ty) => Vector2::new(tx, ty),
        }
    }
}

/// Sample of a built trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajPoint {
    pub x: f64,
    pub y: f64,
    /// Signed curvature [1/m], positive when turning left
    pub curvature: f64,
    /// Profiled speed [m/s]
    pub velocity: f64,
}

impl TrajPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, curvature: 0.0, velocity: 0.0 }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn distance(&self, other: &TrajPoint) -> f64 {
        self.position().distance(&other.position())
    }
}

/// Physical and control-loop limits of the drivetrain
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DriveCharacterization {
    /// Top speed [m/s]
    pub max_velocity: f64,
    /// Longitudinal acceleration limit [m/s^2]
    pub max_acceleration: f64,
    /// Distance between left and right wheels [m]
    pub track_width: f64,
    /// Control period [s]
    pub loop_time: f64,
}

impl DriveCharacterization {
    pub fn new(max_velocity: f64, max_acceleration: f64, track_width: f64, loop_time: f64) -> Self {
        Self { max_velocity, max_acceleration, track_width, loop_time }
    }

    /// Names of the fields that are not finite and strictly positive
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        [
            ("max_velocity", self.max_velocity),
            ("max_acceleration", self.max_acceleration),
            ("track_width", self.track_width),
            ("loop_time", self.loop_time),
        ]
        .iter()
        .filter(|(_, v)| !(v.is_finite() && *v > 0.0))
        .map(|(name, _)| *name)
        .collect()
    }
}

/// Left/right wheel velocity demand for a differential drive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelCommand {
    pub left: f64,
    pub right: f64,
}

impl WheelCommand {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn zero() -> Self {
        Self { left: 0.0, right: 0.0 }
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }

    /// Body-frame linear and angular velocity for the given track width
    pub fn to_twist(&self, track_width: f64) -> (f64, f64) {
        let v = 0.5 * (self.left + self.right);
        let omega = (self.right - self.left) / track_width;
        (v, omega)
    }
}

/// Path represented as a sequence of 2D points
#[derive(Debug, Clone)]
pub struct Path2D {
    pub points: Vec<Point2D>,
}

impl Path2D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn total_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.points.windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }
}

impl Default for Path2D {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
        assert!((p1.distance_squared(&p2) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_pose2d_normalize_yaw() {
        let mut pose = Pose2D::new(0.0, 0.0, 4.0);
        pose.normalize_yaw();
        assert!(pose.yaw >= -std::f64::consts::PI && pose.yaw <= std::f64::consts::PI);
    }

    #[test]
    fn test_pose2d_add() {
        let pose = Pose2D::new(1.0, 2.0, 0.5) + Pose2D::new(-1.0, 1.0, 0.25);
        assert!((pose.x - 0.0).abs() < 1e-10);
        assert!((pose.y - 3.0).abs() < 1e-10);
        assert!((pose.yaw - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_waypoint_heading_tangent_uses_chord_length() {
        let wp = WayPoint::with_heading(0.0, 0.0, FRAC_PI_2);
        let t = wp.resolve_tangent(Vector2::new(12.0, 0.0));
        assert!(t[0].abs() < 1e-10);
        assert!((t[1] - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_waypoint_auto_and_explicit_tangent() {
        let chord = Vector2::new(3.0, 4.0);
        assert_eq!(WayPoint::new(0.0, 0.0).resolve_tangent(chord), chord);
        let explicit = WayPoint::with_tangent(0.0, 0.0, 1.0, -1.0).resolve_tangent(chord);
        assert_eq!(explicit, Vector2::new(1.0, -1.0));
    }

    #[test]
    fn test_drive_characterization_validation() {
        let drive = DriveCharacterization::new(14.0, 14.0, 2.0, 0.02);
        assert!(drive.invalid_fields().is_empty());

        let drive = DriveCharacterization::new(0.0, f64::NAN, 2.0, 0.02);
        assert_eq!(drive.invalid_fields(), vec!["max_velocity", "max_acceleration"]);
    }

    #[test]
    fn test_wheel_command_twist() {
        let (v, omega) = WheelCommand::new(1.0, 3.0).to_twist(2.0);
        assert!((v - 2.0).abs() < 1e-10);
        assert!((omega - 1.0).abs() < 1e-10);
        assert!(WheelCommand::zero().is_zero());
    }

    #[test]
    fn test_path2d_total_length() {
        let path = Path2D::from_points(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
        ]);
        assert!((path.total_length() - 2.0).abs() < 1e-10);
    }
}
