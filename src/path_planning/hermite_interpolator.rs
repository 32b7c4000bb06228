//! Cubic Hermite interpolation between two tangent-annotated waypoints
//!
//! Each segment is the cubic whose endpoints and endpoint derivatives match
//! the supplied positions and tangents:
//!
//!   p(t) = h00(t) p0 + h10(t) m0 + h01(t) p1 + h11(t) m1,  t in [0, 1]
//!
//! Neighbouring segments that share a waypoint also share its tangent, so a
//! chain of segments is C1 continuous.

use nalgebra::Vector2;

use crate::common::{Point2D, RoboticsError, RoboticsResult};

/// Number of chords used to estimate the arc length of a segment
const LENGTH_ESTIMATE_STEPS: usize = 16;

/// Upper bound on the samples taken from a single segment
pub const MAX_SEGMENT_SAMPLES: usize = 1_000_000;

/// One cubic Hermite segment
#[derive(Debug, Clone, Copy)]
pub struct HermiteSegment {
    p0: Vector2<f64>,
    m0: Vector2<f64>,
    p1: Vector2<f64>,
    m1: Vector2<f64>,
}

impl HermiteSegment {
    pub fn new(p0: Vector2<f64>, m0: Vector2<f64>, p1: Vector2<f64>, m1: Vector2<f64>) -> Self {
        HermiteSegment { p0, m0, p1, m1 }
    }

    pub fn calc_position(&self, t: f64) -> Vector2<f64> {
        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;
        self.p0 * h00 + self.m0 * h10 + self.p1 * h01 + self.m1 * h11
    }

    /// First derivative with respect to the curve parameter
    pub fn calc_derivative(&self, t: f64) -> Vector2<f64> {
        let t2 = t * t;
        let dh00 = 6.0 * t2 - 6.0 * t;
        let dh10 = 3.0 * t2 - 4.0 * t + 1.0;
        let dh01 = -6.0 * t2 + 6.0 * t;
        let dh11 = 3.0 * t2 - 2.0 * t;
        self.p0 * dh00 + self.m0 * dh10 + self.p1 * dh01 + self.m1 * dh11
    }

    /// Polyline estimate of the segment arc length
    pub fn approx_length(&self) -> f64 {
        (0..LENGTH_ESTIMATE_STEPS)
            .map(|i| {
                let t0 = i as f64 / LENGTH_ESTIMATE_STEPS as f64;
                let t1 = (i + 1) as f64 / LENGTH_ESTIMATE_STEPS as f64;
                (self.calc_position(t1) - self.calc_position(t0)).norm()
            })
            .sum()
    }

    /// Number of points `sample` produces at `spacing`, at least 1
    pub fn sample_count(&self, spacing: f64) -> f64 {
        (self.approx_length() / spacing).ceil().max(1.0)
    }

    /// Sample the segment roughly every `spacing` metres.
    ///
    /// The start point is included and the end point is not, so that
    /// concatenated segments do not duplicate the shared waypoint.
    pub fn sample(&self, spacing: f64) -> Vec<Point2D> {
        let n = self.sample_count(spacing) as usize;
        (0..n)
            .map(|i| Point2D::from(self.calc_position(i as f64 / n as f64)))
            .collect()
    }
}

/// Interpolate between two waypoints with the given tangents.
///
/// Returns the points from `start` (inclusive) to `end` (exclusive). Fails
/// if the segment length is not finite or the segment would need more than
/// `MAX_SEGMENT_SAMPLES` points.
pub fn interpolate(
    start: Point2D,
    start_tangent: Vector2<f64>,
    end: Point2D,
    end_tangent: Vector2<f64>,
    spacing: f64,
) -> RoboticsResult<Vec<Point2D>> {
    let segment = HermiteSegment::new(start.to_vector(), start_tangent, end.to_vector(), end_tangent);

    let length = segment.approx_length();
    if !length.is_finite() {
        return Err(RoboticsError::NumericalError(format!(
            "segment from ({}, {}) to ({}, {}) has no finite length",
            start.x, start.y, end.x, end.y
        )));
    }
    let count = segment.sample_count(spacing);
    if count > MAX_SEGMENT_SAMPLES as f64 {
        return Err(RoboticsError::PlanningError(format!(
            "segment of length {:.3e} needs {:.3e} points at spacing {}, limit is {}",
            length, count, spacing, MAX_SEGMENT_SAMPLES
        )));
    }

    Ok(segment.sample(spacing))
}
