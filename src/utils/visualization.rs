//! Visualization utilities for diff_drive_pursuit
//!
//! Provides a unified interface for plotting trajectories and tracking
//! runs using gnuplot.

use gnuplot::{Figure, Caption, Color, PointSymbol, PointSize, LineWidth, AxesCommon, AutoOption};

use crate::common::{Point2D, Pose2D, Path2D, RoboticsError, RoboticsResult, WayPoint};
use crate::path_planning::Trajectory;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const CYAN: &str = "#00FFFF";
    pub const ORANGE: &str = "#FFA500";

    // Semantic colors
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const REFERENCE: &str = BLACK;
    pub const DRIVEN: &str = "#35C788";
    pub const WAYPOINT: &str = ORANGE;
    pub const ROBOT: &str = CYAN;
    pub const VELOCITY: &str = RED;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::REFERENCE, "Trajectory")
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Series {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

/// Main visualizer struct
///
/// Series are collected first and drawn onto a single set of axes when the
/// figure is saved.
pub struct Visualizer {
    series: Vec<Series>,
    title: String,
    x_label: String,
    y_label: String,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    /// Create a new visualizer
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            aspect_ratio: Some(1.0),
        }
    }

    /// Set the plot title
    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Set X axis label
    pub fn set_x_label(&mut self, label: &str) -> &mut Self {
        self.x_label = label.to_string();
        self
    }

    /// Set Y axis label
    pub fn set_y_label(&mut self, label: &str) -> &mut Self {
        self.y_label = label.to_string();
        self
    }

    /// Set aspect ratio (None for auto)
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Plot a path
    pub fn plot_path(&mut self, path: &Path2D, style: &PathStyle) -> &mut Self {
        self.plot_path_xy(&path.x_coords(), &path.y_coords(), style)
    }

    /// Plot a path from x,y vectors
    pub fn plot_path_xy(&mut self, x: &[f64], y: &[f64], style: &PathStyle) -> &mut Self {
        self.series.push(Series::Lines { x: x.to_vec(), y: y.to_vec(), style: style.clone() });
        self
    }

    /// Plot the geometry of a trajectory
    pub fn plot_trajectory(&mut self, trajectory: &Trajectory, style: &PathStyle) -> &mut Self {
        self.plot_path(&trajectory.to_path2d(), style)
    }

    /// Plot authored waypoints
    pub fn plot_waypoints(&mut self, waypoints: &[WayPoint]) -> &mut Self {
        let points: Vec<Point2D> = waypoints.iter().map(|w| w.position()).collect();
        self.plot_points(&points, &PointStyle::new(colors::WAYPOINT, "Waypoints").with_symbol('S'))
    }

    /// Plot a single point (start, goal, etc.)
    pub fn plot_point(&mut self, point: Point2D, style: &PointStyle) -> &mut Self {
        self.plot_points_xy(&[point.x], &[point.y], style)
    }

    /// Plot multiple points
    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        let y: Vec<f64> = points.iter().map(|p| p.y).collect();
        self.plot_points_xy(&x, &y, style)
    }

    /// Plot points from x,y vectors
    pub fn plot_points_xy(&mut self, x: &[f64], y: &[f64], style: &PointStyle) -> &mut Self {
        self.series.push(Series::Points { x: x.to_vec(), y: y.to_vec(), style: style.clone() });
        self
    }

    /// Plot robot pose with direction indicator
    pub fn plot_robot(&mut self, pose: &Pose2D, size: f64) -> &mut Self {
        self.plot_point(pose.position(), &PointStyle::new(colors::ROBOT, "Robot").with_size(size));

        // Direction line (arrow substitute)
        let arrow_len = size * 0.5;
        let end_x = pose.x + arrow_len * pose.yaw.cos();
        let end_y = pose.y + arrow_len * pose.yaw.sin();
        self.plot_path_xy(&[pose.x, end_x], &[pose.y, end_y], &PathStyle::new(colors::ROBOT, ""))
    }

    /// Plot start position
    pub fn plot_start(&mut self, point: Point2D) -> &mut Self {
        self.plot_point(point, &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    /// Plot goal position
    pub fn plot_goal(&mut self, point: Point2D) -> &mut Self {
        self.plot_point(point, &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    /// Save plot to PNG file
    pub fn save_png(&self, path: &str, width: u32, height: u32) -> RoboticsResult<()> {
        let mut figure = self.render();
        figure.save_to_png(path, width, height)
            .map_err(|e| RoboticsError::VisualizationError(e.to_string()))
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        let axes = figure.axes2d();

        for series in &self.series {
            match series {
                Series::Lines { x, y, style } => {
                    axes.lines(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        LineWidth(style.line_width),
                    ]);
                }
                Series::Points { x, y, style } => {
                    axes.points(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        PointSymbol(style.symbol),
                        PointSize(style.size),
                    ]);
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }

        figure
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference trajectory against the path actually driven
pub fn quick_plot_tracking(
    trajectory: &Trajectory,
    waypoints: &[WayPoint],
    driven: &Path2D,
    title: &str,
) -> Visualizer {
    let mut vis = Visualizer::new();
    vis.set_title(title);

    vis.plot_trajectory(trajectory, &PathStyle::default());
    vis.plot_path(driven, &PathStyle::new(colors::DRIVEN, "Driven"));
    vis.plot_waypoints(waypoints);
    if let Some(p) = trajectory.first() {
        vis.plot_start(p.position());
    }
    if let Some(p) = trajectory.last() {
        vis.plot_goal(p.position());
    }

    vis
}

/// Profiled velocity against distance travelled along the trajectory
pub fn quick_plot_velocity_profile(trajectory: &Trajectory) -> Visualizer {
    let points = trajectory.points();
    let mut s = Vec::with_capacity(points.len());
    let mut travelled = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            travelled += p.distance(&points[i - 1]);
        }
        s.push(travelled);
    }
    let v: Vec<f64> = points.iter().map(|p| p.velocity).collect();

    let mut vis = Visualizer::new();
    vis.set_title("Velocity profile")
        .set_x_label("s [m]")
        .set_y_label("v [m/s]")
        .set_aspect_ratio(None);
    vis.plot_path_xy(&s, &v, &PathStyle::new(colors::VELOCITY, "Velocity"));
    vis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DriveCharacterization;

    #[test]
    fn test_visualizer_creation() {
        let vis = Visualizer::new();
        assert!(vis.aspect_ratio.is_some());
        assert_eq!(vis.series_count(), 0);
    }

    #[test]
    fn test_path_style() {
        let style = PathStyle::new(colors::RED, "Test Path")
            .with_line_width(3.0);
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.color, colors::RED);
    }

    #[test]
    fn test_quick_plots_collect_series() {
        let waypoints = vec![WayPoint::new(0.0, 0.0), WayPoint::new(10.0, 0.0)];
        let drive = DriveCharacterization::new(2.0, 1.0, 0.5, 0.02);
        let trajectory = Trajectory::new(&waypoints, &drive).unwrap();

        let vis = quick_plot_tracking(&trajectory, &waypoints, &Path2D::new(), "test");
        // trajectory, driven, waypoints, start, goal
        assert_eq!(vis.series_count(), 5);

        let vis = quick_plot_velocity_profile(&trajectory);
        assert_eq!(vis.series_count(), 1);
        assert!(vis.aspect_ratio.is_none());
    }

    #[test]
    fn test_plot_robot_adds_body_and_heading() {
        let mut vis = Visualizer::new();
        vis.plot_robot(&Pose2D::new(1.0, 2.0, 0.0), 2.0);
        assert_eq!(vis.series_count(), 2);
        match &vis.series[1] {
            Series::Lines { x, y, .. } => {
                assert_eq!(x, &vec![1.0, 2.0]);
                assert_eq!(y, &vec![2.0, 2.0]);
            }
            Series::Points { .. } => panic!("heading should be drawn as a line"),
        }
    }
}
