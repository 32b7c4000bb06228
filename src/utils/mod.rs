//! Utility modules for diff_drive_pursuit

pub mod params;
pub mod visualization;

pub use params::PursuitParams;
pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
