//! Error types for diff_drive_pursuit

use thiserror::Error;

/// Main error type for trajectory generation and tracking
#[derive(Debug, Error)]
pub enum RoboticsError {
    /// Trajectory generation failed
    #[error("Planning error: {0}")]
    PlanningError(String),
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Numerical computation failed
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// Parameter file could not be parsed
    #[error("Cannot read the parameter file: {0}")]
    ParamLoad(#[from] toml::de::Error),
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Visualization error
    #[error("Visualization error: {0}")]
    VisualizationError(String),
}

/// Result type alias for robotics operations
pub type RoboticsResult<T> = Result<T, RoboticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RoboticsError::PlanningError("need at least 2 waypoints".to_string());
        assert_eq!(format!("{}", err), "Planning error: need at least 2 waypoints");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RoboticsError = io_err.into();
        assert!(matches!(err, RoboticsError::IoError(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Table>("max_velocity = ").unwrap_err();
        let err: RoboticsError = toml_err.into();
        assert!(matches!(err, RoboticsError::ParamLoad(_)));
    }
}
