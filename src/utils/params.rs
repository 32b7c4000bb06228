//! Parameter file loading
//!
//! Parameters are stored as TOML. A complete tracking setup looks like:
//!
//! ```toml
//! [drive]
//! max_velocity = 14.0
//! max_acceleration = 14.0
//! track_width = 2.0
//! loop_time = 0.02
//!
//! [trajectory]
//! point_spacing = 0.25
//!
//! [pursuit]
//! lookahead_distance = 6.0
//!
//! [[waypoints]]
//! x = 0.0
//! y = 0.0
//! tangent = { heading = 0.0 }
//!
//! [[waypoints]]
//! x = 24.0
//! y = 0.0
//! ```
//!
//! Missing `[trajectory]` or `[pursuit]` tables, or missing keys inside
//! them, fall back to the defaults.

use std::fs::read_to_string;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::common::{DriveCharacterization, RoboticsResult, WayPoint};
use crate::path_planning::TrajectoryConfig;
use crate::path_tracking::PurePursuitConfig;

/// Everything needed to build a trajectory and track it
#[derive(Debug, Clone, Deserialize)]
pub struct PursuitParams {
    pub drive: DriveCharacterization,
    #[serde(default)]
    pub trajectory: TrajectoryConfig,
    #[serde(default)]
    pub pursuit: PurePursuitConfig,
    pub waypoints: Vec<WayPoint>,
}

/// Load a parameter file
pub fn load<P, F>(param_file_path: F) -> RoboticsResult<P>
where
    P: DeserializeOwned,
    F: AsRef<Path>,
{
    let params_str = read_to_string(param_file_path)?;
    parse(&params_str)
}

/// Parse parameters from a TOML string
pub fn parse<P>(params_str: &str) -> RoboticsResult<P>
where
    P: DeserializeOwned,
{
    Ok(toml::from_str(params_str)?)
}
