//! Differential drive kinematic model
//!
//! Integrates wheel velocity commands into a pose. Used to close the loop
//! around a tracker in simulation.

use crate::common::{Pose2D, WheelCommand};

/// State of a differential drive robot
#[derive(Debug, Clone, Copy)]
pub struct DiffDriveState {
    pub pose: Pose2D,
    pub track_width: f64,
}

impl DiffDriveState {
    pub fn new(pose: Pose2D, track_width: f64) -> Self {
        DiffDriveState { pose, track_width }
    }

    /// Advance the state by `dt` seconds under `cmd`
    pub fn update(&mut self, cmd: &WheelCommand, dt: f64) {
        let (v, omega) = cmd.to_twist(self.track_width);
        self.pose.x += v * self.pose.yaw.cos() * dt;
        self.pose.y += v * self.pose.yaw.sin() * dt;
        self.pose.yaw += omega * dt;
        self.pose.normalize_yaw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_equal_wheels_drive_straight() {
        let mut state = DiffDriveState::new(Pose2D::origin(), 2.0);
        for _ in 0..100 {
            state.update(&WheelCommand::new(1.0, 1.0), 0.01);
        }
        assert!((state.pose.x - 1.0).abs() < 1e-9);
        assert!(state.pose.y.abs() < 1e-12);
        assert!(state.pose.yaw.abs() < 1e-12);
    }

    #[test]
    fn test_opposite_wheels_turn_in_place() {
        let mut state = DiffDriveState::new(Pose2D::origin(), 2.0);
        // omega = (1 - -1) / 2 = 1 rad/s
        for _ in 0..100 {
            state.update(&WheelCommand::new(-1.0, 1.0), 0.01);
        }
        assert!(state.pose.x.abs() < 1e-12);
        assert!((state.pose.yaw - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_yaw_stays_normalized() {
        let mut state = DiffDriveState::new(Pose2D::new(0.0, 0.0, 3.0), 1.0);
        state.update(&WheelCommand::new(-1.0, 1.0), 1.0);
        assert!(state.pose.yaw <= PI && state.pose.yaw >= -PI);
    }
}
