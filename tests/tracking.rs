// Closed-loop tracking: pure pursuit driving a simulated differential drive
// robot along generated trajectories.
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use diff_drive_pursuit::common::{DriveCharacterization, PathTracker, Pose2D, WayPoint};
use diff_drive_pursuit::path_planning::{Trajectory, TrajectoryBuilder};
use diff_drive_pursuit::path_tracking::{DiffDriveState, PurePursuitController};
use diff_drive_pursuit::utils::params::{self, PursuitParams};

const MAX_CYCLES: usize = 2000;

fn drive() -> DriveCharacterization {
    DriveCharacterization::new(14.0, 14.0, 2.0, 0.02)
}

fn straight() -> Vec<WayPoint> {
    vec![WayPoint::new(0.0, 0.0), WayPoint::new(24.0, 0.0)]
}

fn curve() -> Vec<WayPoint> {
    vec![
        WayPoint::with_heading(0.0, 0.0, 0.0),
        WayPoint::new(12.0, 0.0),
        WayPoint::with_heading(24.0, 24.0, FRAC_PI_2),
    ]
}

struct Run {
    cycles: usize,
    final_pose: Pose2D,
    finished: bool,
}

/// Drive the robot from `start` until the controller finishes, checking the
/// cursor never moves backwards.
fn simulate(controller: &mut PurePursuitController, start: Pose2D) -> Run {
    let drive = *controller.drive();
    let mut robot = DiffDriveState::new(start, drive.track_width);
    let mut previous = controller.cursor();
    let mut cycles = 0;

    while !controller.is_finished() && cycles < MAX_CYCLES {
        let cmd = controller.track(&robot.pose);
        let cursor = controller.cursor();
        assert!(cursor.closest_index >= previous.closest_index);
        assert!(cursor.lookahead_index >= previous.lookahead_index);
        assert!(cmd.left.is_finite() && cmd.right.is_finite());
        previous = cursor;

        robot.update(&cmd, drive.loop_time);
        cycles += 1;
    }

    Run { cycles, final_pose: robot.pose, finished: controller.is_finished() }
}

fn controller_for(waypoints: &[WayPoint]) -> PurePursuitController {
    let trajectory = Arc::new(Trajectory::new(waypoints, &drive()).unwrap());
    PurePursuitController::with_defaults(trajectory, drive()).unwrap()
}

fn distance_to_end(controller: &PurePursuitController, pose: &Pose2D) -> f64 {
    let end = controller.trajectory().last().unwrap().position();
    pose.distance(&end)
}

#[test]
fn test_straight_path_reaches_end() {
    let mut controller = controller_for(&straight());
    let run = simulate(&mut controller, Pose2D::origin());

    assert!(run.finished, "not finished after {} cycles", run.cycles);
    assert!(distance_to_end(&controller, &run.final_pose) < 1.5);
    assert!(run.final_pose.y.abs() < 1e-6);
    let cursor = controller.cursor();
    assert_eq!(cursor.lookahead_index, controller.trajectory().len() - 1);
}

#[test]
fn test_curve_reaches_end_heading_up() {
    let mut controller = controller_for(&curve());
    let run = simulate(&mut controller, Pose2D::origin());

    assert!(run.finished, "not finished after {} cycles", run.cycles);
    assert!(distance_to_end(&controller, &run.final_pose) < 1.5);
    // arrives roughly along the final heading
    assert!((run.final_pose.yaw - FRAC_PI_2).abs() < 0.5);
}

#[test]
fn test_offset_start_converges() {
    let mut controller = controller_for(&straight());
    let run = simulate(&mut controller, Pose2D::new(0.0, 1.0, 0.2));

    assert!(run.finished, "not finished after {} cycles", run.cycles);
    assert!(distance_to_end(&controller, &run.final_pose) < 1.5);
    assert!(run.final_pose.y.abs() < 0.5);
}

#[test]
fn test_commands_zero_after_finish() {
    let mut controller = controller_for(&straight());
    let run = simulate(&mut controller, Pose2D::origin());
    assert!(run.finished);

    let cursor = controller.cursor();
    for pose in [run.final_pose, Pose2D::origin(), Pose2D::new(-5.0, 3.0, 1.0)] {
        assert!(controller.track(&pose).is_zero());
        assert_eq!(controller.cursor(), cursor);
    }
}

#[test]
fn test_reset_allows_rerun() {
    let mut controller = controller_for(&curve());
    let first = simulate(&mut controller, Pose2D::origin());
    assert!(first.finished);

    controller.reset();
    assert!(!controller.is_finished());
    assert_eq!(controller.cursor().closest_index, 0);
    assert_eq!(controller.cursor().lookahead_index, 0);

    let second = simulate(&mut controller, Pose2D::origin());
    assert!(second.finished);
    assert_eq!(first.cycles, second.cycles);
}

#[test]
fn test_controllers_share_trajectory() {
    let trajectory = Arc::new(Trajectory::new(&straight(), &drive()).unwrap());
    let mut a = PurePursuitController::with_defaults(Arc::clone(&trajectory), drive()).unwrap();
    let mut b = PurePursuitController::with_defaults(Arc::clone(&trajectory), drive()).unwrap();

    let run_a = simulate(&mut a, Pose2D::origin());
    assert!(run_a.finished);
    // b is untouched by a's progress
    assert_eq!(b.cursor().closest_index, 0);
    assert!(!b.is_finished());

    let run_b = simulate(&mut b, Pose2D::origin());
    assert!(run_b.finished);
    assert_eq!(run_a.cycles, run_b.cycles);
}

#[test]
fn test_tracker_trait_object() {
    let mut tracker: Box<dyn PathTracker> = Box::new(controller_for(&straight()));
    let mut robot = DiffDriveState::new(Pose2D::origin(), drive().track_width);
    let mut cycles = 0;
    while !tracker.is_finished() && cycles < MAX_CYCLES {
        let cmd = tracker.track(&robot.pose);
        robot.update(&cmd, drive().loop_time);
        cycles += 1;
    }
    assert!(tracker.is_finished());
}

#[test]
fn test_shipped_params_track_to_end() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/params/pure_pursuit.toml");
    let params: PursuitParams = params::load(path).unwrap();

    let trajectory = TrajectoryBuilder::new(params.trajectory.clone())
        .build(&params.waypoints, &params.drive)
        .unwrap();
    let mut controller =
        PurePursuitController::new(Arc::new(trajectory), params.drive, params.pursuit.clone()).unwrap();

    let run = simulate(&mut controller, Pose2D::origin());
    assert!(run.finished, "not finished after {} cycles", run.cycles);
    assert!(distance_to_end(&controller, &run.final_pose) < 1.5);
}
