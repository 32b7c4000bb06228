// Path tracking simulation of a differential drive robot with a pure pursuit
// controller following a Hermite-spline, speed-profiled trajectory.
//
// Run with: cargo run --bin pure_pursuit -- --params params/pure_pursuit.toml
use std::f64::consts::FRAC_PI_2;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use diff_drive_pursuit::common::{
    DriveCharacterization, Path2D, Pose2D, RoboticsError, RoboticsResult, WayPoint,
};
use diff_drive_pursuit::path_planning::{TrajectoryBuilder, TrajectoryConfig};
use diff_drive_pursuit::path_tracking::{DiffDriveState, PurePursuitConfig, PurePursuitController};
use diff_drive_pursuit::utils::params::{self, PursuitParams};
use diff_drive_pursuit::utils::visualization::{quick_plot_tracking, quick_plot_velocity_profile};

/// Pure pursuit path tracking simulation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Parameter file; the built-in curve is used when omitted
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Output directory for plots
    #[arg(short, long, default_value = "img/path_tracking")]
    output: PathBuf,

    /// Standard deviation of the position noise added to the pose fed back [m]
    #[arg(short, long, default_value_t = 0.0)]
    noise: f64,

    /// Seed for the pose noise
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Give up after this many control cycles
    #[arg(long, default_value_t = 10_000)]
    max_cycles: usize,
}

fn default_params() -> PursuitParams {
    PursuitParams {
        drive: DriveCharacterization::new(14.0, 14.0, 2.0, 0.02),
        trajectory: TrajectoryConfig::default(),
        pursuit: PurePursuitConfig::default(),
        waypoints: vec![
            WayPoint::with_heading(0.0, 0.0, 0.0),
            WayPoint::new(12.0, 0.0),
            WayPoint::with_heading(24.0, 24.0, FRAC_PI_2),
        ],
    }
}

fn main() -> RoboticsResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let params = match &args.params {
        Some(path) => {
            info!("Loading parameters from {}", path.display());
            params::load(path)?
        }
        None => default_params(),
    };

    let trajectory = TrajectoryBuilder::new(params.trajectory.clone())
        .build(&params.waypoints, &params.drive)?;
    let trajectory = Arc::new(trajectory);
    info!(
        "Trajectory: {} points, {:.2} long, peak velocity {:.2}",
        trajectory.len(),
        trajectory.total_length(),
        trajectory.max_velocity()
    );

    let mut controller =
        PurePursuitController::new(Arc::clone(&trajectory), params.drive, params.pursuit.clone())?;

    let noise = Normal::new(0.0, args.noise)
        .map_err(|e| RoboticsError::InvalidParameter(format!("noise: {}", e)))?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    // Start on the first waypoint, facing along the first tangent
    let start = params.waypoints[0];
    let start_yaw = trajectory.get(1)
        .map_or(0.0, |p| (p.y - start.y).atan2(p.x - start.x));
    let mut robot = DiffDriveState::new(Pose2D::new(start.x, start.y, start_yaw), params.drive.track_width);
    let mut driven = Path2D::new();
    driven.push(robot.pose.position());

    let dt = params.drive.loop_time;
    let mut cycles = 0;
    while !controller.is_finished() && cycles < args.max_cycles {
        let measured = Pose2D::new(
            robot.pose.x + noise.sample(&mut rng),
            robot.pose.y + noise.sample(&mut rng),
            robot.pose.yaw,
        );
        let cmd = controller.track(&measured);
        robot.update(&cmd, dt);
        driven.push(robot.pose.position());
        cycles += 1;
    }

    if controller.is_finished() {
        let end = trajectory.last().map(|p| p.position()).unwrap_or(robot.pose.position());
        info!(
            "Goal reached after {} cycles ({:.2} s), {:.3} from the end of the trajectory",
            cycles,
            cycles as f64 * dt,
            robot.pose.distance(&end)
        );
    } else {
        warn!("Gave up after {} cycles without finishing", cycles);
    }

    std::fs::create_dir_all(&args.output)?;
    let tracking_png = args.output.join("pure_pursuit.png");
    let profile_png = args.output.join("velocity_profile.png");

    let mut tracking_plot =
        quick_plot_tracking(&trajectory, &params.waypoints, &driven, "Pure Pursuit Path Tracking");
    tracking_plot.plot_robot(&robot.pose, params.drive.track_width);
    tracking_plot.save_png(&tracking_png.to_string_lossy(), 800, 600)?;
    quick_plot_velocity_profile(&trajectory)
        .save_png(&profile_png.to_string_lossy(), 800, 400)?;
    info!("Plots saved to {}", args.output.display());

    Ok(())
}
