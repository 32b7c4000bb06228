// Path Tracking algorithms module

pub mod pure_pursuit;
pub mod diff_drive;

pub use pure_pursuit::*;
pub use diff_drive::*;
