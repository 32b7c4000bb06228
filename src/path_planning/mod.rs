// Path Planning algorithms module

pub mod hermite_interpolator;
pub mod trajectory;

pub use hermite_interpolator::*;
pub use trajectory::*;
