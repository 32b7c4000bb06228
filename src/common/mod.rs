//! Common types, traits, and error definitions for diff_drive_pursuit
//!
//! This module provides the foundational building blocks shared by
//! trajectory generation and tracking.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
