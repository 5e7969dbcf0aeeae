//! Motion math
//!
//! Machine state tracking, trapezoidal timing and arc sweeps.

pub mod arc;
pub mod profile;
pub mod state;

pub use arc::{normalized_angle, ArcSweep};
pub use profile::trapezoid_time;
pub use state::{MotionState, INCHES_TO_MM, PEN_LIFT_TOLERANCE};
