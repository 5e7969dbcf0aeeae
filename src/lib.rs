//! Pen plotter G-code engine
//!
//! Reads plotter motion programs and provides:
//! - Time and length estimates under a trapezoidal velocity profile
//! - Compiled toolpath geometry for preview, cached and shareable across threads
//! - A playback cursor with pen-lift resume points
//! - Left-right mirroring for drawing on the back of glass

pub mod config;
pub mod document;
pub mod error;
pub mod estimate;
pub mod geometry;
pub mod mirror;
pub mod motion;
pub mod parser;
pub mod settings;

// Re-exports for clean public API
pub use config::Config;
pub use document::{GCodeDocument, PlaybackCursor};
pub use error::{Error, ParseError};
pub use estimate::{estimate, Diagnostic, Estimate, MotionProfileEstimator, ProfileStats};
pub use geometry::{GeometryCompiler, Node, NodeCache, Progress};
pub use parser::{parse_line, ParsedLine};
pub use settings::{Color, MachineSettings};
