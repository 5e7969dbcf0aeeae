//! Toolpath geometry
//!
//! Compilation of programs into renderable nodes, the shared node cache and
//! playback progress classification.

pub mod cache;
pub mod compiler;
pub mod node;
pub mod progress;

pub use cache::NodeCache;
pub use compiler::{compile, GeometryCompiler, ARC_SEGMENTS_PER_MM, MAX_ARC_STEPS};
pub use node::Node;
pub use progress::{classify, pen_position, summarize, Progress, ProgressSummary};
