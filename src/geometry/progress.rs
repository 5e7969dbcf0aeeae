//! Playback progress classification
//!
//! Splits compiled nodes into already drawn, about to be drawn and not yet
//! reached, relative to the playback cursor. Picking colors for each class
//! is up to the renderer.

use serde::Serialize;

use crate::geometry::Node;

/// Where a node sits relative to the playback cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    /// Produced by a line before the cursor
    Executed,
    /// Within the look-ahead window `[cursor, cursor + look_ahead]`
    Upcoming,
    /// Beyond the look-ahead window
    Future,
}

impl Progress {
    /// Future nodes are only drawn in draw-all mode
    pub fn is_visible(self, draw_all: bool) -> bool {
        draw_all || self != Progress::Future
    }
}

/// Classify a source line against cursor position `position`
pub fn classify(source_line: usize, position: usize, look_ahead: usize) -> Progress {
    if source_line < position {
        Progress::Executed
    } else if source_line <= position.saturating_add(look_ahead) {
        Progress::Upcoming
    } else {
        Progress::Future
    }
}

impl Node {
    pub fn progress(&self, position: usize, look_ahead: usize) -> Progress {
        classify(self.source_line(), position, look_ahead)
    }
}

/// Node counts per progress class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub executed: usize,
    pub upcoming: usize,
    pub future: usize,
}

pub fn summarize(nodes: &[Node], position: usize, look_ahead: usize) -> ProgressSummary {
    nodes
        .iter()
        .fold(ProgressSummary::default(), |mut summary, node| {
            match node.progress(position, look_ahead) {
                Progress::Executed => summary.executed += 1,
                Progress::Upcoming => summary.upcoming += 1,
                Progress::Future => summary.future += 1,
            }
            summary
        })
}

/// Where the pen holder is drawn: the start of the last executed stroke
pub fn pen_position(nodes: &[Node], position: usize) -> Option<(f64, f64)> {
    nodes
        .iter()
        .take_while(|n| n.source_line() < position)
        .filter_map(|n| match *n {
            Node::Position { from_x, from_y, .. } => Some((from_x, from_y)),
            Node::ToolChange { .. } => None,
        })
        .last()
}
