//! Renderable toolpath events.

use serde::Serialize;

use crate::settings::Color;

/// One event of a compiled toolpath
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// A straight stroke
    Position {
        from_x: f64,
        from_y: f64,
        to_x: f64,
        to_y: f64,
        color: Color,
        /// 0-based index of the program line that produced it
        source_line: usize,
    },
    /// A pen swap to a new color
    ToolChange { color: Color, source_line: usize },
}

impl Node {
    pub fn source_line(&self) -> usize {
        match *self {
            Node::Position { source_line, .. } | Node::ToolChange { source_line, .. } => source_line,
        }
    }

    pub fn color(&self) -> Color {
        match *self {
            Node::Position { color, .. } | Node::ToolChange { color, .. } => color,
        }
    }

    /// Stroke length, zero for tool changes
    pub fn length(&self) -> f64 {
        match *self {
            Node::Position {
                from_x,
                from_y,
                to_x,
                to_y,
                ..
            } => (to_x - from_x).hypot(to_y - from_y),
            Node::ToolChange { .. } => 0.0,
        }
    }
}
