//! Geometry compiler
//!
//! Turns a program into strokes and tool changes for preview. Coordinates
//! are program-local: the pass starts at the origin, not at home.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;
use crate::geometry::Node;
use crate::motion::{ArcSweep, MotionState, INCHES_TO_MM};
use crate::parser::{parse_line, Motion, Word};
use crate::settings::{Color, MachineSettings};

/// Arc smoothness: tessellation segments per mm of arc
pub const ARC_SEGMENTS_PER_MM: f64 = 1.0;

/// Upper bound on segments for one arc, so a huge radius cannot exhaust memory
pub const MAX_ARC_STEPS: usize = 10_000;

/// `M06 T<id>` where the id is a packed `0xRRGGBB` color
static TOOL_CHANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^M06 T([^;]*)").expect("tool change pattern is valid"));

/// Compiles program lines into [`Node`]s
#[derive(Debug, Clone)]
pub struct GeometryCompiler {
    state: MotionState,
    pen_up_angle: f64,
    show_pen_up: bool,
    nodes: Vec<Node>,
}

impl GeometryCompiler {
    pub fn new(settings: &MachineSettings) -> Self {
        Self {
            state: MotionState::at_origin(settings),
            pen_up_angle: settings.pen_up_angle,
            show_pen_up: settings.show_pen_up,
            nodes: Vec::new(),
        }
    }

    pub fn compile<S: AsRef<str>>(mut self, lines: &[S]) -> Vec<Node> {
        for (index, line) in lines.iter().enumerate() {
            self.process_line(index, line.as_ref());
        }

        log::debug!(
            "Compiled {} lines into {} nodes",
            lines.len(),
            self.nodes.len()
        );
        self.nodes
    }

    fn process_line(&mut self, index: usize, line: &str) {
        let line = line.trim_start();

        if let Some(caps) = TOOL_CHANGE.captures(line) {
            match caps[1].trim().parse::<i64>() {
                Ok(id) => {
                    let color = Color::from_packed(id as u32);
                    self.nodes.push(Node::ToolChange {
                        color,
                        source_line: index,
                    });
                    self.state.pen_down_color = color;
                }
                Err(_) => log::debug!("Skipping line {}: bad tool id in '{}'", index, line),
            }
            return;
        }

        let parsed = parse_line(line);
        if parsed.words.is_empty() {
            return;
        }

        // stage the line on a copy so a bad word leaves no trace
        let mut next = self.state;
        next.arc_center_x = self.state.x;
        next.arc_center_y = self.state.y;

        for word in &parsed.words {
            if let Err(e) = self.apply_word(word, &mut next) {
                log::debug!("Skipping line {}: {} in '{}'", index, e, line);
                return;
            }
        }

        let from = (self.state.x, self.state.y);
        self.state = next;

        if next.pen_lifted && !self.show_pen_up {
            return;
        }

        match parsed.motion() {
            Some(Motion::Linear) => self.push_stroke(from, (next.x, next.y), index),
            Some(motion) => {
                let arc = ArcSweep::new(
                    from,
                    (next.x, next.y),
                    (next.arc_center_x, next.arc_center_y),
                    motion == Motion::ArcClockwise,
                );
                self.push_arc(&arc, from, (next.x, next.y), index);
            }
            None => {}
        }
    }

    fn apply_word(&self, word: &Word, next: &mut MotionState) -> Result<(), ParseError> {
        match word.letter {
            'G' => match word.value.as_str() {
                "20" => next.scale = INCHES_TO_MM,
                "21" => next.scale = 1.0,
                "90" => next.absolute = true,
                "91" => next.absolute = false,
                _ => {}
            },
            'X' => {
                let v = word.number()? * next.scale;
                next.x = if next.absolute { v } else { next.x + v };
            }
            'Y' => {
                let v = word.number()? * next.scale;
                next.y = if next.absolute { v } else { next.y + v };
            }
            'Z' => {
                next.z = word.number()?;
                next.update_pen(self.pen_up_angle);
            }
            'I' => next.arc_center_x = self.state.x + word.number()? * next.scale,
            'J' => next.arc_center_y = self.state.y + word.number()? * next.scale,
            _ => {}
        }

        Ok(())
    }

    fn push_stroke(&mut self, from: (f64, f64), to: (f64, f64), source_line: usize) {
        self.nodes.push(Node::Position {
            from_x: from.0,
            from_y: from.1,
            to_x: to.0,
            to_y: to.1,
            color: self.state.stroke_color,
            source_line,
        });
    }

    fn push_arc(&mut self, arc: &ArcSweep, from: (f64, f64), to: (f64, f64), source_line: usize) {
        let length = arc.length();
        let wanted = (length * ARC_SEGMENTS_PER_MM).max(1.0).ceil();
        let steps = if !wanted.is_finite() {
            1
        } else if wanted > MAX_ARC_STEPS as f64 {
            log::warn!(
                "Arc on line {} is {:.0} mm long, drawing it with {} segments",
                source_line,
                length,
                MAX_ARC_STEPS
            );
            MAX_ARC_STEPS
        } else {
            wanted as usize
        };

        let mut current = from;
        for k in 1..steps {
            let point = arc.point_at(k as f64 / steps as f64);
            self.push_stroke(current, point, source_line);
            current = point;
        }
        // close exactly on the programmed end point
        self.push_stroke(current, to, source_line);
    }
}

/// Convenience wrapper for a single compile pass
pub fn compile<S: AsRef<str>>(lines: &[S], settings: &MachineSettings) -> Vec<Node> {
    GeometryCompiler::new(settings).compile(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn drawing() -> MachineSettings {
        MachineSettings {
            show_pen_up: false,
            ..MachineSettings::default()
        }
    }

    fn strokes(nodes: &[Node]) -> Vec<(f64, f64, f64, f64)> {
        nodes
            .iter()
            .filter_map(|n| match *n {
                Node::Position {
                    from_x,
                    from_y,
                    to_x,
                    to_y,
                    ..
                } => Some((from_x, from_y, to_x, to_y)),
                Node::ToolChange { .. } => None,
            })
            .collect()
    }

    fn arc_nodes(nodes: &[Node], line: usize) -> Vec<Node> {
        nodes
            .iter()
            .filter(|n| n.source_line() == line)
            .copied()
            .collect()
    }

    #[test]
    fn test_pen_up_moves_are_hidden() {
        let lines = ["G0 X10 Y10", "G1 Z50", "G1 X20 Y10"];
        let nodes = compile(&lines, &drawing());

        // lowering the pen is a zero-length stroke of its own
        assert_eq!(
            strokes(&nodes),
            vec![(10.0, 10.0, 10.0, 10.0), (10.0, 10.0, 20.0, 10.0)]
        );
        assert_eq!(nodes[1].source_line(), 2);
        assert_eq!(nodes[1].color(), Color::BLACK);
    }

    #[test]
    fn test_pen_up_moves_are_shown_in_pen_up_color() {
        let settings = MachineSettings {
            show_pen_up: true,
            ..drawing()
        };
        let nodes = compile(&["G0 X10"], &settings);

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].color(), settings.pen_up_color);
    }

    #[test]
    fn test_relative_mode() {
        let lines = ["G1 Z50", "G91", "G1 X5 Y5", "G54", "G1 X5", "G90", "G1 X0 Y0"];
        let nodes = compile(&lines, &drawing());

        assert_eq!(
            strokes(&nodes),
            vec![
                (0.0, 0.0, 0.0, 0.0),
                (0.0, 0.0, 5.0, 5.0),
                (5.0, 5.0, 10.0, 5.0),
                (10.0, 5.0, 0.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_inches() {
        let nodes = compile(&["G1 Z50", "G20", "G1 X1"], &drawing());
        assert_eq!(
            strokes(&nodes),
            vec![(0.0, 0.0, 0.0, 0.0), (0.0, 0.0, 25.4, 0.0)]
        );
    }

    #[test]
    fn test_tool_change_sets_pen_down_color() {
        let lines = ["M06 T16711680", "G1 Z50", "G1 X10"];
        let nodes = compile(&lines, &drawing());
        let red = Color::rgb(255, 0, 0);

        assert_eq!(
            nodes[0],
            Node::ToolChange {
                color: red,
                source_line: 0
            }
        );
        assert_eq!(nodes[1].color(), red);
    }

    #[test]
    fn test_bad_tool_id_is_skipped() {
        let nodes = compile(&["M06 Tblue", "M06 T255 ; blue"], &drawing());

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].color(), Color::rgb(0, 0, 255));
        assert_eq!(nodes[0].source_line(), 1);
    }

    #[test]
    fn test_bad_word_drops_the_whole_line() {
        let lines = ["G1 Z50", "G1 X10 Y1x", "G1 X5"];
        let nodes = compile(&lines, &drawing());

        // the broken line neither draws nor moves the pen
        assert_eq!(
            strokes(&nodes),
            vec![(0.0, 0.0, 0.0, 0.0), (0.0, 0.0, 5.0, 0.0)]
        );
        assert_eq!(nodes[1].source_line(), 2);
    }

    #[test]
    fn test_bad_word_does_not_leak_modal_state() {
        let lines = ["G1 Z50", "G91 Xoops", "G1 X5", "G1 X5"];
        let nodes = compile(&lines, &drawing());

        // still absolute: the second X5 is a zero-length stroke
        assert_eq!(
            strokes(&nodes),
            vec![
                (0.0, 0.0, 0.0, 0.0),
                (0.0, 0.0, 5.0, 0.0),
                (5.0, 0.0, 5.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_arc_tessellation_closes_on_end_point() {
        let lines = ["G0 X10 Y0", "G1 Z50", "G3 X0 Y10 I-10 J0"];
        let segments = strokes(&arc_nodes(&compile(&lines, &drawing()), 2));

        let expected_steps = (FRAC_PI_2 * 10.0 * ARC_SEGMENTS_PER_MM).ceil() as usize;
        assert_eq!(segments.len(), expected_steps);

        let (fx, fy, _, _) = segments[0];
        assert_eq!((fx, fy), (10.0, 0.0));
        let (_, _, lx, ly) = *segments.last().unwrap();
        assert_eq!((lx, ly), (0.0, 10.0));

        // chained segments
        for pair in segments.windows(2) {
            assert_eq!((pair[0].2, pair[0].3), (pair[1].0, pair[1].1));
        }

        // every point lies on the circle
        for (_, _, x, y) in &segments {
            assert!((x.hypot(*y) - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_clockwise_arc_bends_the_other_way() {
        let lines = ["G0 X10 Y0", "G1 Z50", "G2 X0 Y10 I-10 J0"];
        let segments = strokes(&arc_nodes(&compile(&lines, &drawing()), 2));

        // three quarters of the circle, passing through negative y
        assert_eq!(segments.len(), (3.0 * FRAC_PI_2 * 10.0).ceil() as usize);
        assert!(segments.iter().any(|s| s.3 < -9.0));
    }

    #[test]
    fn test_huge_arc_is_capped() {
        let lines = ["G1 Z50", "G2 X2000000 Y0 I1000000 J0"];
        let segments = strokes(&arc_nodes(&compile(&lines, &drawing()), 1));

        assert_eq!(segments.len(), MAX_ARC_STEPS);
        let (_, _, lx, ly) = *segments.last().unwrap();
        assert_eq!((lx, ly), (2_000_000.0, 0.0));
    }

    #[test]
    fn test_infinite_coordinate_drops_the_line() {
        let lines = ["G1 Z50", "G1 X10", "G1 Xinf", "G1 X0"];
        let nodes = compile(&lines, &drawing());

        assert_eq!(
            strokes(&nodes),
            vec![(0.0, 0.0, 0.0, 0.0), (0.0, 0.0, 10.0, 0.0), (10.0, 0.0, 0.0, 0.0)]
        );
    }

    #[test]
    fn test_degenerate_arc_is_one_segment() {
        let nodes = compile(&["G1 Z50", "G2 X0 Y0"], &drawing());
        assert_eq!(
            strokes(&arc_nodes(&nodes, 1)),
            vec![(0.0, 0.0, 0.0, 0.0)]
        );
    }

    #[test]
    fn test_source_lines_are_non_decreasing() {
        let lines = [
            "G1 Z50",
            "G1 X10",
            "G2 X20 Y0 I5 J0",
            "M06 T65280",
            "G3 X10 Y0 I-5 J0",
        ];
        let nodes = compile(&lines, &drawing());

        assert!(nodes.windows(2).all(|w| w[0].source_line() <= w[1].source_line()));
    }
}
