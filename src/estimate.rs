//! Motion profile estimation
//!
//! Walks a whole program once and sums up drawing time and path length.
//! Every move is timed as if it starts and ends at rest, so the estimate
//! is pessimistic for long chains of short segments.

use serde::Serialize;

use crate::error::ParseError;
use crate::motion::{trapezoid_time, ArcSweep, MotionState, INCHES_TO_MM};
use crate::parser::{parse_line, Motion, Word};
use crate::settings::MachineSettings;

/// Totals of one estimate pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProfileStats {
    pub estimated_time_ms: f64,
    pub estimated_length_mm: f64,
    /// Number of moves with a non-zero length
    pub segment_count: usize,
}

/// A line the estimator could not fully read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// 0-based line index
    pub line: usize,
    /// Raw line text
    pub content: String,
    pub message: String,
}

/// Result of an estimate pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Estimate {
    pub stats: ProfileStats,
    pub diagnostics: Vec<Diagnostic>,
}

/// Estimates execution time and length of a program
#[derive(Debug, Clone)]
pub struct MotionProfileEstimator {
    state: MotionState,
    z_rate: f64,
    time_s: f64,
    stats: ProfileStats,
    diagnostics: Vec<Diagnostic>,
}

/// Line targets, defaulting to the previous position
struct Targets {
    x: f64,
    y: f64,
    z: f64,
    center_x: f64,
    center_y: f64,
}

impl MotionProfileEstimator {
    pub fn new(settings: &MachineSettings) -> Self {
        Self {
            state: MotionState::at_home(settings),
            z_rate: settings.z_rate,
            time_s: 0.0,
            stats: ProfileStats::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Estimate a whole program
    pub fn estimate<S: AsRef<str>>(mut self, lines: &[S]) -> Estimate {
        for (index, line) in lines.iter().enumerate() {
            self.process_line(index, line.as_ref());
        }

        self.stats.estimated_time_ms = self.time_s * 1000.0;
        log::debug!(
            "Estimated {} segments, {:.1} mm, {:.0} ms",
            self.stats.segment_count,
            self.stats.estimated_length_mm,
            self.stats.estimated_time_ms
        );

        Estimate {
            stats: self.stats,
            diagnostics: self.diagnostics,
        }
    }

    fn process_line(&mut self, index: usize, line: &str) {
        let parsed = parse_line(line);

        let mut targets = Targets {
            x: self.state.x,
            y: self.state.y,
            z: self.state.z,
            center_x: self.state.x,
            center_y: self.state.y,
        };

        for word in &parsed.words {
            if let Err(e) = self.apply_word(word, &mut targets) {
                log::warn!("Error on line {}: '{}' ({})", index, line, e);
                self.diagnostics.push(Diagnostic {
                    line: index,
                    content: line.to_string(),
                    message: e.to_string(),
                });
                break;
            }
        }

        let state = &mut self.state;

        if targets.z != state.z {
            self.time_s += trapezoid_time(
                (targets.z - state.z).abs(),
                0.0,
                0.0,
                self.z_rate,
                state.acceleration,
            );
        }

        let length = match parsed.motion() {
            Some(Motion::Linear) => (targets.x - state.x).hypot(targets.y - state.y),
            Some(motion) => ArcSweep::new(
                (state.x, state.y),
                (targets.x, targets.y),
                (targets.center_x, targets.center_y),
                motion == Motion::ArcClockwise,
            )
            .length(),
            None => 0.0,
        };

        if length > 0.0 {
            self.time_s += trapezoid_time(length, 0.0, 0.0, state.feed_rate, state.acceleration);
            self.stats.estimated_length_mm += length;
            self.stats.segment_count += 1;
        }

        state.x = targets.x;
        state.y = targets.y;
        state.z = targets.z;
        state.arc_center_x = targets.center_x;
        state.arc_center_y = targets.center_y;
    }

    fn apply_word(&mut self, word: &Word, targets: &mut Targets) -> Result<(), ParseError> {
        let state = &mut self.state;

        match word.letter {
            'G' if word.value == "20" => state.scale = INCHES_TO_MM,
            'G' if word.value == "21" => state.scale = 1.0,
            'F' => {
                let v = word.number()? * state.scale;
                if v.is_finite() && v > 0.0 {
                    state.feed_rate = v;
                }
            }
            'A' => {
                let v = word.number()? * state.scale;
                if v.is_finite() && v > 0.0 {
                    state.acceleration = v;
                }
            }
            'X' => targets.x = word.number()? * state.scale,
            'Y' => targets.y = word.number()? * state.scale,
            'Z' => targets.z = word.number()? * state.scale,
            'I' => targets.center_x = state.x + word.number()? * state.scale,
            'J' => targets.center_y = state.y + word.number()? * state.scale,
            _ => {}
        }

        Ok(())
    }
}

/// Convenience wrapper for a single estimate pass
pub fn estimate<S: AsRef<str>>(lines: &[S], settings: &MachineSettings) -> Estimate {
    MotionProfileEstimator::new(settings).estimate(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn settings() -> MachineSettings {
        MachineSettings {
            pen_down_feed_rate: 20.0,
            acceleration: 100.0,
            z_rate: 10.0,
            ..MachineSettings::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_no_motion_is_all_zero() {
        let lines = ["; header", "", "M17", "G21", "G90"];
        let result = estimate(&lines, &settings());

        assert_eq!(result.stats, ProfileStats::default());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_linear_length_and_count() {
        let lines = ["G1 X3 Y4", "G0 X3 Y4", "G01 X3 Y0"];
        let result = estimate(&lines, &settings());

        // the second move has zero length and is not counted
        assert_eq!(result.stats.segment_count, 2);
        assert!(close(result.stats.estimated_length_mm, 9.0));
    }

    #[test]
    fn test_inches_scale_persists() {
        let lines = ["G20", "G1 X1", "G1 X2", "G21", "G1 X3"];
        let result = estimate(&lines, &settings());

        // 25.4 + 25.4 + |3 - 50.8|
        assert!(close(result.stats.estimated_length_mm, 25.4 + 25.4 + 47.8));
    }

    #[test]
    fn test_feed_rate_ignores_non_positive_values() {
        let base = estimate(&["G1 X100"], &settings()).stats.estimated_time_ms;
        let same = estimate(&["G1 F0 X100"], &settings()).stats.estimated_time_ms;
        let faster = estimate(&["G1 F40 X100"], &settings()).stats.estimated_time_ms;

        assert!(close(base, same));
        assert!(faster < base);
    }

    #[test]
    fn test_nan_feed_rate_is_a_bad_token() {
        let result = estimate(&["G1 X100 FNaN", "G1 X200"], &settings());
        let clean = estimate(&["G1 X100", "G1 X200"], &settings());

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].line, 0);
        assert_eq!(result.stats, clean.stats);
    }

    #[test]
    fn test_infinite_coordinate_stays_on_its_line() {
        let result = estimate(&["G1 X10", "G1 Xinf", "G1 X0"], &settings());

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].line, 1);
        assert!(result.stats.estimated_time_ms.is_finite());
        assert!(close(result.stats.estimated_length_mm, 20.0));
        assert_eq!(result.stats.segment_count, 2);
    }

    #[test]
    fn test_z_moves_add_time_only() {
        let result = estimate(&["G0 Z50", "G0 Z90"], &settings());

        assert_eq!(result.stats.segment_count, 0);
        assert_eq!(result.stats.estimated_length_mm, 0.0);
        let one_lift = trapezoid_time(40.0, 0.0, 0.0, 10.0, 100.0) * 1000.0;
        assert!(close(result.stats.estimated_time_ms, 2.0 * one_lift));
    }

    #[test]
    fn test_arc_center_is_relative_to_start() {
        // start at (10, 0), center offset (-10, 0) -> center at origin
        let lines = ["G1 X10 Y0", "G3 X0 Y10 I-10 J0"];
        let result = estimate(&lines, &settings());

        assert_eq!(result.stats.segment_count, 2);
        assert!(close(result.stats.estimated_length_mm, 10.0 + FRAC_PI_2 * 10.0));
    }

    #[test]
    fn test_bad_token_is_reported_and_line_keeps_parsed_part() {
        let lines = ["G1 X10 Yoops X99", "G1 X10 Y10"];
        let result = estimate(&lines, &settings());

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].line, 0);
        assert_eq!(result.diagnostics[0].content, "G1 X10 Yoops X99");
        // X10 was kept, X99 was never read
        assert!(close(result.stats.estimated_length_mm, 20.0));
    }

    #[test]
    fn test_position_advances_without_motion_word() {
        // a bare coordinate line still moves the tracked position
        let lines = ["X50", "G1 X60"];
        let result = estimate(&lines, &settings());

        assert_eq!(result.stats.segment_count, 1);
        assert!(close(result.stats.estimated_length_mm, 10.0));
    }

    #[test]
    fn test_starts_from_home() {
        let settings = MachineSettings {
            home_x: 0.0,
            home_y: 10.0,
            ..settings()
        };
        let result = estimate(&["G1 X0 Y0"], &settings);
        assert!(close(result.stats.estimated_length_mm, 10.0));
    }
}
