//! Kinematic and modal state carried across lines of one traversal.

use crate::settings::{Color, MachineSettings};

/// Millimetres per inch, the `G20` scale
pub const INCHES_TO_MM: f64 = 25.4;

/// Pen counts as lifted when Z is this close to the pen-up angle
pub const PEN_LIFT_TOLERANCE: f64 = 0.1;

/// Mutable parsing context of a single pass over a program
///
/// The estimator and the geometry compiler each own one; they never share.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Arc center of the line being read
    pub arc_center_x: f64,
    pub arc_center_y: f64,
    /// Unit scale, 1.0 for mm and 25.4 for inches
    pub scale: f64,
    /// `G90` (true) or `G91` (false)
    pub absolute: bool,
    pub feed_rate: f64,
    pub acceleration: f64,
    pub pen_down_color: Color,
    pub pen_up_color: Color,
    /// Color currently used for emitted strokes
    pub stroke_color: Color,
    pub pen_lifted: bool,
}

impl MotionState {
    /// State at the start of a time estimate: at home, pen up
    pub fn at_home(settings: &MachineSettings) -> Self {
        Self {
            x: settings.home_x,
            y: settings.home_y,
            ..Self::at_origin(settings)
        }
    }

    /// State at the start of a preview: program origin, pen up
    pub fn at_origin(settings: &MachineSettings) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: settings.pen_up_angle,
            arc_center_x: 0.0,
            arc_center_y: 0.0,
            scale: 1.0,
            absolute: true,
            feed_rate: settings.pen_down_feed_rate,
            acceleration: settings.acceleration,
            pen_down_color: settings.pen_down_color,
            pen_up_color: settings.pen_up_color,
            stroke_color: settings.pen_up_color,
            pen_lifted: true,
        }
    }

    /// Recompute the lift flag and stroke color from Z
    pub fn update_pen(&mut self, pen_up_angle: f64) {
        self.pen_lifted = (pen_up_angle - self.z).abs() < PEN_LIFT_TOLERANCE;
        self.stroke_color = if self.pen_lifted {
            self.pen_up_color
        } else {
            self.pen_down_color
        };
    }
}
