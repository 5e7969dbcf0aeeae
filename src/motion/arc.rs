//! Arc sweep math shared by the estimator and the geometry compiler.

use std::f64::consts::TAU;

/// Angle of (dx, dy) normalized to `[0, 2π)`
pub fn normalized_angle(dy: f64, dx: f64) -> f64 {
    let angle = dy.atan2(dx);
    if angle < 0.0 { TAU + angle } else { angle }
}

/// Circular arc from a start point to an end point around a center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSweep {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    /// Angle of the start point, possibly shifted by a full turn
    pub start_angle: f64,
    /// Signed sweep, negative for clockwise
    pub sweep: f64,
}

impl ArcSweep {
    pub fn new(from: (f64, f64), to: (f64, f64), center: (f64, f64), clockwise: bool) -> Self {
        let (cx, cy) = center;
        let dx = from.0 - cx;
        let dy = from.1 - cy;
        let radius = (dx * dx + dy * dy).sqrt();

        let mut start_angle = normalized_angle(dy, dx);
        let mut end_angle = normalized_angle(to.1 - cy, to.0 - cx);
        let theta = end_angle - start_angle;

        if !clockwise && theta < 0.0 {
            end_angle += TAU;
        } else if clockwise && theta > 0.0 {
            start_angle += TAU;
        }

        Self {
            center_x: cx,
            center_y: cy,
            radius,
            start_angle,
            sweep: end_angle - start_angle,
        }
    }

    /// Length along the arc
    pub fn length(&self) -> f64 {
        self.sweep.abs() * self.radius
    }

    /// Point at `fraction` (0..=1) of the sweep
    pub fn point_at(&self, fraction: f64) -> (f64, f64) {
        let angle = self.start_angle + self.sweep * fraction;
        (
            self.center_x + angle.cos() * self.radius,
            self.center_y + angle.sin() * self.radius,
        )
    }
}
