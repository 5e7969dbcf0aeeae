//! Trapezoidal velocity profile timing.

/// Seconds needed to travel `length` under a trapezoidal profile
///
/// `start_rate` and `end_rate` are the speeds at both ends of the move,
/// `max_v` the cruise speed and `accel` the acceleration limit, all in
/// consistent units (mm, mm/s, mm/s²).
///
/// When acceleration and deceleration ramps do not fit in `length` the move
/// never cruises; the ramps then meet at the balanced intersection point.
pub fn trapezoid_time(length: f64, start_rate: f64, end_rate: f64, max_v: f64, accel: f64) -> f64 {
    if length <= 0.0 || max_v <= 0.0 {
        return 0.0;
    }
    if accel <= 0.0 || !accel.is_finite() {
        return length / max_v;
    }

    let mut accel_distance = (max_v * max_v - start_rate * start_rate) / (2.0 * accel);
    let mut decel_distance = (end_rate * end_rate - max_v * max_v) / (-2.0 * accel);

    let cruise_distance = if accel_distance + decel_distance > length {
        let intersection =
            (2.0 * accel * length - start_rate * start_rate + end_rate * end_rate) / (4.0 * accel);
        accel_distance = intersection;
        decel_distance = length - intersection;
        0.0
    } else {
        length - accel_distance - decel_distance
    };

    let cruise_time = cruise_distance / max_v;
    let accel_time = ramp_time(accel_distance, max_v, accel);
    let decel_time = ramp_time(decel_distance, max_v, accel);

    cruise_time + accel_time + decel_time
}

/// Larger root of `0.5·a·t² + v·t − d = 0`, clamped to zero
fn ramp_time(distance: f64, max_v: f64, accel: f64) -> f64 {
    let discriminant = max_v * max_v + 2.0 * accel * distance;
    if discriminant < 0.0 {
        return 0.0;
    }

    let s = discriminant.sqrt();
    let a = (-max_v + s) / accel;
    let b = (-max_v - s) / accel;

    a.max(b).max(0.0)
}
