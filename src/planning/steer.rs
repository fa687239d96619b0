//! Ground steering toward a target point

use std::f32::consts::PI;

use glam::Vec3;

use crate::intercept::SUPERSONIC_SPEED;
use crate::output::ControlOutput;
use crate::sim::CarState;
use crate::{correction_angle, flat_distance};

/// Boost only when this well lined up (radians)
const BOOST_ANGLE: f32 = PI / 12.0;
/// Handbrake when the target is further round than this (radians)
const HANDBRAKE_ANGLE: f32 = PI / 2.0;
const HANDBRAKE_MIN_SPEED: f32 = 15.0;
/// Boosting for short hops wastes boost
const MIN_BOOST_DISTANCE: f32 = 30.0;

/// Angle from the car's nose to `target` on the ground plane, counter-clockwise positive
pub fn correction_angle_to(car: &CarState, target: Vec3) -> Option<f32> {
    let nose = car.orientation.nose.truncate();
    let to_target = (target - car.position).truncate();
    correction_angle(nose, to_target)
}

/// Drive toward `target` at full throttle.
///
/// `None` when the car is already on top of the target.
pub fn steer_toward(car: &CarState, target: Vec3) -> Option<ControlOutput> {
    let angle = correction_angle_to(car, target)?;
    let speed = car.velocity.truncate().length();
    let distance = flat_distance(car.position, target);

    // Sharper turns at speed; positive steer turns right (clockwise)
    let turn_sharpness = angle * 6.0 / PI + angle * speed * 0.1;
    let mut output = ControlOutput::new()
        .with_throttle(1.0)
        .with_steer(-turn_sharpness);

    if angle.abs() > HANDBRAKE_ANGLE && speed > HANDBRAKE_MIN_SPEED {
        output = output.with_handbrake();
    }
    if angle.abs() < BOOST_ANGLE
        && car.has_wheel_contact
        && car.boost > 0.0
        && distance > MIN_BOOST_DISTANCE
        && speed < SUPERSONIC_SPEED - 1.0
    {
        output = output.with_boost();
    }

    Some(output)
}
