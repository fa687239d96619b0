//! Relief Bot - decision core for a car-soccer agent
//!
//! Core modules:
//! - `sim`: Deterministic ball prediction (arena geometry, collisions, paths)
//! - `intercept`: Car reachability envelope and intercept search
//! - `planning`: Plan/Step state machine and the maneuver catalog
//! - `agent`: Per-team decision loop and the team registry
//! - `settings`: Data-driven tuning

pub mod agent;
pub mod error;
pub mod intercept;
pub mod output;
pub mod planning;
pub mod settings;
pub mod sim;
pub mod telemetry;

pub use agent::{AgentRegistry, Bot};
pub use error::{SettingsError, SnapshotError, TelemetryError};
pub use output::ControlOutput;
pub use settings::{PredictionQuality, Settings};

use glam::{Vec2, Vec3};

/// Arena and timing constants, in the internal unit system (uu / 50)
pub mod consts {
    /// Default ball simulation step (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Default prediction horizon in seconds
    pub const PREDICTION_HORIZON: f32 = 5.0;

    /// Arena dimensions
    pub const SIDE_WALL: f32 = 81.92;
    pub const BACK_WALL: f32 = 102.4;
    pub const CEILING: f32 = 40.88;
    /// 45 degree corner walls come in this far from the rectangular corner
    pub const CORNER_BEVEL: f32 = 11.8;

    /// Goal mouth
    pub const GOAL_HALF_WIDTH: f32 = 17.8555;
    pub const GOAL_HEIGHT: f32 = 12.8555;
    pub const GOAL_DEPTH: f32 = 17.6;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 1.8555;
    pub const GRAVITY: f32 = 13.0;
    /// Fraction of normal speed kept after a bounce
    pub const BALL_RESTITUTION: f32 = 0.6;
    /// Fraction of tangential speed kept after a bounce
    pub const SURFACE_FRICTION: f32 = 1.0;

    /// Resting height of a car's centre on flat ground
    pub const BASE_CAR_Z: f32 = 0.34;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Signed angle (radians, counter-clockwise positive) that rotates `from` onto `to`.
///
/// Returns `None` when either vector is too short to have a direction.
pub fn correction_angle(from: Vec2, to: Vec2) -> Option<f32> {
    if from.length_squared() < 1e-8 || to.length_squared() < 1e-8 {
        return None;
    }
    let cross = from.x * to.y - from.y * to.x;
    Some(cross.atan2(from.dot(to)))
}

/// Rotate a 2-D vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate_vector(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Distance between two points ignoring height
#[inline]
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    a.truncate().distance(b.truncate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_correction_angle_sign() {
        let east = Vec2::new(1.0, 0.0);
        let north = Vec2::new(0.0, 1.0);
        let left_turn = correction_angle(east, north).unwrap();
        assert!((left_turn - FRAC_PI_2).abs() < 1e-5);
        let right_turn = correction_angle(north, east).unwrap();
        assert!((right_turn + FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_correction_angle_undefined_for_zero() {
        assert!(correction_angle(Vec2::ZERO, Vec2::X).is_none());
        assert!(correction_angle(Vec2::X, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_rotate_vector() {
        let rotated = rotate_vector(Vec2::new(1.0, 0.0), FRAC_PI_2);
        assert!(rotated.x.abs() < 1e-6);
        assert!((rotated.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_flat_distance_ignores_height() {
        let a = Vec3::new(0.0, 0.0, 10.0);
        let b = Vec3::new(3.0, 4.0, -5.0);
        assert!((flat_distance(a, b) - 5.0).abs() < 1e-6);
    }
}
