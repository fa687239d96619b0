//! Control output issued once per decision tick

use serde::{Deserialize, Serialize};

/// Controller state for one tick.
///
/// Continuous axes are clamped to [-1, 1] on every setter; absent axes are neutral.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlOutput {
    pub throttle: f32,
    pub steer: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub jump: bool,
    pub boost: bool,
    pub handbrake: bool,
}

/// Centre value of an axis in the host's integer encoding
const AXIS_CENTER: i32 = 16383;

fn clamp_axis(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) }
}

impl ControlOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_throttle(mut self, throttle: f32) -> Self {
        self.throttle = clamp_axis(throttle);
        self
    }

    pub fn with_steer(mut self, steer: f32) -> Self {
        self.steer = clamp_axis(steer);
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = clamp_axis(pitch);
        self
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = clamp_axis(yaw);
        self
    }

    pub fn with_roll(mut self, roll: f32) -> Self {
        self.roll = clamp_axis(roll);
        self
    }

    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    pub fn with_boost(mut self) -> Self {
        self.boost = true;
        self
    }

    pub fn with_handbrake(mut self) -> Self {
        self.handbrake = true;
        self
    }

    /// Clamp every axis; for outputs built by struct literal
    pub fn clamped(self) -> Self {
        Self {
            throttle: clamp_axis(self.throttle),
            steer: clamp_axis(self.steer),
            pitch: clamp_axis(self.pitch),
            yaw: clamp_axis(self.yaw),
            roll: clamp_axis(self.roll),
            ..self
        }
    }

    /// Integer vector for the host: axes in 0..=32766 around 16383, flags as 0/1.
    ///
    /// Order: throttle, steer, pitch, yaw, roll, jump, boost, handbrake.
    pub fn to_array(&self) -> [i32; 8] {
        let axis = |v: f32| AXIS_CENTER + (clamp_axis(v) * AXIS_CENTER as f32).round() as i32;
        [
            axis(self.throttle),
            axis(self.steer),
            axis(self.pitch),
            axis(self.yaw),
            axis(self.roll),
            self.jump as i32,
            self.boost as i32,
            self.handbrake as i32,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let output = ControlOutput::default();
        assert_eq!(output.to_array(), [16383, 16383, 16383, 16383, 16383, 0, 0, 0]);
    }

    #[test]
    fn test_axes_are_clamped() {
        let output = ControlOutput::new().with_steer(4.0).with_pitch(-2.5).with_roll(f32::NAN);
        assert_eq!(output.steer, 1.0);
        assert_eq!(output.pitch, -1.0);
        assert_eq!(output.roll, 0.0);
    }

    #[test]
    fn test_struct_literal_clamped() {
        let output = ControlOutput {
            throttle: 3.0,
            yaw: -7.0,
            jump: true,
            ..Default::default()
        }
        .clamped();
        assert_eq!(output.throttle, 1.0);
        assert_eq!(output.yaw, -1.0);
        assert!(output.jump);
    }

    #[test]
    fn test_to_array_extremes() {
        let output = ControlOutput::new().with_throttle(1.0).with_steer(-1.0).with_boost();
        let array = output.to_array();
        assert_eq!(array[0], 32766);
        assert_eq!(array[1], 0);
        assert_eq!(array[6], 1);
    }

    #[test]
    fn test_missing_fields_are_neutral() {
        let output: ControlOutput = serde_json::from_str(r#"{ "throttle": 0.5, "jump": true }"#).unwrap();
        assert_eq!(output, ControlOutput::new().with_throttle(0.5).with_jump());
        let empty: ControlOutput = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ControlOutput::default());
    }
}
