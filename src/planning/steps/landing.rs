use crate::output::ControlOutput;
use crate::planning::context::TickContext;

/// Roof counts as upright above this
const UPRIGHT_ROOF_Z: f32 = 0.98;
const ROTATION_GAIN: f32 = 2.0;

/// Rolls and pitches the roof toward the sky until the wheels touch down
#[derive(Debug, Clone, Default)]
pub struct LandGracefullyStep;

impl LandGracefullyStep {
    pub fn new() -> Self {
        Self
    }

    pub(super) fn poll(&mut self, ctx: &TickContext) -> Option<ControlOutput> {
        let car = &ctx.car;
        if car.has_wheel_contact {
            return None;
        }

        let orientation = &car.orientation;
        if orientation.roof.z > UPRIGHT_ROOF_Z {
            return Some(ControlOutput::new().with_throttle(1.0));
        }

        // Nose up pitches down; right side low rolls left
        Some(
            ControlOutput::new()
                .with_throttle(1.0)
                .with_pitch(-orientation.nose.z * ROTATION_GAIN)
                .with_roll(orientation.right().z * ROTATION_GAIN),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::context::fixture::Fixture;
    use crate::sim::CarOrientation;
    use glam::Vec3;

    fn fixture() -> Fixture {
        Fixture::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 50.0, 1.8555), Vec3::ZERO)
    }

    #[test]
    fn test_done_on_wheel_contact() {
        let fixture = fixture();
        assert!(LandGracefullyStep::new().poll(&fixture.ctx()).is_none());
    }

    #[test]
    fn test_rolls_upright() {
        let mut fixture = fixture();
        fixture.car.has_wheel_contact = false;
        // Facing +y and rolled 90 degrees right: roof along +x, right side down
        fixture.car.orientation = CarOrientation {
            nose: Vec3::Y,
            roof: Vec3::X,
        };
        let output = LandGracefullyStep::new().poll(&fixture.ctx()).unwrap();
        assert!(output.roll < 0.0);
        assert_eq!(output.pitch, 0.0);
    }

    #[test]
    fn test_pitches_nose_down() {
        let mut fixture = fixture();
        fixture.car.has_wheel_contact = false;
        fixture.car.orientation = CarOrientation {
            nose: Vec3::new(0.0, 0.6, 0.8),
            roof: Vec3::new(0.0, -0.8, 0.6),
        };
        let output = LandGracefullyStep::new().poll(&fixture.ctx()).unwrap();
        assert!(output.pitch < 0.0);
        assert!(output.roll.abs() < 1e-5);
    }
}
