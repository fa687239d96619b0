use glam::Vec3;

use crate::flat_distance;
use crate::intercept::{find_filtered_intercept, find_intercept, is_vertically_accessible};
use crate::output::ControlOutput;
use crate::planning::context::TickContext;
use crate::planning::steer::steer_toward;

/// Car centre within this of the ball surface counts as a touch
const TOUCH_REACH: f32 = 2.0;

/// Drives at the earliest reachable ball position until the car touches the ball
#[derive(Debug, Clone, Default)]
pub struct ChaseStep;

impl ChaseStep {
    pub fn new() -> Self {
        Self
    }

    pub(super) fn poll(&mut self, ctx: &TickContext) -> Option<ControlOutput> {
        let car = &ctx.car;
        if car.position.distance(ctx.ball.space) < ctx.arena.ball_radius + TOUCH_REACH {
            log::debug!("Chase reached the ball");
            return None;
        }

        let plot = ctx.reach_plot(car.boost, flat_distance(car.position, ctx.ball.space));
        let target = find_intercept(car, ctx.path, &plot)
            .map(|intercept| intercept.space)
            .unwrap_or_else(|| ctx.path.end().space);

        steer_toward(car, target)
    }
}

/// Drives at an offset from the earliest reachable ball position.
///
/// Finishes when no intercept is feasible any more or the moment first chosen has passed.
#[derive(Debug, Clone)]
pub struct InterceptStep {
    modifier: Vec3,
    chosen_time: Option<f32>,
}

impl InterceptStep {
    pub fn new(modifier: Vec3) -> Self {
        Self {
            modifier,
            chosen_time: None,
        }
    }

    /// Offset added to the ball position when aiming
    pub fn modifier(&self) -> Vec3 {
        self.modifier
    }

    pub fn chosen_time(&self) -> Option<f32> {
        self.chosen_time
    }

    pub(super) fn poll(&mut self, ctx: &TickContext) -> Option<ControlOutput> {
        let car = &ctx.car;
        let plot = ctx.reach_plot(car.boost, 0.0);
        let Some(intercept) =
            find_filtered_intercept(car, ctx.path, &plot, self.modifier, is_vertically_accessible)
        else {
            log::debug!("No intercept available");
            return None;
        };

        let chosen_time = *self.chosen_time.get_or_insert(intercept.time);
        if ctx.time > chosen_time {
            log::debug!("Intercept moment has passed");
            return None;
        }

        steer_toward(car, intercept.space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::context::fixture::Fixture;

    #[test]
    fn test_chase_drives_at_ball() {
        let fixture = Fixture::new(Vec3::new(0.0, -40.0, 0.34), Vec3::new(0.0, 0.0, 1.8555), Vec3::ZERO);
        let output = ChaseStep::new().poll(&fixture.ctx()).unwrap();
        assert_eq!(output.throttle, 1.0);
        assert!(output.steer.abs() < 1e-3);
        assert!(output.boost);
    }

    #[test]
    fn test_chase_done_on_touch() {
        let fixture = Fixture::new(Vec3::new(0.0, -3.0, 0.34), Vec3::new(0.0, 0.0, 1.8555), Vec3::ZERO);
        assert!(ChaseStep::new().poll(&fixture.ctx()).is_none());
    }

    #[test]
    fn test_intercept_finishes_once_moment_passes() {
        let fixture = Fixture::new(Vec3::new(0.0, -40.0, 0.34), Vec3::new(0.0, 0.0, 1.8555), Vec3::ZERO);
        let mut step = InterceptStep::new(Vec3::new(0.0, -1.5, 0.0));
        assert!(step.poll(&fixture.ctx()).is_some());
        let chosen = step.chosen_time().unwrap();
        assert!(chosen > 0.0);

        let later = fixture.advanced(chosen + 0.5);
        assert!(step.poll(&later.ctx()).is_none());
    }

    #[test]
    fn test_intercept_gives_up_when_unreachable() {
        // Ball sails high over a car with no boost to climb after it
        let mut fixture = Fixture::new(
            Vec3::new(0.0, -80.0, 0.34),
            Vec3::new(0.0, 60.0, 30.0),
            Vec3::new(0.0, 30.0, 5.0),
        );
        fixture.car.boost = 0.0;
        assert!(InterceptStep::new(Vec3::ZERO).poll(&fixture.ctx()).is_none());
    }
}
