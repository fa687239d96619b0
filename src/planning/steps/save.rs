use std::f32::consts::PI;

use glam::Vec3;

use crate::intercept::find_intercept;
use crate::output::ControlOutput;
use crate::planning::context::TickContext;
use crate::planning::plan::{Plan, Posture};
use crate::{correction_angle, flat_distance};

use super::{ChaseStep, InterceptStep};

/// Approaches steeper than this against the ball's travel go goal-side first
const POOR_APPROACH_ANGLE: f32 = PI / 5.0;
/// Offset toward our own goal for goal-side intercepts
const GOAL_SIDE_OFFSET: f32 = 1.5;
/// Sideways lean toward the covered post
const POST_BIAS: f32 = 1.0;
/// Stop flipping this far short of the threat
const FLIP_MARGIN: f32 = 15.0;

/// Keeps the ball out of our goal while a goal is predicted
#[derive(Debug, Clone, Default)]
pub struct SaveStep {
    plan: Option<Plan>,
    which_post: Option<f32>,
}

impl SaveStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// +1 or -1 for the post on the positive or negative x side, once chosen
    pub fn which_post(&self) -> Option<f32> {
        self.which_post
    }

    pub fn can_interrupt(&self) -> bool {
        self.plan.as_ref().is_none_or(Plan::can_interrupt)
    }

    pub fn situation(&self) -> String {
        Plan::concat_situation("Making a save", self.sub_plan())
    }

    pub fn sub_plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub(super) fn poll(&mut self, ctx: &TickContext) -> Option<ControlOutput> {
        let car = &ctx.car;
        let goal = ctx.arena.own_goal(ctx.team);
        let threat = goal.predict_goal_event(ctx.path, ctx.arena.ball_radius)?;

        if let Some(plan) = self.plan.as_mut().filter(|p| !p.is_complete()) {
            if let Some(output) = plan.next_output(ctx) {
                return Some(output);
            }
        }

        let ball_flat_velocity = ctx.ball.velocity.truncate();
        let post = *self.which_post.get_or_insert_with(|| {
            let car_to_threat = (threat.space - car.position).truncate();
            let approach = correction_angle(car_to_threat, ball_flat_velocity).unwrap_or(0.0);
            // Negative approach: the car is to the right of the ball's line
            let post = (-approach * threat.space.y).signum();
            log::debug!("Save covering post {post}");
            post
        });

        let distance = flat_distance(car.position, threat.space);
        let plot = ctx.reach_plot(car.boost, distance - FLIP_MARGIN);
        let intercept = find_intercept(car, ctx.path, &plot)
            .map(|i| i.to_space_time())
            .unwrap_or_else(|| threat.to_space_time());

        let car_to_intercept = (intercept.space - car.position).truncate();
        let approach = correction_angle(car_to_intercept, ball_flat_velocity).unwrap_or(0.0);
        let plan = if approach.abs() > POOR_APPROACH_ANGLE {
            let modifier = Vec3::new(post * POST_BIAS, goal.center.y.signum() * GOAL_SIDE_OFFSET, 0.0);
            Plan::new(Posture::Save).with_step(InterceptStep::new(modifier))
        } else {
            Plan::new(Posture::Save).with_step(ChaseStep::new())
        };

        self.plan.insert(plan).next_output(ctx)
    }
}
