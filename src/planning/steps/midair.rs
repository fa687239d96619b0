//! Finishing an aerial once the car has left the ground

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::intercept::{Intercept, find_filtered_intercept, simulate_air_acceleration};
use crate::output::ControlOutput;
use crate::planning::context::TickContext;
use crate::planning::plan::Plan;
use crate::planning::steer::correction_angle_to;
use crate::sim::{CarState, SpaceTime};
use crate::{correction_angle, normalize_angle, rotate_vector};

use super::{BlindStep, TapStep};

const SIDE_DODGE_THRESHOLD: f32 = PI / 4.0;
/// Seconds before the intercept when a dodge is committed
const DODGE_TIME: f32 = 0.4;
/// Flip into the ball when this close
const DODGE_DISTANCE: f32 = 6.0;
/// The dodge is lost this long after leaving the ground
const MAX_TIME_FOR_AIR_DODGE: f32 = 1.5;
const YAW_OVERCORRECT: f32 = 0.1;
/// Boost acceleration minus what the wiggling costs
const EFFECTIVE_AIR_BOOST_ACCELERATION: f32 = 18.0;
const AIR_PLOT_HORIZON: f32 = 4.0;
const ORIENT_GAIN: f32 = 3.0;
/// Polls without an intercept before giving up
const MAX_CONFUSION: u32 = 3;

/// Pitches and yaws toward the aerial intercept with boost held.
///
/// Never interruptible: abandoning a car mid-air leaves it helpless.
#[derive(Debug, Clone)]
pub struct MidairStrikeStep {
    time_in_air_at_start: f32,
    plan: Option<Plan>,
    beginning: Option<f32>,
    confusion_count: u32,
    intercept: Option<SpaceTime>,
}

impl MidairStrikeStep {
    pub fn new(time_in_air_at_start: f32) -> Self {
        Self {
            time_in_air_at_start,
            plan: None,
            beginning: None,
            confusion_count: 0,
            intercept: None,
        }
    }

    pub fn situation(&self) -> String {
        Plan::concat_situation("Finishing aerial", self.sub_plan())
    }

    pub fn sub_plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    fn run_plan(&mut self, plan: Plan, ctx: &TickContext) -> Option<ControlOutput> {
        self.plan.insert(plan).next_output(ctx)
    }

    pub(super) fn poll(&mut self, ctx: &TickContext) -> Option<ControlOutput> {
        if let Some(plan) = &mut self.plan {
            if plan.is_complete() {
                return None;
            }
            return plan.next_output(ctx);
        }

        let beginning = *self.beginning.get_or_insert(ctx.time);
        let last_moment_for_dodge = beginning + MAX_TIME_FOR_AIR_DODGE - self.time_in_air_at_start;
        let car = &ctx.car;

        let offset = self.strike_offset(ctx);
        let Some(intercept) = aerial_intercept(car, ctx, offset) else {
            self.confusion_count += 1;
            if self.confusion_count > MAX_CONFUSION {
                log::debug!("Aerial lost the ball, front flipping out");
                let flip = ControlOutput::new().with_pitch(-1.0).with_jump();
                return self.run_plan(Plan::default().with_step(TapStep::new(2, flip)), ctx);
            }
            return Some(ControlOutput::new().with_boost());
        };
        self.intercept = Some(intercept.to_space_time());

        let car_to_intercept = intercept.space - car.position;
        let seconds_till_intercept = intercept.time - ctx.time;
        let distance = car.position.distance(ctx.ball.space);
        log::debug!("Midair strike running... Distance: {distance:.2}");

        if ctx.time < last_moment_for_dodge && distance < DODGE_DISTANCE {
            let correction = correction_angle_to(car, intercept.space).unwrap_or(0.0);
            let dodge = if correction.abs() <= SIDE_DODGE_THRESHOLD {
                log::debug!("Front flip strike");
                ControlOutput::new().with_pitch(-1.0).with_jump()
            } else {
                log::debug!("Side flip strike");
                // Positive correction is to the left
                let side = if correction < 0.0 { 1.0 } else { -1.0 };
                ControlOutput::new().with_steer(side).with_jump()
            };
            let plan = Plan::default()
                .with_step(BlindStep::new(ControlOutput::new(), 0.005))
                .with_step(BlindStep::new(dodge, 0.005));
            return self.run_plan(plan, ctx);
        }

        let right_direction = car_to_intercept
            .normalize_or_zero()
            .dot(car.velocity.normalize_or_zero());
        let seconds_so_far = ctx.time - beginning;
        if (seconds_till_intercept > DODGE_TIME && seconds_so_far > 2.0 && right_direction < 0.6)
            || right_direction < 0.0
        {
            log::debug!("Failed aerial on bad angle");
            return None;
        }

        Some(orient_toward(car, car_to_intercept, seconds_till_intercept, ctx.arena.gravity))
    }

    /// Aim a little behind the ball so the touch sends it toward the enemy goal
    fn strike_offset(&self, ctx: &TickContext) -> Vec3 {
        match self.intercept {
            None => {
                let own_goal = ctx.arena.own_goal(ctx.team);
                own_goal.center.normalize_or_zero() * 3.0 - Vec3::new(0.0, 0.0, 0.6)
            }
            Some(previous) => {
                let entrance = ctx.arena.enemy_goal(ctx.team).nearest_entrance(previous.space, 4.0);
                let goal_to_ball = previous.space - entrance;
                let mut offset = goal_to_ball.normalize_or_zero() * 2.5;
                if goal_to_ball.length() > 110.0 {
                    offset.z = -0.2;
                }
                offset
            }
        }
    }
}

fn aerial_intercept(car: &CarState, ctx: &TickContext, offset: Vec3) -> Option<Intercept> {
    let flat_fraction = car.orientation.nose.truncate().length();
    let plot = simulate_air_acceleration(car, AIR_PLOT_HORIZON, flat_fraction);
    find_filtered_intercept(car, ctx.path, &plot, offset, |_, _| true)
}

/// Where the car will be relative to the target height if it keeps boosting as it is
fn height_error(car: &CarState, car_to_intercept: Vec3, seconds: f32, gravity: f32) -> f32 {
    let target_height = car.position.z + car_to_intercept.z;
    let vertical_acceleration = EFFECTIVE_AIR_BOOST_ACCELERATION * car.orientation.nose.z - gravity;
    let resulting_height =
        car.position.z + car.velocity.z * seconds + 0.5 * vertical_acceleration * seconds * seconds;
    resulting_height - target_height
}

fn orient_toward(car: &CarState, car_to_intercept: Vec3, seconds: f32, gravity: f32) -> ControlOutput {
    let error = height_error(car, car_to_intercept, seconds, gravity);
    let flat_to_intercept = car_to_intercept.truncate();

    let flat_velocity = car.velocity.truncate();
    let reference = if flat_velocity.length_squared() > 1.0 {
        flat_velocity
    } else {
        car.orientation.nose.truncate()
    };
    let yaw_correction = correction_angle(reference, flat_to_intercept).unwrap_or(0.0);
    let desired_yaw = normalize_angle(yaw_correction + yaw_correction.signum() * YAW_OVERCORRECT);
    let desired_flat = rotate_vector(reference, desired_yaw).normalize_or_zero();

    let current_pitch = car.orientation.nose.z.clamp(-1.0, 1.0).asin();
    let desired_pitch = (current_pitch - error.signum() * 0.3).clamp(-PI / 2.0, PI / 2.0);

    let nose_flat = car.orientation.nose.truncate();
    let yaw_error = if nose_flat.length_squared() > 1e-6 && desired_flat != Vec2::ZERO {
        correction_angle(nose_flat, desired_flat).unwrap_or(0.0)
    } else {
        0.0
    };

    // Positive yaw turns right; positive roll rolls right
    ControlOutput::new()
        .with_pitch((desired_pitch - current_pitch) * ORIENT_GAIN)
        .with_yaw(-yaw_error * ORIENT_GAIN)
        .with_roll(car.orientation.right().z * ORIENT_GAIN)
        .with_boost()
        .with_jump()
}
