//! Intercept search: earliest moment a car can meet the predicted ball

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::accel::{DistancePlot, DistanceTime, simulate_acceleration};
use crate::consts::BASE_CAR_Z;
use crate::flat_distance;
use crate::sim::{BallPath, CarState, SpaceTime, SpaceTimeVelocity};

/// Targets above this height need an aerial rather than a jump
pub const NEEDS_AERIAL_THRESHOLD: f32 = 4.8;
/// Targets below this height can be flipped into from the ground
pub const NEEDS_JUMP_HIT_THRESHOLD: f32 = 3.2;
/// Boost reserved for the climb of an aerial
pub const BOOST_NEEDED_FOR_AERIAL: f32 = 20.0;

const AERIAL_RISE_RATE: f32 = 5.0;
const JUMP_RISE_RATE: f32 = 6.0;
const MAX_JUMP_HIT_SECONDS: f32 = 0.8;
/// Launches may be this late and still count as reachable
const LAUNCH_SLACK: f32 = 0.1;
/// Horizon of the plot built by `intercept_assuming_max_accel`
const MAX_ACCEL_HORIZON: f32 = 4.0;

/// A feasible rendezvous between a car and the ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intercept {
    /// Where the car aims: ball position plus the caller's modifier
    pub space: Vec3,
    pub time: f32,
    /// Boost an aerial needs to reach this height (0 for ground touches)
    pub air_boost: f32,
    /// Ball sample the intercept was taken from
    pub ball_slice: SpaceTimeVelocity,
    /// Car reach at the intercept moment
    pub accel_slice: DistanceTime,
    /// Seconds the ball was in range but rejected by the predicate
    pub spatial_predicate_failure_period: f32,
}

impl Intercept {
    pub fn to_space_time(&self) -> SpaceTime {
        SpaceTime::new(self.space, self.time)
    }
}

/// Boost an aerial to `height` will burn
pub fn boost_needed_for_aerial(height: f32) -> f32 {
    if height > NEEDS_AERIAL_THRESHOLD {
        BOOST_NEEDED_FOR_AERIAL
    } else {
        0.0
    }
}

/// Boost a car can spend on the approach and still afford an aerial
pub fn boost_budget(car: &CarState) -> f32 {
    car.boost - BOOST_NEEDED_FOR_AERIAL - 5.0
}

/// Seconds to spare before an aerial to `height` must launch. Negative means late.
pub fn aerial_launch_countdown(height: f32, seconds_till_intercept: f32) -> f32 {
    let expected_aerial_seconds = (height - BASE_CAR_Z) / AERIAL_RISE_RATE;
    seconds_till_intercept - expected_aerial_seconds
}

/// Seconds a jump hit to `height` takes from takeoff
pub fn jump_hit_seconds(height: f32) -> f32 {
    // Tilting back raises the nose, so the car only has to rise 70% of the way
    let required_height = height * 0.7 - BASE_CAR_Z;
    if required_height > NEEDS_AERIAL_THRESHOLD {
        return MAX_JUMP_HIT_SECONDS;
    }
    (required_height.max(0.0) / JUMP_RISE_RATE).min(MAX_JUMP_HIT_SECONDS)
}

/// Whether the car can get up to the target height in time
pub fn is_vertically_accessible(car: &CarState, target: &SpaceTime) -> bool {
    let seconds_till_intercept = target.time - car.time;

    if target.space.z < NEEDS_AERIAL_THRESHOLD {
        return seconds_till_intercept - jump_hit_seconds(target.space.z) >= -LAUNCH_SLACK;
    }

    if car.boost > BOOST_NEEDED_FOR_AERIAL {
        return aerial_launch_countdown(target.space.z, seconds_till_intercept) >= -LAUNCH_SLACK;
    }
    false
}

/// Earliest path sample the car can reach by driving flat out.
pub fn find_intercept(car: &CarState, path: &BallPath, plot: &DistancePlot) -> Option<Intercept> {
    find_filtered_intercept(car, path, plot, Vec3::ZERO, |_, _| true)
}

/// Earliest reachable `sample + modifier` that also satisfies `predicate`.
///
/// Samples are scanned in time order and the first feasible one wins. Returns `None`
/// when nothing qualifies or the path runs past the end of the plot before anything
/// does.
pub fn find_filtered_intercept<F>(
    car: &CarState,
    path: &BallPath,
    plot: &DistancePlot,
    modifier: Vec3,
    predicate: F,
) -> Option<Intercept>
where
    F: Fn(&CarState, &SpaceTime) -> bool,
{
    let mut first_moment_in_range: Option<f32> = None;

    for slice in path.samples() {
        let target = SpaceTime::new(slice.space + modifier, slice.time);
        let elapsed = target.time - car.time;
        if elapsed < 0.0 {
            continue;
        }
        let reach = plot.motion_after(elapsed)?;

        if flat_distance(car.position, target.space) > reach.distance {
            continue;
        }
        let first_in_range = *first_moment_in_range.get_or_insert(target.time);

        if predicate(car, &target) {
            return Some(Intercept {
                space: target.space,
                time: target.time,
                air_boost: boost_needed_for_aerial(target.space.z),
                ball_slice: *slice,
                accel_slice: reach,
                spatial_predicate_failure_period: target.time - first_in_range,
            });
        }
    }

    None
}

/// Intercept against a fresh plot that spends `boost_budget` on the approach
pub fn intercept_assuming_max_accel(
    car: &CarState,
    path: &BallPath,
    boost_budget: f32,
) -> Option<Intercept> {
    let plot = simulate_acceleration(car, MAX_ACCEL_HORIZON, boost_budget, 0.0);
    find_intercept(car, path, &plot)
}
