//! Car reachability: how far can a car get in a given time?
//!
//! A 1-D envelope under a maximal-acceleration policy. No steering is modelled,
//! so the plot answers "can the car cover distance D by time T" optimistically.

use serde::{Deserialize, Serialize};

use crate::sim::CarState;

/// Top speed with boost
pub const SUPERSONIC_SPEED: f32 = 46.0;
/// Throttle alone cannot push past this speed
pub const THROTTLE_SPEED_CAP: f32 = 28.2;
/// Throttle acceleration from a standstill
const THROTTLE_ACCEL_AT_REST: f32 = 32.0;
/// Throttle acceleration just below 28 u/s
const THROTTLE_ACCEL_AT_TAPER: f32 = 3.2;
const THROTTLE_TAPER_SPEED: f32 = 28.0;
/// Extra acceleration while boosting
pub const BOOST_ACCELERATION: f32 = 19.83;
/// Extra acceleration while boosting in the air
pub const AIR_BOOST_ACCELERATION: f32 = 19.0;
/// Boost units burned per second of boosting
pub const BOOST_CONSUMED_PER_SECOND: f32 = 33.3;
/// Speed gained by a front flip
pub const FRONT_FLIP_SPEED_BONUS: f32 = 10.0;
/// Seconds from flip start until the car can accelerate again
pub const FRONT_FLIP_DURATION: f32 = 1.3;
/// Flips below this speed gain too little to model
const MIN_FLIP_SPEED: f32 = 10.0;

/// Default plot resolution
pub const PLOT_STEP: f32 = 0.05;

/// Distance covered and speed reached after `time` seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceTime {
    pub distance: f32,
    /// Elapsed seconds from the car's snapshot time
    pub time: f32,
    pub speed: f32,
}

/// Monotonic distance-vs-time envelope for one car and one query context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistancePlot {
    samples: Vec<DistanceTime>,
}

impl DistancePlot {
    pub fn new(start: DistanceTime) -> Self {
        Self {
            samples: vec![start],
        }
    }

    /// Build from samples with increasing time and non-decreasing distance
    pub fn from_samples(samples: Vec<DistanceTime>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let ordered = samples
            .windows(2)
            .all(|w| w[1].time > w[0].time && w[1].distance >= w[0].distance);
        ordered.then_some(Self { samples })
    }

    fn add_slice(&mut self, slice: DistanceTime) {
        self.samples.push(slice);
    }

    pub fn samples(&self) -> &[DistanceTime] {
        &self.samples
    }

    pub fn start(&self) -> DistanceTime {
        self.samples[0]
    }

    pub fn end(&self) -> DistanceTime {
        self.samples[self.samples.len() - 1]
    }

    /// Interpolated motion after `elapsed` seconds; `None` past the end of the plot
    pub fn motion_after(&self, elapsed: f32) -> Option<DistanceTime> {
        let start = self.start();
        if elapsed <= start.time {
            return Some(start);
        }
        if elapsed > self.end().time {
            return None;
        }

        for pair in self.samples.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            if next.time >= elapsed {
                let tween = (elapsed - current.time) / (next.time - current.time);
                return Some(DistanceTime {
                    distance: current.distance + (next.distance - current.distance) * tween,
                    time: elapsed,
                    speed: current.speed + (next.speed - current.speed) * tween,
                });
            }
        }

        Some(self.end())
    }

    /// Earliest elapsed time at which `distance` is covered, if within the plot
    pub fn time_to_reach(&self, distance: f32) -> Option<f32> {
        let start = self.start();
        if distance <= start.distance {
            return Some(start.time);
        }

        for pair in self.samples.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            if next.distance >= distance {
                let gained = next.distance - current.distance;
                let tween = if gained > 0.0 {
                    (distance - current.distance) / gained
                } else {
                    1.0
                };
                return Some(current.time + (next.time - current.time) * tween);
            }
        }

        None
    }
}

/// Throttle-only acceleration at `speed`
pub fn throttle_acceleration(speed: f32) -> f32 {
    if speed < THROTTLE_TAPER_SPEED {
        let fraction = speed.max(0.0) / THROTTLE_TAPER_SPEED;
        THROTTLE_ACCEL_AT_REST - (THROTTLE_ACCEL_AT_REST - THROTTLE_ACCEL_AT_TAPER) * fraction
    } else if speed < THROTTLE_SPEED_CAP {
        THROTTLE_ACCEL_AT_TAPER
    } else {
        0.0
    }
}

/// Forward-simulate maximal straight-line acceleration on the ground.
///
/// Boosts while `boost_budget` lasts, then throttles. Once boost is gone, front flips
/// are taken whenever the remaining distance to `target_distance` exceeds what a flip
/// covers.
pub fn simulate_acceleration(
    car: &CarState,
    horizon: f32,
    boost_budget: f32,
    target_distance: f32,
) -> DistancePlot {
    simulate_acceleration_with_step(car, horizon, boost_budget, target_distance, PLOT_STEP)
}

pub fn simulate_acceleration_with_step(
    car: &CarState,
    horizon: f32,
    boost_budget: f32,
    target_distance: f32,
    step: f32,
) -> DistancePlot {
    let mut speed = car.velocity.truncate().length().min(SUPERSONIC_SPEED);
    let mut plot = DistancePlot::new(DistanceTime {
        distance: 0.0,
        time: 0.0,
        speed,
    });
    if !(step > 0.0 && horizon > 0.0) {
        return plot;
    }

    let steps = (horizon / step).ceil() as usize;
    let mut boost = boost_budget.max(0.0);
    let mut distance = 0.0;
    let mut flip_until_step = 0;

    for i in 1..=steps {
        if i <= flip_until_step {
            // Mid-flip: speed was granted up front, no acceleration until landing
        } else if boost > 0.0 && speed < SUPERSONIC_SPEED {
            speed += (throttle_acceleration(speed) + BOOST_ACCELERATION) * step;
            boost -= BOOST_CONSUMED_PER_SECOND * step;
        } else if boost <= 0.0 && car.has_wheel_contact && worth_flipping(speed, target_distance - distance) {
            speed += FRONT_FLIP_SPEED_BONUS;
            flip_until_step = i + (FRONT_FLIP_DURATION / step).round() as usize - 1;
        } else {
            speed += throttle_acceleration(speed) * step;
        }
        speed = speed.min(SUPERSONIC_SPEED);
        distance += speed * step;

        plot.add_slice(DistanceTime {
            distance,
            time: i as f32 * step,
            speed,
        });
    }

    plot
}

fn worth_flipping(speed: f32, remaining_distance: f32) -> bool {
    if speed < MIN_FLIP_SPEED || speed >= SUPERSONIC_SPEED - 1.0 {
        return false;
    }
    let flip_speed = (speed + FRONT_FLIP_SPEED_BONUS).min(SUPERSONIC_SPEED);
    remaining_distance > flip_speed * FRONT_FLIP_DURATION
}

/// Airborne variant: boost along the nose, of which `flat_fraction` counts as travel.
pub fn simulate_air_acceleration(car: &CarState, horizon: f32, flat_fraction: f32) -> DistancePlot {
    let mut speed = car.velocity.truncate().length().min(SUPERSONIC_SPEED);
    let mut plot = DistancePlot::new(DistanceTime {
        distance: 0.0,
        time: 0.0,
        speed,
    });
    if horizon <= 0.0 {
        return plot;
    }

    let flat_fraction = flat_fraction.clamp(0.0, 1.0);
    let steps = (horizon / PLOT_STEP).ceil() as usize;
    let mut boost = car.boost;
    let mut distance = 0.0;

    for i in 1..=steps {
        if boost > 0.0 {
            speed = (speed + AIR_BOOST_ACCELERATION * flat_fraction * PLOT_STEP).min(SUPERSONIC_SPEED);
            boost -= BOOST_CONSUMED_PER_SECOND * PLOT_STEP;
        }
        distance += speed * PLOT_STEP;
        plot.add_slice(DistanceTime {
            distance,
            time: i as f32 * PLOT_STEP,
            speed,
        });
    }

    plot
}
