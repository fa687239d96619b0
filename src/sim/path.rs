//! Predicted ball path and the queries planners run against it
//!
//! A path is built fresh every tick by the simulator and never mutated afterwards.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::SpaceTimeVelocity;

/// Thresholds for classifying a step-to-step velocity change as a wall bounce.
///
/// Empirically tuned for the standard arena; other geometries may need other values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceThresholds {
    /// Bounce if horizontal speed drops below this fraction of the previous speed
    pub speed_ratio: f32,
    /// Bounce if the cosine between horizontal directions falls below this
    pub min_cosine: f32,
}

impl Default for BounceThresholds {
    fn default() -> Self {
        Self {
            speed_ratio: 0.5,
            min_cosine: 0.95,
        }
    }
}

impl BounceThresholds {
    pub fn is_wall_bounce(&self, previous: Vec3, current: Vec3) -> bool {
        if current.length_squared() < 0.01 {
            return false;
        }
        let prev = previous.truncate();
        let curr = current.truncate();
        let prev_speed = prev.length();
        if prev_speed < 1e-6 {
            return false;
        }
        if curr.length() / prev_speed < self.speed_ratio {
            return true;
        }
        prev.normalize_or_zero().dot(curr.normalize_or_zero()) < self.min_cosine
    }
}

fn is_floor_bounce(previous: Vec3, current: Vec3) -> bool {
    previous.z < 0.0 && current.z > 0.0
}

/// Ordered, time-stamped ball samples starting at the observed state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallPath {
    samples: Vec<SpaceTimeVelocity>,
    /// Ball radius the path was simulated with (landing snap height)
    ball_radius: f32,
}

impl BallPath {
    pub fn new(start: SpaceTimeVelocity, ball_radius: f32) -> Self {
        Self {
            samples: vec![start],
            ball_radius,
        }
    }

    /// Build a path from existing samples.
    ///
    /// Returns `None` if `samples` is empty or times are not strictly increasing.
    pub fn from_samples(samples: Vec<SpaceTimeVelocity>, ball_radius: f32) -> Option<Self> {
        if samples.is_empty() || samples.windows(2).any(|w| w[1].time <= w[0].time) {
            return None;
        }
        Some(Self {
            samples,
            ball_radius,
        })
    }

    /// Append during simulation only
    pub(crate) fn add_slice(&mut self, slice: SpaceTimeVelocity) {
        debug_assert!(slice.time > self.end().time);
        self.samples.push(slice);
    }

    pub fn samples(&self) -> &[SpaceTimeVelocity] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: a path holds at least its start sample
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn ball_radius(&self) -> f32 {
        self.ball_radius
    }

    pub fn start(&self) -> SpaceTimeVelocity {
        self.samples[0]
    }

    pub fn end(&self) -> SpaceTimeVelocity {
        self.samples[self.samples.len() - 1]
    }

    /// Time between the first two samples; 0 for a single-sample path
    pub fn step_duration(&self) -> f32 {
        match self.samples.as_slice() {
            [first, second, ..] => second.time - first.time,
            _ => 0.0,
        }
    }

    /// Interpolated motion at `time`, or `None` outside the path's time span
    pub fn motion_at(&self, time: f32) -> Option<SpaceTimeVelocity> {
        if time < self.start().time || time > self.end().time {
            return None;
        }

        for pair in self.samples.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            if next.time > time {
                let span = next.time - current.time;
                let tween = (time - current.time) / span;
                let space = current.space + (next.space - current.space) * tween;
                let velocity = current.velocity * (1.0 - tween) + next.velocity * tween;
                return Some(SpaceTimeVelocity::new(space, time, velocity));
            }
        }

        Some(self.end())
    }

    /// Sample right after the `target_bounce`-th wall bounce (counting from 1).
    ///
    /// `None` for 0, when there are fewer bounces, or when the bounce is the final sample.
    pub fn motion_after_wall_bounce(
        &self,
        target_bounce: usize,
        thresholds: &BounceThresholds,
    ) -> Option<SpaceTimeVelocity> {
        if target_bounce == 0 {
            return None;
        }

        let mut bounces = 0;
        for i in 1..self.samples.len() {
            let previous = &self.samples[i - 1];
            let current = &self.samples[i];
            if !thresholds.is_wall_bounce(previous.velocity, current.velocity) {
                continue;
            }
            bounces += 1;
            if bounces == target_bounce {
                if i == self.samples.len() - 1 {
                    return None;
                }
                return Some(*current);
            }
        }

        None
    }

    /// First floor landing at or after `start_of_search`, snapped to resting height.
    ///
    /// Picks whichever bracketing sample sits closer to one radius above the floor and
    /// carries the post-bounce velocity. `None` when the bounce is the final sample.
    pub fn first_landing_after(&self, start_of_search: f32) -> Option<SpaceTimeVelocity> {
        let radius = self.ball_radius;
        for i in 1..self.samples.len() {
            let current = &self.samples[i];
            if current.time < start_of_search {
                continue;
            }
            let previous = &self.samples[i - 1];
            if !is_floor_bounce(previous.velocity, current.velocity) {
                continue;
            }
            if i == self.samples.len() - 1 {
                return None;
            }

            let previous_gap = (previous.space.z - radius).abs();
            let current_gap = (current.space.z - radius).abs();
            let nearest = if previous_gap < current_gap {
                previous
            } else {
                current
            };
            return Some(SpaceTimeVelocity::new(
                Vec3::new(nearest.space.x, nearest.space.y, radius),
                nearest.time,
                current.velocity,
            ));
        }

        None
    }
}
