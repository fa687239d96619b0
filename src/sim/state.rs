//! Snapshot and motion types shared by the simulator, queries and planner
//!
//! Everything decoded from the host arrives as a `WorldSnapshot`; the rest of the
//! crate works on the derived `CarState` and `SpaceTimeVelocity` values.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;

/// A position at a moment in game time (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceTime {
    pub space: Vec3,
    pub time: f32,
}

impl SpaceTime {
    pub fn new(space: Vec3, time: f32) -> Self {
        Self { space, time }
    }
}

/// Immutable snapshot of a body at an instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceTimeVelocity {
    pub space: Vec3,
    pub time: f32,
    pub velocity: Vec3,
}

impl SpaceTimeVelocity {
    pub fn new(space: Vec3, time: f32, velocity: Vec3) -> Self {
        Self {
            space,
            time,
            velocity,
        }
    }

    pub fn to_space_time(&self) -> SpaceTime {
        SpaceTime::new(self.space, self.time)
    }
}

/// Team identifier. Blue defends the negative-y goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    #[serde(alias = "BLUE", alias = "Blue")]
    Blue,
    #[serde(alias = "ORANGE", alias = "Orange")]
    Orange,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Blue => "Blue",
            Team::Orange => "Orange",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blue" | "0" => Some(Team::Blue),
            "orange" | "1" => Some(Team::Orange),
            _ => None,
        }
    }

    /// Sign of the y coordinate of this team's own goal
    pub fn own_goal_sign(&self) -> f32 {
        match self {
            Team::Blue => -1.0,
            Team::Orange => 1.0,
        }
    }

    pub fn opponent(&self) -> Team {
        match self {
            Team::Blue => Team::Orange,
            Team::Orange => Team::Blue,
        }
    }
}

/// Euler rotation as reported by the host (radians)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

/// Unit nose and roof vectors of a car
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarOrientation {
    pub nose: Vec3,
    pub roof: Vec3,
}

impl Default for CarOrientation {
    fn default() -> Self {
        Self {
            nose: Vec3::X,
            roof: Vec3::Z,
        }
    }
}

impl CarOrientation {
    pub fn from_rotator(rotation: Rotator) -> Self {
        let (sp, cp) = rotation.pitch.sin_cos();
        let (sy, cy) = rotation.yaw.sin_cos();
        let (sr, cr) = rotation.roll.sin_cos();

        let nose = Vec3::new(cp * cy, cp * sy, sp);
        let roof = Vec3::new(-cr * sp * cy + sr * sy, -cr * sp * sy - sr * cy, cr * cp);
        Self { nose, roof }
    }

    /// Unit vector perpendicular to nose and roof
    pub fn right(&self) -> Vec3 {
        self.nose.cross(self.roof).normalize_or_zero()
    }
}

/// A car as the planner sees it for one tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: CarOrientation,
    /// Boost amount, 0-100
    pub boost: f32,
    pub has_wheel_contact: bool,
    pub time: f32,
    pub team: Team,
}

/// Ball portion of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallInput {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Car portion of a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarInput {
    pub team: Team,
    pub position: Vec3,
    pub velocity: Vec3,
    #[serde(default)]
    pub rotation: Rotator,
    #[serde(default)]
    pub boost: f32,
    #[serde(default = "default_wheel_contact")]
    pub has_wheel_contact: bool,
}

fn default_wheel_contact() -> bool {
    true
}

/// Decoded world state for one tick. Read-only to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Game time in seconds
    pub time: f32,
    pub ball: BallInput,
    pub cars: Vec<CarInput>,
    /// Index into `cars` of the car this agent drives
    #[serde(default)]
    pub player_index: usize,
}

fn ensure_finite(field: &'static str, v: Vec3) -> Result<(), SnapshotError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(SnapshotError::NonFinite { field })
    }
}

impl WorldSnapshot {
    /// Decode and validate a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: WorldSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Reject snapshots the core cannot reason about
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if !self.time.is_finite() {
            return Err(SnapshotError::NonFinite { field: "time" });
        }
        ensure_finite("ball.position", self.ball.position)?;
        ensure_finite("ball.velocity", self.ball.velocity)?;
        if self.player_index >= self.cars.len() {
            return Err(SnapshotError::MissingCar {
                index: self.player_index,
                count: self.cars.len(),
            });
        }
        for car in &self.cars {
            ensure_finite("car.position", car.position)?;
            ensure_finite("car.velocity", car.velocity)?;
            let r = car.rotation;
            if !(r.pitch.is_finite() && r.yaw.is_finite() && r.roll.is_finite()) {
                return Err(SnapshotError::NonFinite {
                    field: "car.rotation",
                });
            }
        }
        Ok(())
    }

    /// Ball state at the snapshot time
    pub fn ball_state(&self) -> SpaceTimeVelocity {
        SpaceTimeVelocity::new(self.ball.position, self.time, self.ball.velocity)
    }

    /// The car this agent controls
    pub fn my_car(&self) -> Result<CarState, SnapshotError> {
        self.car_state(self.player_index)
    }

    pub fn car_state(&self, index: usize) -> Result<CarState, SnapshotError> {
        let car = self.cars.get(index).ok_or(SnapshotError::MissingCar {
            index,
            count: self.cars.len(),
        })?;
        Ok(CarState {
            position: car.position,
            velocity: car.velocity,
            orientation: CarOrientation::from_rotator(car.rotation),
            boost: car.boost.clamp(0.0, 100.0),
            has_wheel_contact: car.has_wheel_contact,
            time: self.time,
            team: car.team,
        })
    }

    /// Opponent cars, in snapshot order
    pub fn enemy_cars(&self) -> Vec<CarState> {
        let Some(me) = self.cars.get(self.player_index) else {
            return Vec::new();
        };
        (0..self.cars.len())
            .filter(|&i| self.cars[i].team != me.team)
            .filter_map(|i| self.car_state(i).ok())
            .collect()
    }
}
