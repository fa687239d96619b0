//! Read-only view of one decision tick, shared by every step in the plan tree

use crate::error::SnapshotError;
use crate::intercept::DistancePlot;
use crate::intercept::accel::simulate_acceleration_with_step;
use crate::settings::Settings;
use crate::sim::{Arena, BallPath, CarState, SpaceTimeVelocity, Team, WorldSnapshot};

/// Everything a step may look at while producing output for one tick
#[derive(Debug, Clone)]
pub struct TickContext<'a> {
    /// Game time of the snapshot
    pub time: f32,
    pub team: Team,
    pub car: CarState,
    pub ball: SpaceTimeVelocity,
    pub enemies: Vec<CarState>,
    /// Fresh prediction for this tick
    pub path: &'a BallPath,
    pub arena: &'a Arena,
    pub settings: &'a Settings,
}

impl<'a> TickContext<'a> {
    pub fn new(
        snapshot: &WorldSnapshot,
        path: &'a BallPath,
        arena: &'a Arena,
        settings: &'a Settings,
    ) -> Result<Self, SnapshotError> {
        let car = snapshot.my_car()?;
        Ok(Self {
            time: snapshot.time,
            team: car.team,
            car,
            ball: snapshot.ball_state(),
            enemies: snapshot.enemy_cars(),
            path,
            arena,
            settings,
        })
    }

    pub fn from_parts(
        car: CarState,
        ball: SpaceTimeVelocity,
        path: &'a BallPath,
        arena: &'a Arena,
        settings: &'a Settings,
    ) -> Self {
        Self {
            time: ball.time,
            team: car.team,
            car,
            ball,
            enemies: Vec::new(),
            path,
            arena,
            settings,
        }
    }

    /// Reachability plot for our car under the configured step and horizon
    pub fn reach_plot(&self, boost_budget: f32, target_distance: f32) -> DistancePlot {
        simulate_acceleration_with_step(
            &self.car,
            self.settings.reach_horizon,
            boost_budget,
            target_distance,
            self.settings.reach_step,
        )
    }

    /// Enemy car closest to the ball, if any
    pub fn nearest_enemy(&self) -> Option<&CarState> {
        self.enemies.iter().min_by(|a, b| {
            let da = a.position.distance_squared(self.ball.space);
            let db = b.position.distance_squared(self.ball.space);
            da.total_cmp(&db)
        })
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use glam::Vec3;

    use super::*;
    use crate::sim::{CarOrientation, simulate_ball};

    /// Owns everything a `TickContext` borrows
    pub struct Fixture {
        pub car: CarState,
        pub ball: SpaceTimeVelocity,
        pub path: BallPath,
        pub arena: Arena,
        pub settings: Settings,
    }

    impl Fixture {
        pub fn new(car_position: Vec3, ball_position: Vec3, ball_velocity: Vec3) -> Self {
            let settings = Settings::default();
            let arena = settings.arena();
            let ball = SpaceTimeVelocity::new(ball_position, 0.0, ball_velocity);
            let path = simulate_ball(&arena, ball, settings.horizon, settings.step());
            let car = CarState {
                position: car_position,
                velocity: Vec3::ZERO,
                orientation: CarOrientation {
                    nose: Vec3::Y,
                    roof: Vec3::Z,
                },
                boost: 50.0,
                has_wheel_contact: true,
                time: 0.0,
                team: Team::Blue,
            };
            Self {
                car,
                ball,
                path,
                arena,
                settings,
            }
        }

        /// Same world, `seconds` later, ball and car frozen in place
        pub fn advanced(&self, seconds: f32) -> Self {
            let ball = SpaceTimeVelocity::new(self.ball.space, self.ball.time + seconds, self.ball.velocity);
            let path = simulate_ball(&self.arena, ball, self.settings.horizon, self.settings.step());
            let mut car = self.car.clone();
            car.time += seconds;
            Self {
                car,
                ball,
                path,
                arena: self.arena.clone(),
                settings: self.settings.clone(),
            }
        }

        pub fn ctx(&self) -> TickContext<'_> {
            TickContext::from_parts(self.car.clone(), self.ball, &self.path, &self.arena, &self.settings)
        }
    }
}
