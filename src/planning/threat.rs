//! Scoring how dangerous the current moment is for our goal.
//!
//! Positive means trouble. The scale is only meaningful relative to the thresholds
//! the agent compares it with.

use glam::Vec3;

use crate::sim::{CarState, Goal, SpaceTimeVelocity};

/// Length of `v` along `onto`, negative when pointing the other way
fn signed_projection(v: Vec3, onto: Vec3) -> f32 {
    v.dot(onto.normalize_or_zero())
}

/// Ball speed toward our goal, plus how far we are on the wrong side of the ball,
/// minus a share of the ball's distance from the goal.
pub fn measure_ball_threat(car: &CarState, ball: &SpaceTimeVelocity, goal: &Goal) -> f32 {
    let ball_to_goal = goal.center - ball.space;
    let speed_toward_goal = signed_projection(ball.velocity, ball_to_goal);
    let wrong_sidedness = signed_projection(ball.space - car.position, ball_to_goal);
    speed_toward_goal + wrong_sidedness - ball_to_goal.length() * 0.3
}

/// How squarely an enemy is lined up behind the ball toward our goal, up to 10
pub fn measure_enemy_posture(ball: &SpaceTimeVelocity, goal: &Goal, enemy: Option<&CarState>) -> f32 {
    let Some(enemy) = enemy else {
        return 0.0;
    };
    let ball_to_goal = goal.center - ball.space;
    let enemy_to_ball = (ball.space - enemy.position).normalize_or_zero() * 10.0;
    signed_projection(enemy_to_ball, ball_to_goal)
}

/// Combined threat score
pub fn measure_threat(
    car: &CarState,
    ball: &SpaceTimeVelocity,
    goal: &Goal,
    enemy: Option<&CarState>,
) -> f32 {
    let enemy_threat = measure_enemy_posture(ball, goal, enemy).max(0.0);
    let mut ball_threat = measure_ball_threat(car, ball, goal) * 0.3;
    if ball_threat < 0.0 {
        ball_threat *= 0.3;
    }
    enemy_threat + ball_threat
}
