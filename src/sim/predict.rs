//! Fixed timestep ball prediction
//!
//! Advances the ball deterministically under gravity, resolving arena contacts
//! after every step, and records one sample per step.

use super::arena::Arena;
use super::collision::resolve_contacts;
use super::path::BallPath;
use super::state::SpaceTimeVelocity;

/// Simulate the ball from `start` for `horizon` seconds at a fixed `step`.
///
/// The path always contains at least the start sample; a horizon shorter than one
/// step (or a non-positive step) yields only that sample.
pub fn simulate_ball(arena: &Arena, start: SpaceTimeVelocity, horizon: f32, step: f32) -> BallPath {
    let mut path = BallPath::new(start, arena.ball_radius);
    if !(step > 0.0 && horizon >= step) {
        return path;
    }

    // Small epsilon so 2.0 / (1/60) counts 120 steps, not 119
    let steps = (horizon / step + 1e-4).floor() as usize;
    let mut position = start.space;
    let mut velocity = start.velocity;

    for i in 1..=steps {
        velocity.z -= arena.gravity * step;
        position += velocity * step;

        let resolved = resolve_contacts(arena, position, velocity);
        position = resolved.position;
        velocity = resolved.velocity;

        // Times come from the step index so they never drift
        let time = start.time + i as f32 * step;
        path.add_slice(SpaceTimeVelocity::new(position, time, velocity));
    }

    log::trace!(
        "Simulated {} ball samples over {:.2}s",
        path.len(),
        path.end().time - start.time
    );
    path
}
