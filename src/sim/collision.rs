//! Collision detection and response against arena planes
//!
//! Each surface is tested for penetration of the ball's surface (centre distance
//! below one radius). On contact the ball is pushed back out to exactly one radius
//! and, if it was moving into the surface, its velocity is bounced.

use glam::Vec3;

use super::arena::{Arena, Surface};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the surface (if hit)
    pub point: Vec3,
    /// Surface normal at contact, pointing toward the ball centre
    pub normal: Vec3,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a ball against a single arena surface
pub fn ball_surface_collision(ball_pos: Vec3, ball_radius: f32, surface: &Surface) -> CollisionResult {
    let distance = surface.plane.signed_distance(ball_pos);
    if distance >= ball_radius {
        return CollisionResult::miss();
    }
    let normal = surface.plane.normal;
    CollisionResult {
        hit: true,
        point: ball_pos - normal * distance,
        normal,
        penetration: ball_radius - distance,
    }
}

/// Bounce velocity off a surface with restitution and tangential friction.
///
/// The normal component is reversed and scaled by `restitution`; the tangential
/// component is scaled by `friction`. Velocities already leaving the surface are
/// returned unchanged.
pub fn bounce_velocity(velocity: Vec3, normal: Vec3, restitution: f32, friction: f32) -> Vec3 {
    let normal_speed = velocity.dot(normal);
    if normal_speed >= 0.0 {
        return velocity;
    }
    let normal_part = normal * normal_speed;
    let tangent_part = velocity - normal_part;
    tangent_part * friction - normal_part * restitution
}

/// Outcome of resolving all contacts for one simulation step
#[derive(Debug, Clone, Copy)]
pub struct ContactResolution {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Number of surfaces that bounced the ball this step
    pub bounces: u32,
}

/// Resolve every applicable surface in order, one after another.
///
/// Corners resolve naturally: each wall sees the position left by the previous one.
pub fn resolve_contacts(arena: &Arena, position: Vec3, velocity: Vec3) -> ContactResolution {
    let mut position = position;
    let mut velocity = velocity;
    let mut bounces = 0;

    for surface in arena.surfaces() {
        if !arena.surface_applies(surface, position) {
            continue;
        }
        let result = ball_surface_collision(position, arena.ball_radius, surface);
        if !result.hit {
            continue;
        }
        position += result.normal * result.penetration;
        if velocity.dot(result.normal) < 0.0 {
            velocity = bounce_velocity(velocity, result.normal, arena.restitution, arena.friction);
            bounces += 1;
        }
    }

    ContactResolution {
        position,
        velocity,
        bounces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena::SurfaceKind;

    fn floor(arena: &Arena) -> &Surface {
        arena
            .surfaces()
            .iter()
            .find(|s| s.kind == SurfaceKind::Floor)
            .unwrap()
    }

    #[test]
    fn test_floor_collision() {
        let arena = Arena::standard();
        let radius = arena.ball_radius;

        let result = ball_surface_collision(Vec3::new(0.0, 0.0, 10.0), radius, floor(&arena));
        assert!(!result.hit);

        let result = ball_surface_collision(Vec3::new(5.0, 5.0, 1.0), radius, floor(&arena));
        assert!(result.hit);
        assert_eq!(result.normal, Vec3::Z);
        assert!((result.penetration - (radius - 1.0)).abs() < 1e-6);
        assert_eq!(result.point, Vec3::new(5.0, 5.0, 0.0));
    }

    #[test]
    fn test_bounce_velocity_restitution() {
        let bounced = bounce_velocity(Vec3::new(3.0, 0.0, -10.0), Vec3::Z, 0.6, 1.0);
        assert!((bounced.z - 6.0).abs() < 1e-5);
        assert!((bounced.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_bounce_ignores_separating_velocity() {
        let velocity = Vec3::new(1.0, 2.0, 5.0);
        assert_eq!(bounce_velocity(velocity, Vec3::Z, 0.6, 0.5), velocity);
    }

    #[test]
    fn test_resolve_puts_ball_on_surface() {
        let arena = Arena::standard();
        let resolved = resolve_contacts(&arena, Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.0, 0.0, -4.0));
        assert!((resolved.position.z - arena.ball_radius).abs() < 1e-6);
        assert!(resolved.velocity.z > 0.0);
        assert_eq!(resolved.bounces, 1);
    }

    #[test]
    fn test_resolve_corner_hits_both_walls() {
        let arena = Arena::standard();
        let near_corner = Vec3::new(81.0, 0.0, 1.0);
        let velocity = Vec3::new(10.0, 0.0, -10.0);
        let resolved = resolve_contacts(&arena, near_corner, velocity);
        assert_eq!(resolved.bounces, 2);
        assert!(resolved.velocity.x < 0.0);
        assert!(resolved.velocity.z > 0.0);
        assert!(resolved.velocity.length() <= velocity.length());
    }
}
