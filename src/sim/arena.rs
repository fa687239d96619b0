//! Static arena geometry: floor, ceiling, walls, corner bevels and goal mouths
//!
//! Every boundary is an infinite plane plus a rule for where it applies:
//! - Back walls are open across the goal mouth
//! - Goal box planes only exist behind the goal line

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::path::BallPath;
use super::state::{SpaceTimeVelocity, Team};
use crate::consts::*;

/// A plane given by a unit normal (pointing into the playable space) and a point on it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vec3,
    pub point: Vec3,
}

impl Plane {
    pub fn new(normal: Vec3, point: Vec3) -> Self {
        Self {
            normal: normal.normalize(),
            point,
        }
    }

    /// Positive on the playable side
    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p - self.point)
    }
}

/// What a boundary surface is, and therefore where it applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceKind {
    Floor,
    Ceiling,
    SideWall,
    Corner,
    /// Back wall behind the given team's goal
    BackWall(Team),
    /// Interior of the given team's goal
    GoalBox(Team),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub kind: SurfaceKind,
    pub plane: Plane,
}

/// Arena extents, loaded once
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaDimensions {
    pub side_wall: f32,
    pub back_wall: f32,
    pub ceiling: f32,
    pub corner_bevel: f32,
    pub goal_half_width: f32,
    pub goal_height: f32,
    pub goal_depth: f32,
}

impl Default for ArenaDimensions {
    fn default() -> Self {
        Self {
            side_wall: SIDE_WALL,
            back_wall: BACK_WALL,
            ceiling: CEILING,
            corner_bevel: CORNER_BEVEL,
            goal_half_width: GOAL_HALF_WIDTH,
            goal_height: GOAL_HEIGHT,
            goal_depth: GOAL_DEPTH,
        }
    }
}

/// Arena geometry plus the ball physics that play out inside it
#[derive(Debug, Clone)]
pub struct Arena {
    pub dims: ArenaDimensions,
    pub ball_radius: f32,
    pub gravity: f32,
    /// Fraction of normal speed kept on a bounce (0..=1)
    pub restitution: f32,
    /// Fraction of tangential speed kept on a bounce (0..=1)
    pub friction: f32,
    surfaces: Vec<Surface>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::standard()
    }
}

impl Arena {
    /// The standard soccer arena
    pub fn standard() -> Self {
        Self::new(ArenaDimensions::default())
    }

    pub fn new(dims: ArenaDimensions) -> Self {
        Self {
            surfaces: build_surfaces(&dims),
            dims,
            ball_radius: BALL_RADIUS,
            gravity: GRAVITY,
            restitution: BALL_RESTITUTION,
            friction: SURFACE_FRICTION,
        }
    }

    pub fn with_ball_radius(mut self, radius: f32) -> Self {
        self.ball_radius = radius;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Restitution and friction are clamped to [0, 1] so bounces never add energy
    pub fn with_bounce(mut self, restitution: f32, friction: f32) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self.friction = friction.clamp(0.0, 1.0);
        self
    }

    /// Surfaces in resolution order
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Whether `surface` exists at the ball centre `pos`
    pub fn surface_applies(&self, surface: &Surface, pos: Vec3) -> bool {
        match surface.kind {
            SurfaceKind::BackWall(team) => {
                let goal_side = pos.y * team.own_goal_sign() > 0.0;
                !(goal_side && self.in_goal_mouth_column(pos))
            }
            SurfaceKind::GoalBox(team) => pos.y * team.own_goal_sign() > self.dims.back_wall,
            _ => true,
        }
    }

    fn in_goal_mouth_column(&self, pos: Vec3) -> bool {
        pos.x.abs() < self.dims.goal_half_width && pos.z < self.dims.goal_height
    }

    pub fn own_goal(&self, team: Team) -> Goal {
        Goal::new(team, &self.dims)
    }

    pub fn enemy_goal(&self, team: Team) -> Goal {
        Goal::new(team.opponent(), &self.dims)
    }
}

fn corner_anchor(dims: &ArenaDimensions) -> Vec2 {
    Vec2::new(dims.side_wall, dims.back_wall) - Vec2::splat(dims.corner_bevel)
}

fn build_surfaces(dims: &ArenaDimensions) -> Vec<Surface> {
    let plane = |kind, normal: Vec3, point: Vec3| Surface {
        kind,
        plane: Plane::new(normal, point),
    };
    let anchor = corner_anchor(dims);
    let mut surfaces = vec![
        plane(SurfaceKind::Floor, Vec3::Z, Vec3::ZERO),
        plane(SurfaceKind::Ceiling, -Vec3::Z, Vec3::new(0.0, 0.0, dims.ceiling)),
        plane(SurfaceKind::SideWall, Vec3::X, Vec3::new(-dims.side_wall, 0.0, 0.0)),
        plane(SurfaceKind::SideWall, -Vec3::X, Vec3::new(dims.side_wall, 0.0, 0.0)),
    ];

    for (sx, sy) in [(1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)] {
        surfaces.push(plane(
            SurfaceKind::Corner,
            Vec3::new(sx, sy, 0.0),
            Vec3::new(-sx * anchor.x, -sy * anchor.y, 0.0),
        ));
    }

    for team in [Team::Blue, Team::Orange] {
        let s = team.own_goal_sign();
        surfaces.push(plane(
            SurfaceKind::BackWall(team),
            Vec3::new(0.0, -s, 0.0),
            Vec3::new(0.0, s * dims.back_wall, 0.0),
        ));
    }

    for team in [Team::Blue, Team::Orange] {
        let s = team.own_goal_sign();
        let kind = SurfaceKind::GoalBox(team);
        let goal_y = s * dims.back_wall;
        surfaces.push(plane(kind, Vec3::X, Vec3::new(-dims.goal_half_width, goal_y, 0.0)));
        surfaces.push(plane(kind, -Vec3::X, Vec3::new(dims.goal_half_width, goal_y, 0.0)));
        surfaces.push(plane(kind, -Vec3::Z, Vec3::new(0.0, goal_y, dims.goal_height)));
        surfaces.push(plane(
            kind,
            Vec3::new(0.0, -s, 0.0),
            Vec3::new(0.0, s * (dims.back_wall + dims.goal_depth), 0.0),
        ));
    }

    surfaces
}

/// Goal geometry for one team
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub team: Team,
    /// Centre of the goal mouth on the goal line
    pub center: Vec3,
    pub half_width: f32,
    pub height: f32,
}

impl Goal {
    pub fn new(team: Team, dims: &ArenaDimensions) -> Self {
        Self {
            team,
            center: Vec3::new(
                0.0,
                team.own_goal_sign() * dims.back_wall,
                dims.goal_height / 2.0,
            ),
            half_width: dims.goal_half_width,
            height: dims.goal_height,
        }
    }

    /// Whether a ball centred at `position` is fully over the goal line inside the mouth
    pub fn is_scored(&self, position: Vec3, ball_radius: f32) -> bool {
        let depth = position.y * self.team.own_goal_sign() - self.center.y.abs();
        depth > ball_radius && position.x.abs() < self.half_width && position.z < self.height
    }

    /// First predicted sample at which the ball is in this goal
    pub fn predict_goal_event(
        &self,
        path: &BallPath,
        ball_radius: f32,
    ) -> Option<SpaceTimeVelocity> {
        path.samples()
            .iter()
            .find(|slice| self.is_scored(slice.space, ball_radius))
            .copied()
    }

    /// Closest point inside the goal mouth to `point`, kept `inset` from the frame
    pub fn nearest_entrance(&self, point: Vec3, inset: f32) -> Vec3 {
        let max_x = (self.half_width - inset).max(0.0);
        let max_z = (self.height - inset).max(inset);
        Vec3::new(
            point.x.clamp(-max_x, max_x),
            self.center.y,
            point.z.clamp(inset.min(max_z), max_z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_surfaces() {
        let arena = Arena::standard();
        // floor, ceiling, 2 sides, 4 corners, 2 back walls, 2x4 goal box
        assert_eq!(arena.surfaces().len(), 18);
        assert_eq!(arena.surfaces()[0].kind, SurfaceKind::Floor);
    }

    #[test]
    fn test_planes_face_the_field() {
        let arena = Arena::standard();
        let center = Vec3::new(0.0, 0.0, 10.0);
        for surface in arena.surfaces() {
            if !matches!(surface.kind, SurfaceKind::GoalBox(_)) {
                assert!(
                    surface.plane.signed_distance(center) > 0.0,
                    "{:?} faces away from the field",
                    surface.kind
                );
            }
        }
    }

    #[test]
    fn test_back_wall_open_at_goal_mouth() {
        let arena = Arena::standard();
        let blue_back = arena
            .surfaces()
            .iter()
            .find(|s| s.kind == SurfaceKind::BackWall(Team::Blue))
            .unwrap();
        let in_mouth = Vec3::new(0.0, -102.0, 3.0);
        let beside_mouth = Vec3::new(40.0, -102.0, 3.0);
        assert!(!arena.surface_applies(blue_back, in_mouth));
        assert!(arena.surface_applies(blue_back, beside_mouth));
    }

    #[test]
    fn test_goal_box_only_behind_line() {
        let arena = Arena::standard();
        let orange_box = arena
            .surfaces()
            .iter()
            .find(|s| s.kind == SurfaceKind::GoalBox(Team::Orange))
            .unwrap();
        assert!(!arena.surface_applies(orange_box, Vec3::new(0.0, 100.0, 3.0)));
        assert!(arena.surface_applies(orange_box, Vec3::new(0.0, 105.0, 3.0)));
    }

    #[test]
    fn test_goal_scored_and_entrance() {
        let arena = Arena::standard();
        let goal = arena.own_goal(Team::Blue);
        assert!(goal.center.y < 0.0);
        assert!(goal.is_scored(Vec3::new(0.0, -106.0, 2.0), BALL_RADIUS));
        assert!(!goal.is_scored(Vec3::new(0.0, -103.0, 2.0), BALL_RADIUS));
        assert!(!goal.is_scored(Vec3::new(30.0, -106.0, 2.0), BALL_RADIUS));

        let entrance = goal.nearest_entrance(Vec3::new(50.0, -20.0, 30.0), 4.0);
        assert!((entrance.x - (GOAL_HALF_WIDTH - 4.0)).abs() < 1e-4);
        assert_eq!(entrance.y, goal.center.y);
        assert!(entrance.z <= GOAL_HEIGHT - 4.0 + 1e-4);
        assert_eq!(arena.enemy_goal(Team::Blue).team, Team::Orange);
    }
}
