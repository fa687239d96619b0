//! Deterministic ball prediction
//!
//! Pure and deterministic:
//! - Fixed timestep only
//! - No randomness
//! - Stable surface resolution order
//! - Paths are rebuilt every tick, never cached

pub mod arena;
pub mod collision;
pub mod path;
pub mod predict;
pub mod state;

pub use arena::{Arena, ArenaDimensions, Goal, Plane, Surface, SurfaceKind};
pub use collision::{CollisionResult, ball_surface_collision, bounce_velocity, resolve_contacts};
pub use path::{BallPath, BounceThresholds};
pub use predict::simulate_ball;
pub use state::{
    BallInput, CarInput, CarOrientation, CarState, Rotator, SpaceTime, SpaceTimeVelocity, Team,
    WorldSnapshot,
};
