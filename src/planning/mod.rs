//! Behavior selection: plans of steps, gated by posture
//!
//! Plans own their steps and steps own any sub-plan, so the active behavior forms a
//! tree that is only ever walked downward from the agent's current plan.

pub mod context;
pub mod plan;
pub mod steer;
pub mod steps;
pub mod threat;

pub use context::TickContext;
pub use plan::{Plan, PlanPhase, Posture};
pub use steer::{correction_angle_to, steer_toward};
pub use steps::{
    BlindStep, ChaseStep, InterceptStep, LandGracefullyStep, MidairStrikeStep, SaveStep, Step,
    TapStep,
};
pub use threat::measure_threat;
