//! Maneuver catalog
//!
//! Every step is polled once per tick: `Some(output)` drives the car this tick,
//! `None` means the step is done and the owning plan moves on.

mod basic;
mod landing;
mod midair;
mod save;
mod strike;

pub use basic::{BlindStep, TapStep};
pub use landing::LandGracefullyStep;
pub use midair::MidairStrikeStep;
pub use save::SaveStep;
pub use strike::{ChaseStep, InterceptStep};

use super::context::TickContext;
use super::plan::Plan;
use crate::output::ControlOutput;

/// One maneuver and its private state
#[derive(Debug, Clone)]
pub enum Step {
    Blind(BlindStep),
    Tap(TapStep),
    Chase(ChaseStep),
    Intercept(InterceptStep),
    MidairStrike(MidairStrikeStep),
    Save(SaveStep),
    LandGracefully(LandGracefullyStep),
}

impl Step {
    pub fn poll(&mut self, ctx: &TickContext) -> Option<ControlOutput> {
        match self {
            Step::Blind(step) => step.poll(ctx),
            Step::Tap(step) => step.poll(ctx),
            Step::Chase(step) => step.poll(ctx),
            Step::Intercept(step) => step.poll(ctx),
            Step::MidairStrike(step) => step.poll(ctx),
            Step::Save(step) => step.poll(ctx),
            Step::LandGracefully(step) => step.poll(ctx),
        }
    }

    pub fn can_interrupt(&self) -> bool {
        match self {
            Step::MidairStrike(_) => false,
            Step::Save(step) => step.can_interrupt(),
            _ => true,
        }
    }

    pub fn situation(&self) -> String {
        match self {
            Step::Blind(_) => "Muscle memory".to_string(),
            Step::Tap(_) => "Tapping".to_string(),
            Step::Chase(_) => "Chasing ball".to_string(),
            Step::Intercept(_) => "Going for intercept".to_string(),
            Step::MidairStrike(step) => step.situation(),
            Step::Save(step) => step.situation(),
            Step::LandGracefully(_) => "Landing gracefully".to_string(),
        }
    }

    /// Nested plan this step is currently delegating to
    pub fn sub_plan(&self) -> Option<&Plan> {
        match self {
            Step::MidairStrike(step) => step.sub_plan(),
            Step::Save(step) => step.sub_plan(),
            _ => None,
        }
    }
}

macro_rules! impl_from_step {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Step {
                fn from(step: $ty) -> Self {
                    Step::$variant(step)
                }
            }
        )*
    };
}

impl_from_step!(
    Blind(BlindStep),
    Tap(TapStep),
    Chase(ChaseStep),
    Intercept(InterceptStep),
    MidairStrike(MidairStrikeStep),
    Save(SaveStep),
    LandGracefully(LandGracefullyStep),
);
