//! Plans: ordered steps run one after another under a posture

use serde::{Deserialize, Serialize};

use super::context::TickContext;
use super::steps::Step;
use crate::output::ControlOutput;

/// How urgent a plan is. Later variants are more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Posture {
    #[default]
    Neutral,
    Offensive,
    Save,
    Defensive,
}

impl Posture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Posture::Neutral => "Neutral",
            Posture::Offensive => "Offensive",
            Posture::Save => "Save",
            Posture::Defensive => "Defensive",
        }
    }

    pub fn less_urgent_than(&self, other: Posture) -> bool {
        *self < other
    }
}

/// Lifecycle of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanPhase {
    #[default]
    NotStarted,
    Running,
    Complete,
}

/// A posture-tagged sequence of steps
#[derive(Debug, Clone, Default)]
pub struct Plan {
    posture: Posture,
    steps: Vec<Step>,
    current_index: usize,
    phase: PlanPhase,
}

impl Plan {
    pub fn new(posture: Posture) -> Self {
        Self {
            posture,
            ..Default::default()
        }
    }

    pub fn with_step(mut self, step: impl Into<Step>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn posture(&self) -> Posture {
        self.posture
    }

    pub fn phase(&self) -> PlanPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == PlanPhase::Complete
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_step(&self) -> Option<&Step> {
        if self.is_complete() {
            return None;
        }
        self.steps.get(self.current_index)
    }

    pub fn begin(&mut self) {
        if self.phase == PlanPhase::NotStarted {
            self.phase = PlanPhase::Running;
        }
    }

    /// Poll the current step once.
    ///
    /// A step that reports no output advances the plan by one step and this poll yields
    /// `None`; past the last step the plan is complete.
    pub fn get_output(&mut self, ctx: &TickContext) -> Option<ControlOutput> {
        if self.is_complete() {
            return None;
        }
        self.begin();

        let Some(step) = self.steps.get_mut(self.current_index) else {
            self.phase = PlanPhase::Complete;
            return None;
        };
        if let Some(output) = step.poll(ctx) {
            return Some(output);
        }

        log::debug!("Step done: {}", step.situation());
        self.current_index += 1;
        if self.current_index >= self.steps.len() {
            self.phase = PlanPhase::Complete;
        }
        None
    }

    /// Keep polling until a step produces output or the plan completes
    pub fn next_output(&mut self, ctx: &TickContext) -> Option<ControlOutput> {
        while !self.is_complete() {
            if let Some(output) = self.get_output(ctx) {
                return Some(output);
            }
        }
        None
    }

    /// A complete plan never blocks interruption
    pub fn can_interrupt(&self) -> bool {
        self.current_step().is_none_or(Step::can_interrupt)
    }

    pub fn situation(&self) -> String {
        self.current_step().map(Step::situation).unwrap_or_default()
    }

    /// Indices of the active step at each level of the plan tree, outermost first
    pub fn active_path(&self) -> Vec<usize> {
        let Some(step) = self.current_step() else {
            return Vec::new();
        };
        let mut path = vec![self.current_index];
        if let Some(sub_plan) = step.sub_plan() {
            path.extend(sub_plan.active_path());
        }
        path
    }

    /// `prefix` followed by the situation of `plan` while it is still running
    pub fn concat_situation(prefix: &str, plan: Option<&Plan>) -> String {
        match plan.filter(|p| !p.is_complete()) {
            Some(plan) => format!("{prefix} ({})", plan.situation()),
            None => prefix.to_string(),
        }
    }
}
