use crate::output::ControlOutput;
use crate::planning::context::TickContext;

/// Holds a fixed output for a fixed time, measured from the first poll
#[derive(Debug, Clone)]
pub struct BlindStep {
    output: ControlOutput,
    duration: f32,
    started_at: Option<f32>,
}

impl BlindStep {
    pub fn new(output: ControlOutput, duration: f32) -> Self {
        Self {
            output,
            duration,
            started_at: None,
        }
    }

    pub(super) fn poll(&mut self, ctx: &TickContext) -> Option<ControlOutput> {
        let started_at = *self.started_at.get_or_insert(ctx.time);
        (ctx.time - started_at < self.duration).then_some(self.output)
    }
}

/// Holds a fixed output for a fixed number of polls
#[derive(Debug, Clone)]
pub struct TapStep {
    output: ControlOutput,
    num_frames: u32,
    frames_elapsed: u32,
}

impl TapStep {
    pub fn new(num_frames: u32, output: ControlOutput) -> Self {
        Self {
            output,
            num_frames,
            frames_elapsed: 0,
        }
    }

    pub(super) fn poll(&mut self, _ctx: &TickContext) -> Option<ControlOutput> {
        if self.frames_elapsed >= self.num_frames {
            return None;
        }
        self.frames_elapsed += 1;
        Some(self.output)
    }
}
