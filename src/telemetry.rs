//! Debug telemetry sinks
//!
//! Telemetry is best effort: a failing sink never changes what the car does.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::TelemetryError;
use crate::intercept::Intercept;
use crate::sim::{BallPath, Team};

/// Receives per-tick debug information from a bot
pub trait TelemetrySink {
    /// Situation string changed
    fn situation(&mut self, team: Team, situation: &str) -> Result<(), TelemetryError>;

    /// Fresh ball prediction for this tick
    fn path(&mut self, team: Team, path: &BallPath) -> Result<(), TelemetryError>;

    /// Intercept chosen this tick
    fn intercept(&mut self, team: Team, intercept: &Intercept) -> Result<(), TelemetryError>;
}

/// Writes through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTelemetry;

impl TelemetrySink for LogTelemetry {
    fn situation(&mut self, team: Team, situation: &str) -> Result<(), TelemetryError> {
        log::info!("[{}] [Sitch] {}", team.as_str(), situation);
        Ok(())
    }

    fn path(&mut self, team: Team, path: &BallPath) -> Result<(), TelemetryError> {
        let end = path.end();
        log::trace!(
            "[{}] Ball path: {} samples every {:.4}s, ends at ({:.1}, {:.1}, {:.1}) t={:.2}",
            team.as_str(),
            path.len(),
            path.step_duration(),
            end.space.x,
            end.space.y,
            end.space.z,
            end.time
        );
        Ok(())
    }

    fn intercept(&mut self, team: Team, intercept: &Intercept) -> Result<(), TelemetryError> {
        log::trace!(
            "[{}] Intercept at ({:.1}, {:.1}, {:.1}) t={:.2}",
            team.as_str(),
            intercept.space.x,
            intercept.space.y,
            intercept.space.z,
            intercept.time
        );
        Ok(())
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTelemetry;

impl TelemetrySink for NullTelemetry {
    fn situation(&mut self, _team: Team, _situation: &str) -> Result<(), TelemetryError> {
        Ok(())
    }

    fn path(&mut self, _team: Team, _path: &BallPath) -> Result<(), TelemetryError> {
        Ok(())
    }

    fn intercept(&mut self, _team: Team, _intercept: &Intercept) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Default per-team line capacity
pub const DEFAULT_BUFFER_CAPACITY: usize = 512;

/// Collects lines per team until drained.
///
/// Clones share one buffer, so a handle kept outside the bot can read what the bot wrote.
#[derive(Debug, Clone)]
pub struct BufferedTelemetry {
    lines: Arc<Mutex<HashMap<Team, Vec<String>>>>,
    capacity: usize,
}

impl Default for BufferedTelemetry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }
}

impl BufferedTelemetry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(HashMap::new())),
            capacity,
        }
    }

    fn push(&self, team: Team, line: String) -> Result<(), TelemetryError> {
        let mut lines = self.lines.lock().map_err(|_| TelemetryError::Unavailable)?;
        let team_lines = lines.entry(team).or_default();
        if team_lines.len() >= self.capacity {
            return Err(TelemetryError::BufferFull {
                capacity: self.capacity,
            });
        }
        team_lines.push(line);
        Ok(())
    }

    /// Take every line buffered for `team`
    pub fn collect(&self, team: Team) -> Vec<String> {
        match self.lines.lock() {
            Ok(mut lines) => lines.remove(&team).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }
}

impl TelemetrySink for BufferedTelemetry {
    fn situation(&mut self, team: Team, situation: &str) -> Result<(), TelemetryError> {
        self.push(team, format!("[Sitch] {situation}"))
    }

    fn path(&mut self, team: Team, path: &BallPath) -> Result<(), TelemetryError> {
        let end = path.end();
        self.push(team, format!("[Path] {} samples until t={:.2}", path.len(), end.time))
    }

    fn intercept(&mut self, team: Team, intercept: &Intercept) -> Result<(), TelemetryError> {
        self.push(
            team,
            format!(
                "[Intercept] ({:.1}, {:.1}, {:.1}) t={:.2}",
                intercept.space.x, intercept.space.y, intercept.space.z, intercept.time
            ),
        )
    }
}
