use thiserror::Error;

/// A snapshot that could not be turned into a decision tick
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("No car at player index {index} (snapshot has {count})")]
    MissingCar { index: usize, count: usize },

    #[error("Non-finite value in {field}")]
    NonFinite { field: &'static str },
}

/// Failure inside a debug/telemetry sink. Never affects control output.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Telemetry sink unavailable")]
    Unavailable,

    #[error("Telemetry buffer full ({capacity} lines)")]
    BufferFull { capacity: usize },
}

/// Failure loading a settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl SnapshotError {
    /// Whether the next tick may succeed with fresh input
    pub fn is_transient(&self) -> bool {
        match self {
            SnapshotError::Json(_) => true,
            SnapshotError::NonFinite { .. } => true,
            SnapshotError::MissingCar { .. } => true,
            SnapshotError::UnknownTeam(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(SnapshotError::from(json).is_transient());
        assert!(SnapshotError::NonFinite { field: "time" }.is_transient());
        assert!(!SnapshotError::UnknownTeam("green".into()).is_transient());
        assert_eq!(
            SnapshotError::MissingCar { index: 2, count: 1 }.to_string(),
            "No car at player index 2 (snapshot has 1)"
        );
    }
}
