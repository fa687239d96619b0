//! Bot tuning
//!
//! Loaded once at startup from an optional JSON file; every field has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::intercept::accel::PLOT_STEP;
use crate::sim::{Arena, ArenaDimensions, BounceThresholds};

/// Longest prediction or reachability horizon a tick may simulate (seconds)
pub const MAX_HORIZON: f32 = 10.0;
/// Finest reachability step accepted (seconds)
pub const MIN_REACH_STEP: f32 = 0.001;

/// Ball prediction quality levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PredictionQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl PredictionQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionQuality::Low => "Low",
            PredictionQuality::Medium => "Medium",
            PredictionQuality::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(PredictionQuality::Low),
            "medium" | "med" => Some(PredictionQuality::Medium),
            "high" => Some(PredictionQuality::High),
            _ => None,
        }
    }

    /// Ball simulation step in seconds
    pub fn step(&self) -> f32 {
        match self {
            PredictionQuality::Low => 1.0 / 30.0,
            PredictionQuality::Medium => SIM_DT,
            PredictionQuality::High => 1.0 / 120.0,
        }
    }
}

/// Bot settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ball prediction step preset
    pub quality: PredictionQuality,
    /// Seconds of ball prediction per tick
    pub horizon: f32,

    // === Ball physics ===
    pub restitution: f32,
    pub friction: f32,
    pub ball_radius: f32,
    pub gravity: f32,
    pub dimensions: ArenaDimensions,
    /// Wall bounce classifier for path queries
    pub bounce: BounceThresholds,

    // === Car reachability ===
    pub reach_step: f32,
    pub reach_horizon: f32,

    // === Logging ===
    /// Log `[Sitch]` lines when the situation changes
    pub log_situations: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: PredictionQuality::Medium,
            horizon: PREDICTION_HORIZON,

            restitution: BALL_RESTITUTION,
            friction: SURFACE_FRICTION,
            ball_radius: BALL_RADIUS,
            gravity: GRAVITY,
            dimensions: ArenaDimensions::default(),
            bounce: BounceThresholds::default(),

            reach_step: PLOT_STEP,
            reach_horizon: 4.0,

            log_situations: true,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: PredictionQuality) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    pub fn apply_preset(&mut self, preset: PredictionQuality) {
        self.quality = preset;
        // Coarse steps tunnel through thin bounces; keep the horizon short to compensate
        if preset == PredictionQuality::Low {
            self.horizon = self.horizon.min(3.0);
        }
    }

    /// Ball simulation step for the current preset
    pub fn step(&self) -> f32 {
        self.quality.step()
    }

    /// Arena built from the physical settings
    pub fn arena(&self) -> Arena {
        Arena::new(self.dimensions)
            .with_ball_radius(self.ball_radius)
            .with_gravity(self.gravity)
            .with_bounce(self.restitution, self.friction)
    }

    /// Reject values the simulator cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("horizon", self.horizon),
            ("ball_radius", self.ball_radius),
            ("reach_step", self.reach_step),
            ("reach_horizon", self.reach_horizon),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::Invalid {
                    name,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        for (name, value) in [("horizon", self.horizon), ("reach_horizon", self.reach_horizon)] {
            if value > MAX_HORIZON {
                return Err(SettingsError::Invalid {
                    name,
                    reason: format!("must be at most {MAX_HORIZON} seconds, got {value}"),
                });
            }
        }
        if self.reach_step < MIN_REACH_STEP {
            return Err(SettingsError::Invalid {
                name: "reach_step",
                reason: format!("must be at least {MIN_REACH_STEP} seconds, got {}", self.reach_step),
            });
        }
        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return Err(SettingsError::Invalid {
                name: "gravity",
                reason: format!("must be finite and non-negative, got {}", self.gravity),
            });
        }
        for (name, value) in [
            ("restitution", self.restitution),
            ("friction", self.friction),
            ("bounce.speed_ratio", self.bounce.speed_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::Invalid {
                    name,
                    reason: format!("must be within 0..=1, got {value}"),
                });
            }
        }
        if !(-1.0..=1.0).contains(&self.bounce.min_cosine) {
            return Err(SettingsError::Invalid {
                name: "bounce.min_cosine",
                reason: format!("must be within -1..=1, got {}", self.bounce.min_cosine),
            });
        }
        Ok(())
    }

    /// Read and validate settings from a JSON file
    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_steps() {
        assert_eq!(PredictionQuality::from_str("HIGH"), Some(PredictionQuality::High));
        assert_eq!(PredictionQuality::from_str("med"), Some(PredictionQuality::Medium));
        assert_eq!(PredictionQuality::from_str("ultra"), None);
        assert!(PredictionQuality::High.step() < PredictionQuality::Low.step());
        assert_eq!(Settings::default().step(), SIM_DT);
    }

    #[test]
    fn test_low_preset_shortens_horizon() {
        let settings = Settings::from_preset(PredictionQuality::Low);
        assert_eq!(settings.quality.as_str(), "Low");
        assert_eq!(settings.horizon, 3.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "quality": "High", "bounce": { "speed_ratio": 0.3 } }"#).unwrap();
        assert_eq!(settings.quality, PredictionQuality::High);
        assert_eq!(settings.bounce.speed_ratio, 0.3);
        assert_eq!(settings.bounce.min_cosine, 0.95);
        assert_eq!(settings.horizon, PREDICTION_HORIZON);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let settings = Settings {
            restitution: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { name: "restitution", .. })
        ));
        let settings = Settings {
            horizon: 0.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_cost_and_physics() {
        let settings = Settings {
            horizon: 1e9,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { name: "horizon", .. })
        ));
        let settings = Settings {
            reach_horizon: MAX_HORIZON + 1.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        let settings = Settings {
            reach_step: 1e-7,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        let settings = Settings {
            gravity: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { name: "gravity", .. })
        ));
        let mut settings = Settings::default();
        settings.bounce.min_cosine = 1.5;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { name: "bounce.min_cosine", .. })
        ));
        settings.bounce.min_cosine = 0.9;
        settings.bounce.speed_ratio = -0.1;
        assert!(settings.validate().is_err());
        assert!(Settings { horizon: MAX_HORIZON, ..Default::default() }.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_huge_horizon() {
        let path = std::env::temp_dir().join(format!("relief-bot-huge-horizon-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "horizon": 1e9 }"#).unwrap();
        assert!(matches!(Settings::try_load(&path), Err(SettingsError::Invalid { .. })));
        assert_eq!(Settings::load(&path).horizon, PREDICTION_HORIZON);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let path = std::env::temp_dir().join("relief-bot-no-such-settings.json");
        assert!(matches!(Settings::try_load(&path), Err(SettingsError::Io(_))));
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("relief-bot-settings-{}.json", std::process::id()));
        let settings = Settings::from_preset(PredictionQuality::High);
        settings.save(&path).unwrap();
        assert_eq!(Settings::try_load(&path).unwrap(), settings);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_arena_uses_physics() {
        let settings = Settings {
            gravity: 20.0,
            restitution: 0.5,
            ..Default::default()
        };
        let arena = settings.arena();
        assert_eq!(arena.gravity, 20.0);
        assert_eq!(arena.restitution, 0.5);
        assert_eq!(arena.ball_radius, BALL_RADIUS);
    }
}
