//! Game settings and physics configuration
//!
//! Persisted in LocalStorage on the web. The physics block is read once when
//! a game starts and is not changed while balls are in play.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunables consumed by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Per-step velocity multiplier (< 1)
    pub friction: f32,
    /// Energy kept after a cushion bounce (< 1)
    pub wall_bounciness: f32,
    /// Ball-to-ball restitution (< 1)
    pub ball_bounciness: f32,
    /// Maximum shot speed
    pub max_power: f32,
    /// Speed under which a ball is considered at rest
    #[serde(default = "default_rest_speed")]
    pub rest_speed: f32,
    /// Drag length per unit of power
    #[serde(default = "default_drag_sensitivity")]
    pub drag_sensitivity: f32,
    /// Raw power a drag must exceed to fire
    #[serde(default = "default_min_shot_power")]
    pub min_shot_power: f32,
}

fn default_rest_speed() -> f32 {
    REST_SPEED
}

fn default_drag_sensitivity() -> f32 {
    DRAG_SENSITIVITY
}

fn default_min_shot_power() -> f32 {
    MIN_SHOT_POWER
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            friction: FRICTION,
            wall_bounciness: WALL_BOUNCINESS,
            ball_bounciness: BALL_BOUNCINESS,
            max_power: MAX_POWER,
            rest_speed: REST_SPEED,
            drag_sensitivity: DRAG_SENSITIVITY,
            min_shot_power: MIN_SHOT_POWER,
        }
    }
}

impl PhysicsConfig {
    /// Replace out-of-range values with defaults so a corrupt save can't
    /// produce a table where balls never stop
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.friction > 0.0 && self.friction < 1.0) {
            self.friction = defaults.friction;
        }
        if !(self.wall_bounciness >= 0.0 && self.wall_bounciness <= 1.0) {
            self.wall_bounciness = defaults.wall_bounciness;
        }
        if !(self.ball_bounciness >= 0.0 && self.ball_bounciness < 1.0) {
            self.ball_bounciness = defaults.ball_bounciness;
        }
        if !(self.max_power > 0.0) {
            self.max_power = defaults.max_power;
        }
        if !(self.rest_speed > 0.0) {
            self.rest_speed = defaults.rest_speed;
        }
        if !(self.drag_sensitivity > 0.0) {
            self.drag_sensitivity = defaults.drag_sensitivity;
        }
        if !(self.min_shot_power >= 0.0) {
            self.min_shot_power = defaults.min_shot_power;
        }
        self
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub physics: PhysicsConfig,
    /// Draw the dashed aim guide while dragging
    pub guide_line: bool,
    /// Ask the text-generation service for opponent banter
    pub commentary: bool,
    /// Opponent think time in simulation ticks
    pub opponent_delay_ticks: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            guide_line: true,
            commentary: true,
            opponent_delay_ticks: OPPONENT_DELAY_TICKS,
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "eight_ball_settings";

    /// Parse settings JSON, falling back to defaults for anything unreadable
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Settings>(json) {
            Ok(mut settings) => {
                settings.physics = settings.physics.sanitized();
                Some(settings)
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                None
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_json_roundtrip_keeps_physics() {
        let mut settings = Settings::default();
        settings.physics.max_power = 12.0;
        settings.commentary = false;
        let json = serde_json::to_string(&settings).unwrap();
        let loaded = Settings::from_json(&json).unwrap();
        assert_eq!(loaded.physics.max_power, 12.0);
        assert!(!loaded.commentary);
    }

    #[test]
    fn test_missing_optional_physics_fields_default() {
        let json = r#"{
            "physics": {"friction": 0.98, "wall_bounciness": 0.7, "ball_bounciness": 0.9, "max_power": 14.0},
            "guide_line": true,
            "commentary": true,
            "opponent_delay_ticks": 30
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.physics.rest_speed, REST_SPEED);
        assert_eq!(settings.physics.drag_sensitivity, DRAG_SENSITIVITY);
        assert_eq!(settings.opponent_delay_ticks, 30);
    }

    #[test]
    fn test_sanitize_rejects_runaway_friction() {
        let physics = PhysicsConfig {
            friction: 1.5,
            ..PhysicsConfig::default()
        }
        .sanitized();
        assert_eq!(physics.friction, FRICTION);
    }

    #[test]
    fn test_sanitize_rejects_perfectly_elastic_balls() {
        let physics = PhysicsConfig {
            ball_bounciness: 1.0,
            ..PhysicsConfig::default()
        }
        .sanitized();
        assert_eq!(physics.ball_bounciness, BALL_BOUNCINESS);

        let physics = PhysicsConfig {
            ball_bounciness: 0.95,
            ..PhysicsConfig::default()
        }
        .sanitized();
        assert_eq!(physics.ball_bounciness, 0.95);
    }

    #[test]
    fn test_garbage_json_is_none() {
        assert!(Settings::from_json("not json").is_none());
    }
}
