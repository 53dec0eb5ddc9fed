use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::input::CONTROL_SCHEMES;
use crate::player::{PhysicsConfig, PlayerColor};

pub const MAX_PLAYERS: usize = 4;
/// Platformer levels are numbered 1 through this.
pub const LEVEL_COUNT: u8 = 4;
/// Runner courses are numbered 1 through this.
pub const RUNNER_COURSE_COUNT: u8 = 5;

/// Engine tuning, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    pub physics: PhysicsConfig,
    /// Simulation steps per second.
    pub frame_rate_hz: f32,
    /// Seed for runner obstacle generation.
    pub runner_seed: u64,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            frame_rate_hz: 60.0,
            runner_seed: 42,
        }
    }
}

impl GameTuning {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("PIXELCOOP_CONFIG")
            .unwrap_or_else(|_| "config/pixelcoop.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    GameTuning::default()
                },
            },
            Err(_) => GameTuning::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let mut cfg = toml::from_str::<GameTuning>(content)?;
        if !(cfg.frame_rate_hz.is_finite() && cfg.frame_rate_hz > 0.0) {
            tracing::warn!(
                frame_rate_hz = cfg.frame_rate_hz,
                "Invalid frame rate, using 60"
            );
            cfg.frame_rate_hz = 60.0;
        }
        Ok(cfg)
    }

    /// Milliseconds one simulation step must span.
    pub fn frame_ms(&self) -> f64 {
        1000.0 / f64::from(self.frame_rate_hz)
    }
}

/// Session start parameters as sent by the host UI.
///
/// Colour and control maps are keyed `player1`, `player2`, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StartConfig {
    pub player_count: usize,
    pub colors: HashMap<String, String>,
    pub start_level: u8,
    pub runner_level: u8,
    pub controls: HashMap<String, usize>,
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            player_count: 1,
            colors: HashMap::new(),
            start_level: 1,
            runner_level: 1,
            controls: HashMap::new(),
        }
    }
}

impl StartConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Clamp every field into range. Invalid entries are dropped with a warning.
    pub fn sanitized(mut self) -> Self {
        let count = self.player_count.clamp(1, MAX_PLAYERS);
        if count != self.player_count {
            tracing::warn!(requested = self.player_count, count, "Player count out of range");
            self.player_count = count;
        }
        if !(1..=LEVEL_COUNT).contains(&self.start_level) {
            tracing::warn!(level = self.start_level, "Unknown start level, using 1");
            self.start_level = 1;
        }
        if !(1..=RUNNER_COURSE_COUNT).contains(&self.runner_level) {
            tracing::warn!(course = self.runner_level, "Unknown runner course, using 1");
            self.runner_level = 1;
        }
        self.controls.retain(|slot, scheme| {
            let ok = *scheme < CONTROL_SCHEMES.len();
            if !ok {
                tracing::warn!(%slot, scheme = *scheme, "Unknown control scheme ignored");
            }
            ok
        });
        self.colors.retain(|slot, color| {
            let ok = PlayerColor::from_hex(color).is_some();
            if !ok {
                tracing::warn!(%slot, %color, "Unparseable colour ignored");
            }
            ok
        });
        self
    }

    fn slot_key(player: usize) -> String {
        format!("player{}", player + 1)
    }

    /// Colour for a zero-based player slot, defaulting to the palette.
    pub fn color_for(&self, player: usize) -> PlayerColor {
        self.colors
            .get(&Self::slot_key(player))
            .and_then(|c| PlayerColor::from_hex(c))
            .unwrap_or_else(|| PlayerColor::for_slot(player))
    }

    /// Control scheme for a zero-based player slot, defaulting to the slot index.
    pub fn scheme_for(&self, player: usize) -> usize {
        self.controls
            .get(&Self::slot_key(player))
            .copied()
            .filter(|s| *s < CONTROL_SCHEMES.len())
            .unwrap_or(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuning_defaults() {
        let cfg = GameTuning::default();
        assert_eq!(cfg.frame_rate_hz, 60.0);
        assert!((cfg.frame_ms() - 16.666_666).abs() < 1e-3);
        assert_eq!(cfg.physics.gravity, 1200.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = GameTuning::from_toml_str(
            r#"
            runner_seed = 7

            [physics]
            gravity = 900.0
            "#,
        )
        .expect("valid toml");
        assert_eq!(cfg.runner_seed, 7);
        assert_eq!(cfg.physics.gravity, 900.0);
        assert_eq!(cfg.physics.jump_power, 320.0, "Unset fields keep defaults");
        assert_eq!(cfg.frame_rate_hz, 60.0);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let cfg = GameTuning::from_toml_str(include_str!("../../../config/pixelcoop.toml"))
            .expect("shipped config parses");
        assert_eq!(cfg, GameTuning::default(), "Shipped file should mirror the built-in defaults");
    }

    #[test]
    fn bad_frame_rate_falls_back() {
        let cfg = GameTuning::from_toml_str("frame_rate_hz = 0.0").expect("valid toml");
        assert_eq!(cfg.frame_rate_hz, 60.0);
        assert!(GameTuning::from_toml_str("frame_rate_hz = \"fast\"").is_err());
    }

    #[test]
    fn start_config_from_host_json() {
        let cfg = StartConfig::from_json(
            r##"{
                "playerCount": 2,
                "colors": {"player1": "#E74C3C", "player2": "not-a-colour"},
                "startLevel": 3,
                "runnerLevel": 4,
                "controls": {"player2": 3}
            }"##,
        )
        .expect("valid json")
        .sanitized();
        assert_eq!(cfg.player_count, 2);
        assert_eq!(cfg.start_level, 3);
        assert_eq!(cfg.runner_level, 4);
        assert_eq!(
            cfg.color_for(0),
            PlayerColor {
                r: 0xe7,
                g: 0x4c,
                b: 0x3c
            }
        );
        assert_eq!(
            cfg.color_for(1),
            PlayerColor::for_slot(1),
            "Bad colour falls back to the palette"
        );
        assert_eq!(cfg.scheme_for(0), 0);
        assert_eq!(cfg.scheme_for(1), 3);
    }

    #[test]
    fn sanitize_clamps_out_of_range() {
        let cfg = StartConfig {
            player_count: 9,
            start_level: 7,
            runner_level: 0,
            controls: HashMap::from([("player1".to_string(), 12)]),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(cfg.player_count, MAX_PLAYERS);
        assert_eq!(cfg.start_level, 1);
        assert_eq!(cfg.runner_level, 1);
        assert!(cfg.controls.is_empty());
        assert_eq!(cfg.scheme_for(0), 0);

        let zero = StartConfig {
            player_count: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(zero.player_count, 1);
    }

    #[test]
    fn empty_json_is_default() {
        let cfg = StartConfig::from_json("{}").expect("valid json");
        assert_eq!(cfg, StartConfig::default());
    }
}
