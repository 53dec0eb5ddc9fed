pub mod layouts;
pub mod level;
pub mod level_manager;
pub mod rules;

use pixelcoop_core::config::{GameTuning, StartConfig};
use pixelcoop_core::controller::GameController;

pub use rules::{PlatformerRules, PlatformerSnapshot};

/// Build a platformer session from host start parameters.
pub fn new_game(config: &StartConfig, tuning: &GameTuning) -> GameController<PlatformerRules> {
    let config = config.clone().sanitized();
    GameController::new(PlatformerRules::starting_at(config.start_level), &config, tuning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelcoop_core::game_trait::ModeRules;

    #[test]
    fn new_game_honours_start_level_and_player_count() {
        let config = StartConfig::from_json(r#"{"playerCount": 3, "startLevel": 3}"#)
            .expect("valid json");
        let game = new_game(&config, &GameTuning::default());
        assert_eq!(game.rules().level_number(), 3);
        assert_eq!(game.players().len(), 3);
        assert!(!game.is_running());
    }

    #[test]
    fn invalid_start_level_falls_back_to_one() {
        let config = StartConfig {
            start_level: 9,
            ..Default::default()
        };
        let game = new_game(&config, &GameTuning::default());
        assert_eq!(game.rules().level_number(), 1);
    }
}
