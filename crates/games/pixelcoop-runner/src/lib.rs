pub mod course;
pub mod obstacle;
pub mod rules;
pub mod spawner;

use pixelcoop_core::config::{GameTuning, StartConfig};
use pixelcoop_core::controller::GameController;

pub use course::{CourseKind, RunnerCourse};
pub use rules::{RunnerRules, RunnerSnapshot};

/// Ground line every course runs on.
pub const GROUND_Y: f32 = 370.0;
/// Runners stay in this column while the world scrolls.
pub const RUNNER_X: f32 = 300.0;

/// Build a runner session on the host's chosen course. Obstacles come from
/// `tuning.runner_seed`, so equal seeds replay equal runs.
pub fn new_game(config: &StartConfig, tuning: &GameTuning) -> GameController<RunnerRules> {
    let config = config.clone().sanitized();
    let kind = CourseKind::from_number(config.runner_level).unwrap_or(CourseKind::Forest);
    GameController::new(RunnerRules::new(kind, tuning.runner_seed), &config, tuning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelcoop_core::game_trait::ModeRules;

    #[test]
    fn new_game_picks_the_requested_course() {
        let config = StartConfig::from_json(r#"{"runnerLevel": 3, "playerCount": 2}"#)
            .expect("valid json");
        let game = new_game(&config, &GameTuning::default());
        assert_eq!(game.rules().course().kind(), CourseKind::Bombs);
        assert_eq!(game.rules().level_number(), 3);
        assert!(game.players().iter().all(|p| p.x == RUNNER_X));
    }

    #[test]
    fn seed_comes_from_tuning() {
        let tuning = GameTuning::from_toml_str("runner_seed = 1234").expect("valid toml");
        let game = new_game(&StartConfig::default(), &tuning);
        assert_eq!(game.rules().course().seed(), 1234);
        assert_eq!(game.rules().course().kind(), CourseKind::Forest);
    }

    #[test]
    fn unknown_course_falls_back_to_forest() {
        let config = StartConfig {
            runner_level: 8,
            ..Default::default()
        };
        let game = new_game(&config, &GameTuning::default());
        assert_eq!(game.rules().course().kind(), CourseKind::Forest);
    }
}
