use serde::{Deserialize, Serialize};

use crate::events::GameEvent;
use crate::input::PlayerInput;
use crate::player::Player;
use crate::render::DrawSurface;
use crate::sound::SoundCue;

/// Static description of a game mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeMetadata {
    pub name: String,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub max_players: usize,
}

/// Side effects collected while the rules run one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub cues: Vec<SoundCue>,
    /// First terminal event raised this tick.
    pub event: Option<GameEvent>,
}

impl TickOutcome {
    pub fn cue(&mut self, cue: SoundCue) {
        self.cues.push(cue);
    }

    /// Record a terminal event. Later events in the same tick are dropped.
    pub fn end(&mut self, event: GameEvent) {
        if self.event.is_none() {
            self.event = Some(event);
        }
    }

    pub fn is_over(&self) -> bool {
        self.event.is_some()
    }
}

/// Mode strategy plugged into the fixed-step driver.
///
/// The driver calls, per tick and per player, `control_player`, then
/// `Player::update`, then `resolve_player`. After all players it calls
/// `update_world` once and, if nothing ended the tick, `check_win`.
pub trait ModeRules {
    /// Observer view of the world, serialized with the players.
    type Snapshot: Serialize;

    fn metadata(&self) -> ModeMetadata;

    /// Spawn position for player `index` out of `count`.
    fn spawn_point(&self, index: usize, count: usize) -> (f32, f32);

    /// Player-update policy: turn input into velocity changes.
    fn control_player(
        &mut self,
        index: usize,
        player: &mut Player,
        input: &PlayerInput,
        dt: f32,
        out: &mut TickOutcome,
    );

    /// Collision policy, run after the player's physics step.
    fn resolve_player(&mut self, index: usize, player: &mut Player, dt: f32, out: &mut TickOutcome);

    /// Advance hazards, scrolling and anything shared between players.
    fn update_world(&mut self, dt: f32, players: &mut [Player], out: &mut TickOutcome);

    /// Win-condition policy.
    fn check_win(&self, players: &[Player]) -> Option<GameEvent>;

    /// Rebuild the current level's entities.
    fn restart_level(&mut self);

    /// Advance to the next level. Returns false at the end of the sequence.
    fn next_level(&mut self) -> bool {
        false
    }

    fn reset_to_first_level(&mut self);

    /// One-based level or course number.
    fn level_number(&self) -> u8 {
        1
    }

    fn render_world(&self, surface: &mut dyn DrawSurface);

    /// Overlay drawn after the players.
    fn render_hud(&self, _players: &[Player], _surface: &mut dyn DrawSurface) {}

    fn snapshot(&self) -> Self::Snapshot;
}
