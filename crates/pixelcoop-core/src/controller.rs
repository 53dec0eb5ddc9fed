use serde::Serialize;

use crate::config::{GameTuning, StartConfig};
use crate::events::{self, GameCallbacks, GameEvent, NoCallbacks};
use crate::game_trait::{ModeRules, TickOutcome};
use crate::input::InputState;
use crate::player::Player;
use crate::render::{self, Color, DrawSurface};
use crate::sound::{NullSound, SoundSink};

const BACKGROUND: Color = Color::rgb(0x1a, 0x1a, 0x2e);

#[derive(Serialize)]
struct Snapshot<'a, S> {
    level: u8,
    players: &'a [Player],
    outcome: Option<GameEvent>,
    world: S,
}

/// Fixed-timestep driver shared by every game mode.
///
/// The host calls `frame(now_ms)` from its animation callback and forwards
/// key events. A step runs only when at least one frame period has passed
/// since the previous step; leftover time is dropped rather than carried.
pub struct GameController<R: ModeRules> {
    rules: R,
    players: Vec<Player>,
    input: InputState,
    callbacks: Box<dyn GameCallbacks>,
    sound: Box<dyn SoundSink>,
    frame_ms: f64,
    running: bool,
    last_frame_ms: Option<f64>,
    /// Timestamp of the most recent step, fed to input classification.
    clock_ms: f64,
    outcome: Option<GameEvent>,
    ticks: u64,
}

impl<R: ModeRules> GameController<R> {
    pub fn new(rules: R, config: &StartConfig, tuning: &GameTuning) -> Self {
        let count = config.player_count.clamp(1, rules.metadata().max_players.max(1));
        let mut input = InputState::new(count);
        let players = (0..count)
            .map(|i| {
                input.set_control_scheme(i, config.scheme_for(i));
                let (x, y) = rules.spawn_point(i, count);
                Player::with_physics(x, y, config.color_for(i), tuning.physics)
            })
            .collect();
        Self {
            rules,
            players,
            input,
            callbacks: Box::new(NoCallbacks),
            sound: Box::new(NullSound),
            frame_ms: tuning.frame_ms(),
            running: false,
            last_frame_ms: None,
            clock_ms: 0.0,
            outcome: None,
            ticks: 0,
        }
    }

    pub fn with_callbacks(mut self, callbacks: impl GameCallbacks + 'static) -> Self {
        self.callbacks = Box::new(callbacks);
        self
    }

    pub fn with_sound(mut self, sound: impl SoundSink + 'static) -> Self {
        self.sound = Box::new(sound);
        self
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut R {
        &mut self.rules
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Terminal event that halted the simulation, if any.
    pub fn outcome(&self) -> Option<GameEvent> {
        self.outcome
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Begin accepting input and frames. The first frame only sets the time reference.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_frame_ms = None;
        tracing::debug!(level = self.rules.level_number(), "Game loop started");
    }

    /// Stop the loop and drop held input. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.input.clear();
        tracing::debug!(ticks = self.ticks, "Game loop stopped");
    }

    pub fn key_down(&mut self, code: &str, now_ms: f64) {
        if self.running {
            self.input.key_down(code, now_ms);
        }
    }

    pub fn key_up(&mut self, code: &str, now_ms: f64) {
        if self.running {
            self.input.key_up(code, now_ms);
        }
    }

    /// Animation-frame entry point. Returns whether a simulation step ran.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        let Some(last) = self.last_frame_ms else {
            self.last_frame_ms = Some(now_ms);
            return false;
        };
        let elapsed = now_ms - last;
        if elapsed < self.frame_ms {
            tracing::trace!(elapsed, "Frame below step period, skipped");
            return false;
        }
        self.last_frame_ms = Some(now_ms);
        self.step((elapsed / 1000.0) as f32, now_ms)
    }

    /// Run one step of `dt` seconds regardless of wall time.
    pub fn tick(&mut self, dt: f32) -> bool {
        let now = self.clock_ms + f64::from(dt) * 1000.0;
        self.step(dt, now)
    }

    fn step(&mut self, dt: f32, now_ms: f64) -> bool {
        self.clock_ms = now_ms;
        if self.outcome.is_some() {
            return false;
        }
        self.ticks += 1;

        let inputs = self.input.snapshot(now_ms);
        let mut out = TickOutcome::default();
        for (i, player) in self.players.iter_mut().enumerate() {
            let input = inputs.get(i).cloned().unwrap_or_default();
            self.rules.control_player(i, player, &input, dt, &mut out);
            player.update(dt);
            self.rules.resolve_player(i, player, dt, &mut out);
        }
        self.rules.update_world(dt, &mut self.players, &mut out);
        if !out.is_over()
            && let Some(event) = self.rules.check_win(&self.players)
        {
            out.end(event);
        }

        for cue in out.cues {
            self.sound.play(cue);
        }
        if let Some(event) = out.event {
            tracing::info!(?event, level = self.rules.level_number(), tick = self.ticks, "Terminal outcome");
            self.outcome = Some(event);
            events::dispatch(event, self.callbacks.as_mut());
        }
        true
    }

    fn respawn_players(&mut self) {
        let count = self.players.len();
        for (i, player) in self.players.iter_mut().enumerate() {
            let (x, y) = self.rules.spawn_point(i, count);
            player.reset(x, y);
        }
        self.outcome = None;
        self.last_frame_ms = None;
    }

    pub fn restart_level(&mut self) {
        tracing::debug!(level = self.rules.level_number(), "Restarting level");
        self.rules.restart_level();
        self.respawn_players();
    }

    /// Move to the next level. Returns false when already on the last one.
    pub fn next_level(&mut self) -> bool {
        if !self.rules.next_level() {
            return false;
        }
        tracing::debug!(level = self.rules.level_number(), "Advanced to next level");
        self.respawn_players();
        true
    }

    pub fn reset_to_first_level(&mut self) {
        self.rules.reset_to_first_level();
        self.respawn_players();
        tracing::debug!("Reset to first level");
    }

    pub fn render(&self, surface: &mut dyn DrawSurface) {
        surface.clear(BACKGROUND);
        self.rules.render_world(surface);
        for player in &self.players {
            render::draw_player(surface, player);
        }
        self.rules.render_hud(&self.players, surface);
    }

    /// MessagePack snapshot of players and world for observers.
    pub fn serialize_state(&self) -> Vec<u8> {
        let snapshot = Snapshot {
            level: self.rules.level_number(),
            players: &self.players,
            outcome: self.outcome,
            world: self.rules.snapshot(),
        };
        match rmp_serde::to_vec_named(&snapshot) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "State snapshot failed");
                Vec::new()
            },
        }
    }
}
