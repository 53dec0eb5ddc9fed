pub mod boss;
pub mod config;
pub mod controller;
pub mod enemy;
pub mod events;
pub mod game_trait;
pub mod geometry;
pub mod input;
pub mod moving_platform;
pub mod patrol;
pub mod player;
pub mod powerup;
pub mod projectile;
pub mod render;
pub mod sound;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::config::{GameTuning, StartConfig};
    use crate::controller::GameController;
    use crate::events::{GameCallbacks, GameEvent};
    use crate::game_trait::{ModeMetadata, ModeRules, TickOutcome};
    use crate::geometry::Rect;
    use crate::input::PlayerInput;
    use crate::player::{PLAYER_HEIGHT, Player};
    use crate::render::{Color, DrawSurface};
    use crate::sound::{SoundCue, SoundSink};

    /// Shared counters behind a [`RecordingCallbacks`].
    #[derive(Debug, Clone, Default)]
    pub struct CallbackLog {
        deaths: Rc<Cell<u32>>,
        levels: Rc<Cell<u32>>,
        victories: Rc<Cell<u32>>,
    }

    impl CallbackLog {
        pub fn deaths(&self) -> u32 {
            self.deaths.get()
        }

        pub fn levels(&self) -> u32 {
            self.levels.get()
        }

        pub fn victories(&self) -> u32 {
            self.victories.get()
        }
    }

    /// Callbacks that count how often each fires.
    pub struct RecordingCallbacks(CallbackLog);

    impl RecordingCallbacks {
        pub fn new() -> (Self, CallbackLog) {
            let log = CallbackLog::default();
            (Self(log.clone()), log)
        }
    }

    impl GameCallbacks for RecordingCallbacks {
        fn on_player_death(&mut self) {
            self.0.deaths.set(self.0.deaths.get() + 1);
        }

        fn on_level_complete(&mut self) {
            self.0.levels.set(self.0.levels.get() + 1);
        }

        fn on_victory(&mut self) {
            self.0.victories.set(self.0.victories.get() + 1);
        }
    }

    /// Handle for reading cues captured by a [`RecordingSound`].
    #[derive(Debug, Clone, Default)]
    pub struct SoundLog(Rc<RefCell<Vec<SoundCue>>>);

    impl SoundLog {
        /// Return and clear every cue captured so far.
        pub fn take(&self) -> Vec<SoundCue> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    pub struct RecordingSound(SoundLog);

    impl RecordingSound {
        pub fn new() -> (Self, SoundLog) {
            let log = SoundLog::default();
            (Self(log.clone()), log)
        }
    }

    impl SoundSink for RecordingSound {
        fn play(&mut self, cue: SoundCue) {
            self.0.0.borrow_mut().push(cue);
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        Clear(Color),
        Rect(Rect, Color),
        Circle { cx: f32, cy: f32, radius: f32 },
        Text(String),
        Gradient(Rect),
    }

    /// Surface that records every draw call in order.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub calls: Vec<DrawCall>,
    }

    impl RecordingSurface {
        pub fn texts(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    DrawCall::Text(t) => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn rects_with(&self, color: Color) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, DrawCall::Rect(_, col) if *col == color))
                .count()
        }

        pub fn circles(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, DrawCall::Circle { .. }))
                .count()
        }
    }

    impl DrawSurface for RecordingSurface {
        fn clear(&mut self, color: Color) {
            self.calls.push(DrawCall::Clear(color));
        }

        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.calls.push(DrawCall::Rect(rect, color));
        }

        fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, _color: Color) {
            self.calls.push(DrawCall::Circle { cx, cy, radius });
        }

        fn fill_text(&mut self, text: &str, _x: f32, _y: f32, _size: f32, _color: Color) {
            self.calls.push(DrawCall::Text(text.to_string()));
        }

        fn fill_vertical_gradient(&mut self, rect: Rect, _top: Color, _bottom: Color) {
            self.calls.push(DrawCall::Gradient(rect));
        }
    }

    /// Minimal two-level mode: a flat floor and an optional scripted win.
    #[derive(Debug, Clone)]
    pub struct FlatFloorRules {
        pub floor_y: f32,
        pub level: u8,
        pub ticks: u32,
        pub win_after_ticks: Option<u32>,
    }

    impl Default for FlatFloorRules {
        fn default() -> Self {
            Self {
                floor_y: 400.0,
                level: 1,
                ticks: 0,
                win_after_ticks: None,
            }
        }
    }

    impl ModeRules for FlatFloorRules {
        type Snapshot = u32;

        fn metadata(&self) -> ModeMetadata {
            ModeMetadata {
                name: "Flat floor".to_string(),
                canvas_width: 800.0,
                canvas_height: 450.0,
                max_players: 4,
            }
        }

        fn spawn_point(&self, index: usize, _count: usize) -> (f32, f32) {
            (100.0 + index as f32 * 40.0, self.floor_y - PLAYER_HEIGHT)
        }

        fn control_player(
            &mut self,
            _index: usize,
            player: &mut Player,
            input: &PlayerInput,
            dt: f32,
            out: &mut TickOutcome,
        ) {
            if input.left {
                player.move_left(dt);
            } else if input.right {
                player.move_right(dt);
            } else {
                player.stop_moving(dt);
            }
            if input.jump && player.jump() {
                out.cue(SoundCue::Jump);
            }
        }

        fn resolve_player(
            &mut self,
            _index: usize,
            player: &mut Player,
            _dt: f32,
            _out: &mut TickOutcome,
        ) {
            if player.y + player.height >= self.floor_y {
                player.land_on(self.floor_y);
            }
        }

        fn update_world(&mut self, _dt: f32, _players: &mut [Player], _out: &mut TickOutcome) {
            self.ticks += 1;
        }

        fn check_win(&self, _players: &[Player]) -> Option<GameEvent> {
            self.win_after_ticks
                .filter(|n| self.ticks >= *n)
                .map(|_| GameEvent::Victory)
        }

        fn restart_level(&mut self) {
            self.ticks = 0;
        }

        fn next_level(&mut self) -> bool {
            if self.level >= 2 {
                return false;
            }
            self.level += 1;
            self.ticks = 0;
            true
        }

        fn reset_to_first_level(&mut self) {
            self.level = 1;
            self.ticks = 0;
        }

        fn level_number(&self) -> u8 {
            self.level
        }

        fn render_world(&self, surface: &mut dyn DrawSurface) {
            surface.fill_rect(Rect::new(0.0, self.floor_y, 800.0, 50.0), Color::BLACK);
        }

        fn snapshot(&self) -> u32 {
            self.ticks
        }
    }

    /// Build a started controller with `n` players and default tuning.
    pub fn started_controller<R: ModeRules>(rules: R, n: usize) -> GameController<R> {
        let config = StartConfig {
            player_count: n,
            ..Default::default()
        };
        let mut controller = GameController::new(rules, &config, &GameTuning::default());
        controller.start();
        controller
    }

    /// Run `n` fixed steps, returning the tick on which the game halted, if any.
    pub fn run_ticks<R: ModeRules>(
        controller: &mut GameController<R>,
        n: usize,
        dt: f32,
    ) -> Option<usize> {
        for i in 0..n {
            if !controller.tick(dt) {
                return Some(i);
            }
        }
        controller.outcome().map(|_| n)
    }

    // ================================================================
    // Mode Rules Contract Tests
    // ================================================================
    // Every ModeRules implementation should pass these. Mode crates call
    // them from their own #[cfg(test)] modules with a fresh rules value.

    /// Every spawn point must place the whole player body on the canvas.
    pub fn contract_spawn_points_inside_canvas<R: ModeRules>(rules: &R) {
        let meta = rules.metadata();
        for count in 1..=meta.max_players {
            for i in 0..count {
                let (x, y) = rules.spawn_point(i, count);
                assert!(
                    x >= 0.0 && x + 24.0 <= meta.canvas_width,
                    "{}: spawn x {x} for player {i}/{count} is off-canvas",
                    meta.name
                );
                assert!(
                    y >= 0.0 && y + PLAYER_HEIGHT <= meta.canvas_height,
                    "{}: spawn y {y} for player {i}/{count} is off-canvas",
                    meta.name
                );
            }
        }
    }

    /// Idle ticks must keep every player coordinate finite.
    pub fn contract_idle_ticks_stay_finite<R: ModeRules>(rules: R) {
        let mut controller = started_controller(rules, 2);
        run_ticks(&mut controller, 120, 1.0 / 60.0);
        for p in controller.players() {
            assert!(
                p.x.is_finite() && p.y.is_finite() && p.vx.is_finite() && p.vy.is_finite(),
                "Player state must stay finite, got {p:?}"
            );
        }
    }

    /// restart_level() must put every player back on its spawn point.
    pub fn contract_restart_respawns<R: ModeRules>(rules: R) {
        let mut controller = started_controller(rules, 2);
        run_ticks(&mut controller, 30, 1.0 / 60.0);
        controller.players_mut()[0].x += 50.0;
        controller.restart_level();
        assert_eq!(controller.outcome(), None, "restart must clear the outcome");
        let count = controller.players().len();
        for (i, p) in controller.players().iter().enumerate() {
            let (x, y) = controller.rules().spawn_point(i, count);
            assert_eq!((p.x, p.y), (x, y), "Player {i} not respawned");
        }
    }

    /// serialize_state() must produce bytes that change as the world advances.
    pub fn contract_snapshot_changes<R: ModeRules>(rules: R) {
        let mut controller = started_controller(rules, 1);
        let before = controller.serialize_state();
        assert!(!before.is_empty(), "serialize_state() must not be empty");
        controller.tick(0.1);
        assert_ne!(
            before,
            controller.serialize_state(),
            "State should have changed after a tick"
        );
    }
}
