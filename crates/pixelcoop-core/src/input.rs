use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Two jump presses closer than this count toward a double jump.
pub const DOUBLE_PRESS_WINDOW_MS: f64 = 300.0;
/// The press counter resets this long after the last press.
pub const PRESS_COUNT_RESET_MS: f64 = 400.0;
/// Releases shorter than this classify as a short jump.
pub const SHORT_JUMP_MS: f64 = 120.0;
/// A held jump key reports a provisional class after this long.
pub const PROVISIONAL_JUMP_MS: f64 = 50.0;

/// Key codes for one player's controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlScheme {
    pub left: &'static str,
    pub right: &'static str,
    pub jump: &'static str,
    pub crouch: &'static str,
}

/// Fixed scheme table, one entry per player slot.
pub const CONTROL_SCHEMES: [ControlScheme; 4] = [
    ControlScheme {
        left: "KeyA",
        right: "KeyD",
        jump: "KeyW",
        crouch: "KeyS",
    },
    ControlScheme {
        left: "ArrowLeft",
        right: "ArrowRight",
        jump: "ArrowUp",
        crouch: "ArrowDown",
    },
    ControlScheme {
        left: "KeyJ",
        right: "KeyL",
        jump: "KeyI",
        crouch: "KeyK",
    },
    ControlScheme {
        left: "Numpad4",
        right: "Numpad6",
        jump: "Numpad8",
        crouch: "Numpad2",
    },
];

/// Look up a scheme by index. Indices past the table use the first scheme.
pub fn control_scheme(index: usize) -> &'static ControlScheme {
    CONTROL_SCHEMES.get(index).unwrap_or(&CONTROL_SCHEMES[0])
}

/// Jump classification derived from press timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JumpType {
    #[default]
    None,
    Short,
    Long,
    Double,
}

/// Per-player input sampled once per simulation tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub crouch: bool,
    pub double_jump: bool,
    pub jump_type: JumpType,
    pub jump_duration_ms: f64,
}

#[derive(Debug, Clone, Default)]
struct JumpTracker {
    /// Start of the press currently held.
    held_since: Option<f64>,
    /// A finished press (start, end) waiting to be reported once.
    released: Option<(f64, f64)>,
    last_press: Option<f64>,
    press_count: u32,
    count_expires_at: f64,
}

impl JumpTracker {
    fn on_press(&mut self, now_ms: f64) {
        let chained = self.press_count > 0
            && now_ms < self.count_expires_at
            && self
                .last_press
                .is_some_and(|last| now_ms - last < DOUBLE_PRESS_WINDOW_MS);
        self.press_count = if chained { self.press_count + 1 } else { 1 };
        self.last_press = Some(now_ms);
        self.count_expires_at = now_ms + PRESS_COUNT_RESET_MS;
        self.held_since = Some(now_ms);
        self.released = None;
    }

    fn on_release(&mut self, now_ms: f64) {
        if let Some(start) = self.held_since.take() {
            self.released = Some((start, now_ms));
        }
    }

    fn active_count(&self, now_ms: f64) -> u32 {
        if now_ms < self.count_expires_at {
            self.press_count
        } else {
            0
        }
    }

    /// Classify the jump and consume a pending release.
    fn classify(&mut self, now_ms: f64) -> (JumpType, f64) {
        if let Some((start, end)) = self.released.take() {
            let duration = end - start;
            let doubled = self.press_count >= 2
                && self
                    .last_press
                    .is_some_and(|last| end - last < DOUBLE_PRESS_WINDOW_MS);
            let kind = if doubled {
                JumpType::Double
            } else if duration < SHORT_JUMP_MS {
                JumpType::Short
            } else {
                JumpType::Long
            };
            return (kind, duration);
        }
        match self.held_since {
            Some(start) => {
                let duration = now_ms - start;
                let kind = if duration < PROVISIONAL_JUMP_MS {
                    JumpType::None
                } else if duration < SHORT_JUMP_MS {
                    JumpType::Short
                } else {
                    JumpType::Long
                };
                (kind, duration)
            },
            None => (JumpType::None, 0.0),
        }
    }
}

/// Keyboard state for every local player, fed by host key events.
///
/// Timestamps are supplied by the caller so that replays and tests are
/// deterministic.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Key codes currently held.
    pub keys_down: HashSet<String>,
    schemes: Vec<usize>,
    jumps: Vec<JumpTracker>,
}

impl InputState {
    /// One slot per player, slot `i` bound to scheme `i`.
    pub fn new(player_count: usize) -> Self {
        Self {
            keys_down: HashSet::new(),
            schemes: (0..player_count).collect(),
            jumps: vec![JumpTracker::default(); player_count],
        }
    }

    pub fn player_count(&self) -> usize {
        self.schemes.len()
    }

    pub fn scheme_of(&self, player: usize) -> &'static ControlScheme {
        control_scheme(self.schemes.get(player).copied().unwrap_or(0))
    }

    /// Rebind a player slot. Unknown scheme indices fall back to scheme 0.
    pub fn set_control_scheme(&mut self, player: usize, scheme: usize) {
        let scheme = if scheme < CONTROL_SCHEMES.len() {
            scheme
        } else {
            tracing::warn!(player, scheme, "Unknown control scheme, using scheme 0");
            0
        };
        if let Some(slot) = self.schemes.get_mut(player) {
            *slot = scheme;
        }
    }

    /// Register a key press. Auto-repeat of a held key is ignored.
    pub fn key_down(&mut self, code: &str, now_ms: f64) {
        if !self.keys_down.insert(code.to_string()) {
            return;
        }
        // A jump key shared by several slots goes to the first one bound to it.
        let schemes = &self.schemes;
        if let Some(tracker) = self
            .jumps
            .iter_mut()
            .enumerate()
            .find(|(player, _)| control_scheme(schemes[*player]).jump == code)
            .map(|(_, tracker)| tracker)
        {
            tracker.on_press(now_ms);
        }
    }

    pub fn key_up(&mut self, code: &str, now_ms: f64) {
        if !self.keys_down.remove(code) {
            return;
        }
        let schemes = &self.schemes;
        if let Some(tracker) = self
            .jumps
            .iter_mut()
            .enumerate()
            .find(|(player, tracker)| {
                control_scheme(schemes[*player]).jump == code && tracker.held_since.is_some()
            })
            .map(|(_, tracker)| tracker)
        {
            tracker.on_release(now_ms);
        }
    }

    pub fn is_key_down(&self, code: &str) -> bool {
        self.keys_down.contains(code)
    }

    /// Sample every player's input. Released jump classes are reported once.
    pub fn snapshot(&mut self, now_ms: f64) -> Vec<PlayerInput> {
        (0..self.schemes.len())
            .map(|player| {
                let scheme = control_scheme(self.schemes[player]);
                let tracker = &mut self.jumps[player];
                let (jump_type, jump_duration_ms) = tracker.classify(now_ms);
                PlayerInput {
                    left: self.keys_down.contains(scheme.left),
                    right: self.keys_down.contains(scheme.right),
                    jump: self.keys_down.contains(scheme.jump),
                    crouch: self.keys_down.contains(scheme.crouch),
                    double_jump: tracker.active_count(now_ms) >= 2,
                    jump_type,
                    jump_duration_ms,
                }
            })
            .collect()
    }

    /// Drop held keys and pending jump timing.
    pub fn clear(&mut self) {
        self.keys_down.clear();
        for tracker in &mut self.jumps {
            *tracker = JumpTracker::default();
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_table_and_fallback() {
        assert_eq!(control_scheme(0).jump, "KeyW");
        assert_eq!(control_scheme(1).left, "ArrowLeft");
        assert_eq!(control_scheme(2).crouch, "KeyK");
        assert_eq!(control_scheme(3).right, "Numpad6");
        assert_eq!(
            control_scheme(9),
            &CONTROL_SCHEMES[0],
            "Out-of-range scheme must fall back to scheme 0"
        );
    }

    #[test]
    fn held_keys_map_to_player_slots() {
        let mut input = InputState::new(2);
        input.key_down("KeyA", 0.0);
        input.key_down("ArrowRight", 0.0);
        input.key_down("ArrowDown", 0.0);
        let snap = input.snapshot(1.0);
        assert!(snap[0].left && !snap[0].right);
        assert!(snap[1].right && snap[1].crouch && !snap[1].left);

        input.key_up("KeyA", 2.0);
        let snap = input.snapshot(3.0);
        assert!(!snap[0].left, "Released key must no longer be held");
    }

    #[test]
    fn short_release_classifies_short_once() {
        let mut input = InputState::new(1);
        input.key_down("KeyW", 1000.0);
        input.key_up("KeyW", 1080.0);
        let snap = input.snapshot(1090.0);
        assert_eq!(snap[0].jump_type, JumpType::Short);
        assert_eq!(snap[0].jump_duration_ms, 80.0);
        let snap = input.snapshot(1100.0);
        assert_eq!(
            snap[0].jump_type,
            JumpType::None,
            "A released class is reported exactly once"
        );
    }

    #[test]
    fn long_release_classifies_long() {
        let mut input = InputState::new(1);
        input.key_down("KeyW", 0.0);
        input.key_up("KeyW", 200.0);
        assert_eq!(input.snapshot(210.0)[0].jump_type, JumpType::Long);
    }

    #[test]
    fn provisional_class_while_held() {
        let mut input = InputState::new(1);
        input.key_down("KeyW", 0.0);
        assert_eq!(input.snapshot(30.0)[0].jump_type, JumpType::None);
        assert_eq!(input.snapshot(60.0)[0].jump_type, JumpType::Short);
        let snap = input.snapshot(150.0);
        assert_eq!(snap[0].jump_type, JumpType::Long);
        assert!(snap[0].jump, "Jump key is still held");
    }

    #[test]
    fn two_quick_presses_are_double() {
        let mut input = InputState::new(1);
        input.key_down("KeyW", 0.0);
        input.key_up("KeyW", 40.0);
        input.snapshot(45.0);
        input.key_down("KeyW", 150.0);
        let snap = input.snapshot(160.0);
        assert!(snap[0].double_jump, "Second press inside 300ms sets double_jump");
        input.key_up("KeyW", 190.0);
        assert_eq!(input.snapshot(200.0)[0].jump_type, JumpType::Double);
    }

    #[test]
    fn slow_presses_are_not_double() {
        let mut input = InputState::new(1);
        input.key_down("KeyW", 0.0);
        input.key_up("KeyW", 50.0);
        input.key_down("KeyW", 500.0);
        let snap = input.snapshot(510.0);
        assert!(!snap[0].double_jump);
    }

    #[test]
    fn press_count_expires() {
        let mut input = InputState::new(1);
        input.key_down("KeyW", 0.0);
        input.key_up("KeyW", 20.0);
        input.key_down("KeyW", 100.0);
        input.key_up("KeyW", 120.0);
        assert!(input.snapshot(130.0)[0].double_jump);
        assert!(
            !input.snapshot(600.0)[0].double_jump,
            "Counter must reset 400ms after the last press"
        );
    }

    #[test]
    fn key_repeat_is_ignored() {
        let mut input = InputState::new(1);
        input.key_down("KeyW", 0.0);
        input.key_down("KeyW", 30.0);
        input.key_down("KeyW", 60.0);
        let snap = input.snapshot(70.0);
        assert!(!snap[0].double_jump, "Auto-repeat must not count as presses");
        assert_eq!(snap[0].jump_duration_ms, 70.0);
    }

    #[test]
    fn rebinding_and_unknown_scheme() {
        let mut input = InputState::new(2);
        input.set_control_scheme(1, 3);
        assert_eq!(input.scheme_of(1).jump, "Numpad8");
        input.set_control_scheme(1, 42);
        assert_eq!(input.scheme_of(1).jump, "KeyW");
    }

    #[test]
    fn shared_jump_key_drives_only_the_first_slot() {
        let mut input = InputState::new(3);
        input.set_control_scheme(1, 0);
        input.set_control_scheme(2, 0);
        input.key_down("KeyW", 0.0);
        input.key_up("KeyW", 60.0);
        input.key_down("KeyW", 100.0);
        let snap = input.snapshot(110.0);
        assert!(snap[0].double_jump, "First bound slot sees both presses");
        assert!(
            snap.iter().skip(1).all(|p| !p.double_jump && p.jump_type == JumpType::None),
            "Later slots sharing the key get no press timing: {snap:?}"
        );
        assert!(snap.iter().all(|p| p.jump), "Held state is still shared");
    }

    #[test]
    fn clear_drops_everything() {
        let mut input = InputState::new(1);
        input.key_down("KeyD", 0.0);
        input.key_down("KeyW", 0.0);
        input.clear();
        let snap = input.snapshot(100.0);
        assert_eq!(snap[0], PlayerInput::default());
    }
}
