use serde::{Deserialize, Serialize};

/// Terminal outcomes reported by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A player hit a hazard. Carries the player slot.
    PlayerDeath { player: usize },
    /// Every required player reached the goal of a non-final level.
    LevelComplete { level: u8 },
    /// The final objective is done (boss defeated or course finished).
    Victory,
}

/// Host-side reactions to terminal outcomes. Invoked synchronously from the tick.
pub trait GameCallbacks {
    fn on_player_death(&mut self) {}
    fn on_level_complete(&mut self) {}
    fn on_victory(&mut self) {}
}

/// Route an event to the matching callback.
pub fn dispatch(event: GameEvent, callbacks: &mut dyn GameCallbacks) {
    match event {
        GameEvent::PlayerDeath { .. } => callbacks.on_player_death(),
        GameEvent::LevelComplete { .. } => callbacks.on_level_complete(),
        GameEvent::Victory => callbacks.on_victory(),
    }
}

/// Callbacks that ignore everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallbacks;

impl GameCallbacks for NoCallbacks {}

/// Callbacks built from closures.
#[derive(Default)]
pub struct CallbackSet {
    player_death: Option<Box<dyn FnMut()>>,
    level_complete: Option<Box<dyn FnMut()>>,
    victory: Option<Box<dyn FnMut()>>,
}

impl CallbackSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_player_death(mut self, f: impl FnMut() + 'static) -> Self {
        self.player_death = Some(Box::new(f));
        self
    }

    pub fn on_level_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.level_complete = Some(Box::new(f));
        self
    }

    pub fn on_victory(mut self, f: impl FnMut() + 'static) -> Self {
        self.victory = Some(Box::new(f));
        self
    }
}

impl GameCallbacks for CallbackSet {
    fn on_player_death(&mut self) {
        if let Some(f) = self.player_death.as_mut() {
            f();
        }
    }

    fn on_level_complete(&mut self) {
        if let Some(f) = self.level_complete.as_mut() {
            f();
        }
    }

    fn on_victory(&mut self) {
        if let Some(f) = self.victory.as_mut() {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn dispatch_routes_each_event() {
        let deaths = Rc::new(Cell::new(0));
        let levels = Rc::new(Cell::new(0));
        let wins = Rc::new(Cell::new(0));
        let (d, l, w) = (Rc::clone(&deaths), Rc::clone(&levels), Rc::clone(&wins));
        let mut callbacks = CallbackSet::new()
            .on_player_death(move || d.set(d.get() + 1))
            .on_level_complete(move || l.set(l.get() + 1))
            .on_victory(move || w.set(w.get() + 1));

        dispatch(GameEvent::PlayerDeath { player: 1 }, &mut callbacks);
        dispatch(GameEvent::LevelComplete { level: 2 }, &mut callbacks);
        dispatch(GameEvent::Victory, &mut callbacks);
        dispatch(GameEvent::Victory, &mut callbacks);

        assert_eq!(deaths.get(), 1);
        assert_eq!(levels.get(), 1);
        assert_eq!(wins.get(), 2);
    }

    #[test]
    fn missing_closures_are_ignored() {
        let mut callbacks = CallbackSet::new();
        dispatch(GameEvent::Victory, &mut callbacks);
        dispatch(GameEvent::PlayerDeath { player: 0 }, &mut NoCallbacks);
    }
}
