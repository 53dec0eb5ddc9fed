use serde::{Deserialize, Serialize};

/// Sound effects the simulation asks the host to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Jump,
    DoubleJump,
    Explosion,
    Collect,
    PowerUp,
    Hit,
}

/// Audio output. Implementations must not block the tick.
pub trait SoundSink {
    fn play(&mut self, cue: SoundCue);
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSound;

impl SoundSink for NullSound {
    fn play(&mut self, _cue: SoundCue) {}
}
