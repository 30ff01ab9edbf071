use crate::routine::SoundType;

/// Plays the completion cue for a task. Fire-and-forget.
pub trait CompletionCue {
    fn play(&self, sound: SoundType);
}

/// Plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCue;

impl CompletionCue for SilentCue {
    fn play(&self, sound: SoundType) {
        tracing::debug!(%sound, "completion cue suppressed");
    }
}

impl<C: CompletionCue + ?Sized> CompletionCue for &C {
    fn play(&self, sound: SoundType) {
        (**self).play(sound)
    }
}
