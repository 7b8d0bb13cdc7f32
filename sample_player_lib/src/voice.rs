use crate::common_types::Note;
use crate::volume::Volume;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoicePhase {
    Attack,
    Sustain,
    Release,
}

/// Per-note playback state for one pool slot.
///
/// `position` is a fractional frame index into the current sample; it
/// advances by `step` every output frame, where `step` folds together the
/// pitch ratio for the requested note and the source/output rate ratio.
/// `started_at` is the engine clock at note-on and drives the stealing
/// policy.
#[derive(Clone, Debug)]
pub struct Voice {
    pub note: Note,
    pub velocity: f32,
    pub position: f64,
    pub step: f64,
    pub volume: Volume,
    pub phase: VoicePhase,
    pub started_at: usize,
    pub active: bool,
}

impl Voice {
    pub(crate) fn idle() -> Self {
        Self {
            note: Note::default(),
            velocity: 0.0,
            position: 0.0,
            step: 0.0,
            volume: Volume::new(0.0),
            phase: VoicePhase::Release,
            started_at: 0,
            active: false,
        }
    }
}
