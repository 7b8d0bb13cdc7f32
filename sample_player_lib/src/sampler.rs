use std::sync::Arc;

use crate::common_types::Note;
use crate::sample::Sample;
use crate::store::SoundStore;
use crate::voice::{Voice, VoicePhase};
use crate::volume::Volume;

pub const DEFAULT_VOICE_COUNT: usize = 16;

/// Playback speed for `note` relative to the sample's root pitch.
fn pitch_ratio(note: u8, root_note: u8) -> f64 {
    2f64.powf((note as f64 - root_note as f64) / 12.0)
}

/// The polyphonic playback engine: a fixed pool of voices mixed down from
/// one loaded sample.
///
/// Every slot is allocated up front; note handling and rendering never
/// allocate, block or panic. Time is tracked only through the `now` frame
/// counter, so identical event sequences render identical output.
#[derive(Clone, Debug)]
pub struct Sampler {
    store: SoundStore,
    voices: Vec<Voice>,
    channel_count: usize,
    sample_rate: f32,
    now: usize,
}

impl Sampler {
    pub fn new(channel_count: usize, sample_rate: f32, voice_count: usize) -> Self {
        Self {
            store: SoundStore::default(),
            voices: vec![Voice::idle(); voice_count],
            channel_count,
            sample_rate,
            now: 0,
        }
    }

    pub fn reset(&mut self) {
        self.stop_all_voices();
        self.now = 0;
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    pub fn iter_active_notes(&self) -> impl Iterator<Item = Note> + '_ {
        self.voices.iter().filter(|v| v.active).map(|v| v.note)
    }

    /// Replaces the loaded sample. Voices still referencing the old sample
    /// are hard-stopped first so no stale position survives into the next
    /// frame.
    pub fn load_sample(&mut self, sample: Arc<Sample>) {
        self.stop_all_voices();
        self.store.load(sample);
    }

    pub fn clear_sample(&mut self) {
        self.stop_all_voices();
        self.store.clear();
    }

    pub fn current_sample(&self) -> Option<&Arc<Sample>> {
        self.store.current()
    }

    /// Starts a voice for `note`. Silently ignored when no sample is loaded
    /// or the note falls outside the sample's key range; when the pool is
    /// saturated the oldest-started voice is stolen.
    pub fn note_on(&mut self, note: Note, velocity: f32) {
        let (step, attack_samples) = match self.store.current() {
            Some(sample) => {
                if !sample.key_range().contains(&note.note) {
                    return;
                }
                let step = pitch_ratio(note.note, sample.root_note())
                    * (sample.sample_rate() / self.sample_rate) as f64;
                let attack = (sample.attack_seconds() * self.sample_rate) as usize;
                (step, attack)
            }
            None => return,
        };
        let now = self.now;
        let slot = self.acquire_slot();
        let voice = &mut self.voices[slot];
        *voice = Voice {
            note,
            velocity,
            position: 0.0,
            step,
            volume: Volume::new(0.0),
            phase: VoicePhase::Attack,
            started_at: now,
            active: true,
        };
        voice.volume.to(now, attack_samples, velocity);
    }

    /// Moves the matching voice into its release phase. A note-off without a
    /// matching voice is not an error: some DAWs send note off events for
    /// notes that were never played, e.g. REAPER.
    pub fn note_off(&mut self, note: Note) {
        let release_samples = match self.store.current() {
            Some(sample) => (sample.release_seconds() * self.sample_rate) as usize,
            None => return,
        };
        let now = self.now;
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.active && v.note == note && v.phase != VoicePhase::Release)
        {
            voice.phase = VoicePhase::Release;
            voice.volume.to(now, release_samples, 0.0);
        }
    }

    /// Renders one frame across all output channels. The slice is written,
    /// not accumulated, so channels with no voice contribution come out
    /// silent.
    pub fn process_frame(&mut self, frame: &mut [&mut f32]) {
        debug_assert_eq!(frame.len(), self.channel_count);
        for out in frame.iter_mut() {
            **out = 0.0;
        }
        let now = self.now;
        if let Some(sample) = self.store.current() {
            let len = sample.len_frames() as f64;
            for voice in self.voices.iter_mut() {
                if !voice.active {
                    continue;
                }
                if voice.phase == VoicePhase::Attack && voice.volume.is_static() {
                    voice.phase = VoicePhase::Sustain;
                }
                if voice.phase == VoicePhase::Release && voice.volume.is_static_and_mute() {
                    voice.active = false;
                    continue;
                }
                if voice.position >= len {
                    voice.active = false;
                    continue;
                }
                let gain = voice.volume.value(now);
                for (c, out) in frame.iter_mut().enumerate() {
                    **out += sample.read(c, voice.position) * gain;
                }
                voice.position += voice.step;
                voice.volume.step(now);
            }
        }
        self.now += 1;
    }

    fn stop_all_voices(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.active = false;
        }
    }

    /// Returns a free slot, stealing the oldest-started voice when the pool
    /// is saturated. Ties go to the lowest slot index.
    fn acquire_slot(&mut self) -> usize {
        if let Some(i) = self.voices.iter().position(|v| !v.active) {
            return i;
        }
        let mut oldest = 0;
        for (i, voice) in self.voices.iter().enumerate() {
            if voice.started_at < self.voices[oldest].started_at {
                oldest = i;
            }
        }
        log::debug!(
            "voice pool saturated, stealing slot {} (note {})",
            oldest,
            self.voices[oldest].note.note
        );
        self.voices[oldest].active = false;
        oldest
    }
}
