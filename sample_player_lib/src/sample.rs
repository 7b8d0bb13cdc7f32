use std::ops::RangeInclusive;

use crate::decoder::{DecodeError, DecodedAudio};

pub const DEFAULT_ROOT_NOTE: u8 = 60;
pub const DEFAULT_ATTACK_SECONDS: f32 = 0.1;
pub const DEFAULT_RELEASE_SECONDS: f32 = 0.1;

/// Samples longer than this are truncated at load time.
pub const MAX_SAMPLE_SECONDS: f32 = 10.0;

/// An immutable decoded audio sample plus its playback metadata.
///
/// Built once when a file is loaded and replaced wholesale on the next load;
/// the engine only ever reads it. Construction is all-or-nothing: a
/// malformed buffer never produces a partially valid sample.
#[derive(Clone, Debug)]
pub struct Sample {
    channels: Vec<Vec<f32>>,
    sample_rate: f32,
    root_note: u8,
    key_range: RangeInclusive<u8>,
    attack_seconds: f32,
    release_seconds: f32,
}

impl Sample {
    pub fn new(
        mut channels: Vec<Vec<f32>>,
        sample_rate: f32,
        root_note: u8,
        key_range: RangeInclusive<u8>,
        attack_seconds: f32,
        release_seconds: f32,
    ) -> Result<Self, DecodeError> {
        if channels.is_empty() || channels[0].is_empty() {
            return Err(DecodeError::EmptyAudio);
        }
        let len = channels[0].len();
        if channels.iter().any(|ch| ch.len() != len) {
            return Err(DecodeError::ChannelMismatch);
        }
        let max_frames = (MAX_SAMPLE_SECONDS * sample_rate) as usize;
        for ch in &mut channels {
            ch.truncate(max_frames);
        }
        Ok(Self {
            channels,
            sample_rate,
            root_note,
            key_range,
            attack_seconds,
            release_seconds,
        })
    }

    /// Builds a sample from decoder output with the default metadata used by
    /// the plugin: root note 60, full key range, 100 ms attack and release.
    pub fn from_decoded(decoded: DecodedAudio) -> Result<Self, DecodeError> {
        Self::new(
            decoded.channels,
            decoded.sample_rate as f32,
            DEFAULT_ROOT_NOTE,
            0..=127,
            DEFAULT_ATTACK_SECONDS,
            DEFAULT_RELEASE_SECONDS,
        )
    }

    pub fn len_frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn root_note(&self) -> u8 {
        self.root_note
    }

    pub fn key_range(&self) -> &RangeInclusive<u8> {
        &self.key_range
    }

    pub fn attack_seconds(&self) -> f32 {
        self.attack_seconds
    }

    pub fn release_seconds(&self) -> f32 {
        self.release_seconds
    }

    /// Reads `channel` at a fractional frame position with linear
    /// interpolation. Channels beyond the sample's own are clamped so a mono
    /// sample feeds every output channel. `position` must be in
    /// `[0, len_frames)`.
    pub fn read(&self, channel: usize, position: f64) -> f32 {
        let data = &self.channels[channel.min(self.channels.len() - 1)];
        let i = position as usize;
        let frac = (position - i as f64) as f32;
        let a = data[i];
        let b = if i + 1 < data.len() { data[i + 1] } else { a };
        a + (b - a) * frac
    }
}
