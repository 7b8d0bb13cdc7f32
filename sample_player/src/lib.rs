use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use nih_plug::prelude::*;
use smallvec::SmallVec;

use sample_player_lib::common_types::Note;
use sample_player_lib::decoder::{self, DecodeError};
use sample_player_lib::sample::Sample;
use sample_player_lib::sampler::{Sampler, DEFAULT_VOICE_COUNT};

type SysEx = ();

/// Work that must stay off the realtime thread. Decoded samples come back
/// through the `incoming_samples` queue and are installed at block start.
#[derive(Debug)]
pub enum PlayerTask {
    LoadFile(PathBuf),
}

pub struct SamplePlayer {
    audio_io_layout: AudioIOLayout,
    params: Arc<SamplePlayerParams>,
    sample_rate: f32,
    sampler: Sampler,
    loaded: Option<Arc<Sample>>,
    incoming_samples: Arc<ArrayQueue<Arc<Sample>>>,
}

#[derive(Params)]
pub struct SamplePlayerParams {
    #[id = "root_note"]
    pub root_note: IntParam,
    #[id = "key_lo"]
    pub key_lo: IntParam,
    #[id = "key_hi"]
    pub key_hi: IntParam,
    #[id = "attack"]
    pub attack: FloatParam,
    #[id = "release"]
    pub release: FloatParam,
    #[id = "gain"]
    pub gain: FloatParam,
    /// Path of the loaded audio file, saved with the host state so the
    /// sample comes back after a session reload.
    #[persist = "sample-path"]
    sample_path: Arc<parking_lot::RwLock<Option<String>>>,
}

const MILLISECONDS_PARAM_SKEW_FACTOR: f32 = 0.25;

impl Default for SamplePlayerParams {
    fn default() -> Self {
        Self {
            root_note: IntParam::new("Root note", 60, IntRange::Linear { min: 0, max: 127 }),
            key_lo: IntParam::new("Key range low", 0, IntRange::Linear { min: 0, max: 127 }),
            key_hi: IntParam::new("Key range high", 127, IntRange::Linear { min: 0, max: 127 }),
            attack: FloatParam::new(
                "Attack",
                100.0,
                FloatRange::Skewed {
                    min: 0.0,
                    max: 1000.0,
                    factor: MILLISECONDS_PARAM_SKEW_FACTOR,
                },
            )
            .with_unit(" ms"),
            release: FloatParam::new(
                "Release",
                100.0,
                FloatRange::Skewed {
                    min: 0.0,
                    max: 1000.0,
                    factor: MILLISECONDS_PARAM_SKEW_FACTOR,
                },
            )
            .with_unit(" ms"),
            gain: FloatParam::new("Gain", 1.0, FloatRange::Linear { min: 0.0, max: 1.0 }),
            sample_path: Arc::new(parking_lot::RwLock::new(None)),
        }
    }
}

impl Default for SamplePlayer {
    fn default() -> Self {
        Self {
            audio_io_layout: AudioIOLayout::default(),
            params: Arc::new(SamplePlayerParams::default()),
            sample_rate: -1.0,
            sampler: Sampler::new(0, 44100.0, DEFAULT_VOICE_COUNT),
            loaded: None,
            incoming_samples: Arc::new(ArrayQueue::new(1)),
        }
    }
}

/// Decodes `path` and stamps the decoded audio with the current metadata
/// parameters, the way the JUCE SamplerSound constructor takes them.
fn load_sample_file(
    path: &Path,
    params: &SamplePlayerParams,
) -> Result<Sample, DecodeError> {
    let decoded = decoder::decode_file(path)?;
    let lo = params.key_lo.value().min(params.key_hi.value()) as u8;
    let hi = params.key_lo.value().max(params.key_hi.value()) as u8;
    Sample::new(
        decoded.channels,
        decoded.sample_rate as f32,
        params.root_note.value() as u8,
        lo..=hi,
        params.attack.value() / 1000.0,
        params.release.value() / 1000.0,
    )
}

impl SamplePlayer {
    fn channel_count(&self) -> usize {
        let channel_count: usize = self
            .audio_io_layout
            .main_output_channels
            .unwrap()
            .get()
            .try_into()
            .unwrap();
        channel_count
    }
}

impl Plugin for SamplePlayer {
    const NAME: &'static str = "Sample Player";
    const VENDOR: &'static str = "seunje";
    const URL: &'static str = env!("CARGO_PKG_REPOSITORY");
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: None,
            main_output_channels: NonZeroU32::new(2),

            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: None,
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
    ];
    const MIDI_INPUT: MidiConfig = MidiConfig::Basic;
    const SAMPLE_ACCURATE_AUTOMATION: bool = true;
    type SysExMessage = SysEx;

    type BackgroundTask = PlayerTask;

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn task_executor(&mut self) -> TaskExecutor<Self> {
        let queue = self.incoming_samples.clone();
        let params = self.params.clone();
        Box::new(move |task| match task {
            PlayerTask::LoadFile(path) => match load_sample_file(&path, &params) {
                Ok(sample) => {
                    // a still-pending older load is simply replaced
                    let _ = queue.force_push(Arc::new(sample));
                    *params.sample_path.write() =
                        Some(path.to_string_lossy().into_owned());
                }
                Err(err) => {
                    nih_error!("failed to load {}: {}", path.display(), err);
                }
            },
        })
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        context: &mut impl InitContext<Self>,
    ) -> bool {
        self.audio_io_layout = audio_io_layout.clone();
        self.sample_rate = buffer_config.sample_rate;
        self.sampler = Sampler::new(self.channel_count(), self.sample_rate, DEFAULT_VOICE_COUNT);
        if let Some(sample) = &self.loaded {
            self.sampler.load_sample(sample.clone());
        } else {
            // re-decode a path restored from saved state; runs on this
            // (non-realtime) thread and lands in the queue for process()
            let path = self.params.sample_path.read().clone();
            if let Some(path) = path {
                context.execute(PlayerTask::LoadFile(PathBuf::from(path)));
            }
        }
        true
    }

    fn reset(&mut self) {
        self.sampler.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        while let Some(sample) = self.incoming_samples.pop() {
            self.sampler.load_sample(sample.clone());
            self.loaded = Some(sample);
        }

        let mut next_event = context.next_event();
        for (sample_id, channel_samples) in buffer.iter_samples().enumerate() {
            while let Some(event) = next_event {
                if event.timing() != sample_id as u32 {
                    break;
                }
                match event {
                    NoteEvent::NoteOn {
                        note,
                        channel,
                        velocity,
                        ..
                    } => self.sampler.note_on(Note::new(note, channel), velocity),
                    NoteEvent::NoteOff { note, channel, .. } => {
                        self.sampler.note_off(Note::new(note, channel))
                    }
                    _ => (),
                }
                next_event = context.next_event();
            }

            let mut frame: SmallVec<[&mut f32; 2]> = channel_samples.into_iter().collect();
            self.sampler.process_frame(&mut frame);

            let gain = self.params.gain.smoothed.next();
            for sample in frame.iter_mut() {
                **sample *= gain;
            }
        }

        ProcessStatus::Normal
    }
}

impl ClapPlugin for SamplePlayer {
    const CLAP_ID: &'static str = "com.sampleplayer";
    const CLAP_DESCRIPTION: Option<&'static str> = Some("Sample Player");
    const CLAP_MANUAL_URL: Option<&'static str> = Some(Self::URL);
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::Instrument,
        ClapFeature::Sampler,
        ClapFeature::Stereo,
        ClapFeature::Mono,
    ];
}

impl Vst3Plugin for SamplePlayer {
    const VST3_CLASS_ID: [u8; 16] = *b"SamplePlayerPlug";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Instrument, Vst3SubCategory::Sampler];
}

nih_export_clap!(SamplePlayer);
nih_export_vst3!(SamplePlayer);
