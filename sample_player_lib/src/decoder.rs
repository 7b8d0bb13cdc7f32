use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to open audio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unrecognized audio format: {0}")]
    UnknownFormat(String),

    #[error("no audio track in file")]
    NoAudioTrack,

    #[error("sample rate not specified")]
    MissingSampleRate,

    #[error("decode failed: {0}")]
    Decode(#[from] SymphoniaError),

    #[error("file contains no audio data")]
    EmptyAudio,

    #[error("channels have mismatched lengths")]
    ChannelMismatch,
}

/// A fully decoded audio file: planar per-channel frames plus the source
/// sample rate. This is the whole contract the engine has with the decoder.
#[derive(Clone, Debug)]
pub struct DecodedAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

/// Decodes an entire audio file (WAV, FLAC, MP3, and anything else symphonia
/// recognizes) into memory. Must only be called off the realtime thread.
pub fn decode_file(path: &Path) -> Result<DecodedAudio, DecodeError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::UnknownFormat(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::MissingSampleRate)?;
    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut channels: Vec<Vec<f32>> = vec![];
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => append_planar(&decoded, &mut channels),
            // a corrupt packet is skipped, not fatal
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    if channels.is_empty() || channels[0].is_empty() {
        return Err(DecodeError::EmptyAudio);
    }
    Ok(DecodedAudio {
        channels,
        sample_rate,
    })
}

fn append_planar(decoded: &AudioBufferRef<'_>, channels: &mut Vec<Vec<f32>>) {
    let spec = *decoded.spec();
    let channel_count = spec.channels.count();
    if channels.is_empty() {
        *channels = vec![Vec::new(); channel_count];
    } else if channels.len() != channel_count {
        // mid-stream channel layout changes are not representable here
        return;
    }
    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
    buf.copy_interleaved_ref(decoded.clone());
    for (i, sample) in buf.samples().iter().enumerate() {
        channels[i % channel_count].push(*sample);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn write_wav(path: &Path, frames: &[f32], sample_rate: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for x in frames {
            writer
                .write_sample((x * i16::MAX as f32) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let frames: Vec<f32> = (0..4410)
            .map(|i| (i as f32 / 100.0).sin() * 0.5)
            .collect();
        write_wav(&path, &frames, 44100);

        let decoded = decode_file(&path).unwrap();
        assert_eq!(decoded.sample_rate, 44100);
        assert_eq!(decoded.channels.len(), 1);
        assert_eq!(decoded.channels[0].len(), 4410);
        // 16-bit quantization noise only
        for (a, b) in decoded.channels[0].iter().zip(frames.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_decode_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-audio.wav");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"this is definitely not a wav file").unwrap();
        assert!(decode_file(&path).is_err());
    }

    #[test]
    fn test_decode_missing_file_fails() {
        let r = decode_file(Path::new("/nonexistent/whatever.wav"));
        assert!(matches!(r, Err(DecodeError::Io(_))));
    }
}
