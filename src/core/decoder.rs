// src/core/decoder.rs
//
// Audio decoding to interleaved f32 samples.
// Uses Symphonia for format-agnostic decoding.

use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{AnalysisError, Result};

/// Container for decoded audio data
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Interleaved samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of audio channels
    pub channels: usize,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Short codec name, e.g. "pcm_s16le"
    pub codec_name: String,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: usize) -> Self {
        let channels = channels.max(1);
        let duration_secs = if sample_rate > 0 {
            samples.len() as f64 / (sample_rate as f64 * channels as f64)
        } else {
            0.0
        };

        Self {
            samples,
            sample_rate,
            channels,
            duration_secs,
            codec_name: "pcm_f32".to_string(),
        }
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec_name = codec.into();
        self
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }
}

/// Stream parameters read without decoding
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStreamInfo {
    pub codec_name: String,
    pub sample_rate: u32,
    pub channels: usize,
}

fn open_format(path: &Path) -> Result<Box<dyn FormatReader>> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    Ok(probed.format)
}

fn default_track(format: &dyn FormatReader) -> Result<(u32, CodecParameters)> {
    format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .map(|t| (t.id, t.codec_params.clone()))
        .ok_or_else(|| AnalysisError::AudioDecode("no supported audio track found".to_string()))
}

fn codec_short_name(params: &CodecParameters) -> String {
    symphonia::default::get_codecs()
        .get_codec(params.codec)
        .map(|d| d.short_name.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Read codec, sample rate and channel count of the first audio track
pub fn probe_audio(path: &Path) -> Result<AudioStreamInfo> {
    let format = open_format(path)?;
    let (_, params) = default_track(format.as_ref())?;

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| AnalysisError::AudioDecode("stream does not specify sample rate".into()))?;

    Ok(AudioStreamInfo {
        codec_name: codec_short_name(&params),
        sample_rate,
        channels: params.channels.map(|c| c.count()).unwrap_or(2),
    })
}

/// Decode audio file to floating-point samples
pub fn decode_audio(path: &Path) -> Result<AudioData> {
    let mut format = open_format(path)?;
    let (track_id, params) = default_track(format.as_ref())?;

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| AnalysisError::AudioDecode("stream does not specify sample rate".into()))?;
    let channels = params.channels.map(|c| c.count()).unwrap_or(2);

    if channels == 0 {
        return Err(AnalysisError::AudioDecode("stream reports 0 channels".into()));
    }

    let mut decoder = symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    if samples.is_empty() {
        return Err(AnalysisError::AudioDecode(
            "no audio samples decoded from file".to_string(),
        ));
    }

    Ok(AudioData::new(samples, sample_rate, channels).with_codec(codec_short_name(&params)))
}

/// Down-mix to mono by averaging channels
pub fn extract_mono(audio: &AudioData) -> Vec<f32> {
    if audio.channels <= 1 {
        return audio.samples.clone();
    }

    audio
        .samples
        .chunks_exact(audio.channels)
        .map(|frame| frame.iter().sum::<f32>() / audio.channels as f32)
        .collect()
}

/// Extract the first two channels as (left, right)
pub fn extract_stereo(audio: &AudioData) -> Option<(Vec<f32>, Vec<f32>)> {
    if audio.channels < 2 {
        return None;
    }

    let (left, right) = audio
        .samples
        .chunks_exact(audio.channels)
        .map(|frame| (frame[0], frame[1]))
        .unzip();

    Some((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_mono() {
        let audio = AudioData::new(vec![0.5, -0.5, 0.3, -0.3], 44100, 2);

        let mono = extract_mono(&audio);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.0).abs() < 0.001);
        assert!((mono[1] - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_extract_stereo_uses_first_two_channels() {
        let audio = AudioData::new(vec![0.1, 0.2, 0.9, 0.3, 0.4, 0.9], 48000, 3);

        let (left, right) = extract_stereo(&audio).unwrap();
        assert_eq!(left, vec![0.1, 0.3]);
        assert_eq!(right, vec![0.2, 0.4]);
        assert!(extract_stereo(&AudioData::new(vec![0.0; 4], 48000, 1)).is_none());
    }

    #[test]
    fn test_duration() {
        let audio = AudioData::new(vec![0.0; 88200], 44100, 2);
        assert!((audio.duration_secs - 1.0).abs() < 1e-9);
        assert_eq!(audio.frames(), 44100);
    }

    #[test]
    fn test_decode_wav_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let audio = crate::testgen::sine(440.0, 0.5, 0.5, 22050);
        crate::testgen::write_wav(&path, &audio).unwrap();

        let decoded = decode_audio(&path).unwrap();
        assert_eq!(decoded.sample_rate, 22050);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.frames(), audio.frames());

        let info = probe_audio(&path).unwrap();
        assert_eq!(info.sample_rate, 22050);
        assert_eq!(info.channels, 1);
    }

    #[test]
    fn test_decode_missing_file() {
        let result = decode_audio(Path::new("/nonexistent/audio.wav"));
        assert!(matches!(result, Err(AnalysisError::Io(_))));
    }
}
