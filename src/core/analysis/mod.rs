//! Defect detectors for decoded video frames and audio samples

pub mod audio;
pub mod clipping_detection;
pub mod dc_offset;
pub mod glitch;
pub mod loudness;
pub mod silence;
pub mod stereo;
pub mod video;

use std::sync::OnceLock;

use super::decoder::{extract_mono, extract_stereo, AudioData};
use super::dsp::integrated_loudness;
use crate::detection::Issue;
use crate::error::{AnalysisError, Result};

pub use audio::{AudioDetector, AudioReport};
pub use clipping_detection::ClippingDetector;
pub use dc_offset::DcOffsetDetector;
pub use glitch::GlitchDetector;
pub use loudness::LoudnessDetector;
pub use silence::SilenceDetector;
pub use stereo::MonoInStereoDetector;
pub use video::{VideoDetector, VideoReport};

/// Decoded audio prepared for the individual checks
#[derive(Debug)]
pub struct AudioSignal {
    mono: Vec<f32>,
    stereo: Option<(Vec<f32>, Vec<f32>)>,
    sample_rate: u32,
    loudness: OnceLock<Option<f64>>,
}

impl AudioSignal {
    /// Down-mix and split a decoded buffer; empty or rate-less audio is rejected
    pub fn from_audio(audio: &AudioData) -> Result<Self> {
        if audio.sample_rate == 0 {
            return Err(AnalysisError::AudioDecode("sample rate is zero".to_string()));
        }
        if audio.frames() == 0 {
            return Err(AnalysisError::AudioDecode("audio stream is empty".to_string()));
        }

        Ok(Self {
            mono: extract_mono(audio),
            stereo: extract_stereo(audio),
            sample_rate: audio.sample_rate,
            loudness: OnceLock::new(),
        })
    }

    pub fn mono_only(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            mono: samples,
            stereo: None,
            sample_rate,
            loudness: OnceLock::new(),
        }
    }

    pub fn mono(&self) -> &[f32] {
        &self.mono
    }

    pub fn stereo(&self) -> Option<(&[f32], &[f32])> {
        self.stereo
            .as_ref()
            .map(|(l, r)| (l.as_slice(), r.as_slice()))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        self.mono.len() as f64 / self.sample_rate.max(1) as f64
    }

    /// Integrated loudness of the mono mix, measured once and cached.
    ///
    /// `None` when the signal is too short to gate; negative infinity for silence.
    pub fn integrated_lufs(&self) -> Option<f64> {
        *self
            .loudness
            .get_or_init(|| integrated_loudness(&self.mono, self.sample_rate))
    }
}

/// One independent audio heuristic
pub trait AudioCheck: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run the check; an error skips only this check
    fn run(&self, signal: &AudioSignal) -> Result<Vec<Issue>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_from_stereo_audio() {
        let audio = AudioData::new(vec![0.2, 0.4, -0.2, -0.4], 8000, 2);
        let signal = AudioSignal::from_audio(&audio).unwrap();

        assert_eq!(signal.mono().len(), 2);
        assert!((signal.mono()[0] - 0.3).abs() < 1e-6);
        let (left, right) = signal.stereo().unwrap();
        assert_eq!(left, &[0.2, -0.2]);
        assert_eq!(right, &[0.4, -0.4]);
        assert!((signal.duration() - 0.00025).abs() < 1e-12);
    }

    #[test]
    fn test_empty_audio_is_rejected() {
        let audio = AudioData::new(Vec::new(), 44100, 1);
        assert!(matches!(
            AudioSignal::from_audio(&audio),
            Err(AnalysisError::AudioDecode(_))
        ));
    }
}
