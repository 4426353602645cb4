// src/core/analysis/glitch.rs
//
// Voice glitch heuristic: short stretches that are noisy (high zero-crossing
// rate) but quiet (low RMS), judged against per-file percentiles.

use super::{AudioCheck, AudioSignal};
use crate::core::dsp::{frames, group_indices, percentile, rms, zero_crossing_rate};
use crate::detection::{Issue, IssueKind, Severity};
use crate::error::{AnalysisError, Result};

pub struct GlitchDetector {
    frame_secs: f64,
    hop_secs: f64,
    zcr_percentile: f64,
    rms_percentile: f64,
    max_gap: usize,
    min_duration: f64,
}

impl Default for GlitchDetector {
    fn default() -> Self {
        Self {
            frame_secs: 0.025,
            hop_secs: 0.010,
            zcr_percentile: 95.0,
            rms_percentile: 20.0,
            max_gap: 2,
            min_duration: 0.05,
        }
    }
}

impl GlitchDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_framing(mut self, frame_secs: f64, hop_secs: f64) -> Self {
        self.frame_secs = frame_secs;
        self.hop_secs = hop_secs;
        self
    }

    pub fn with_percentiles(mut self, zcr: f64, rms: f64) -> Self {
        self.zcr_percentile = zcr;
        self.rms_percentile = rms;
        self
    }

    pub fn with_grouping(mut self, max_gap: usize, min_duration: f64) -> Self {
        self.max_gap = max_gap;
        self.min_duration = min_duration;
        self
    }

    fn error(message: impl Into<String>) -> AnalysisError {
        AnalysisError::AudioCheck {
            check: "voice_glitch",
            message: message.into(),
        }
    }

    /// Indices of analysis frames that look like glitches
    pub fn flagged_frames(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<usize>> {
        let frame_len = (self.frame_secs * sample_rate as f64) as usize;
        let hop = (self.hop_secs * sample_rate as f64) as usize;

        if frame_len == 0 || hop == 0 {
            return Err(Self::error("analysis frame is shorter than one sample"));
        }

        let (zcr, energy): (Vec<f64>, Vec<f64>) = frames(samples, frame_len, hop)
            .map(|frame| (zero_crossing_rate(frame), rms(frame)))
            .unzip();

        let (Some(zcr_cutoff), Some(rms_cutoff)) = (
            percentile(&zcr, self.zcr_percentile),
            percentile(&energy, self.rms_percentile),
        ) else {
            return Err(Self::error("signal is shorter than one analysis frame"));
        };

        Ok(zcr
            .iter()
            .zip(energy.iter())
            .enumerate()
            .filter(|&(_, (&z, &e))| z > zcr_cutoff && e < rms_cutoff)
            .map(|(i, _)| i)
            .collect())
    }
}

impl AudioCheck for GlitchDetector {
    fn name(&self) -> &'static str {
        "voice_glitch"
    }

    fn run(&self, signal: &AudioSignal) -> Result<Vec<Issue>> {
        let sr = signal.sample_rate() as f64;
        let hop = (self.hop_secs * sr) as usize;
        let flagged = self.flagged_frames(signal.mono(), signal.sample_rate())?;

        let issues = group_indices(&flagged, self.max_gap)
            .into_iter()
            .filter_map(|(first, last)| {
                let duration = (last - first + 1) as f64 * hop as f64 / sr;
                (duration > self.min_duration).then(|| {
                    Issue::new(
                        IssueKind::VoiceGlitch,
                        first as f64 * hop as f64 / sr,
                        duration,
                        Severity::Medium,
                        format!("Potential voice glitch detected ({:.2} seconds)", duration),
                    )
                })
            })
            .collect();

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// 200 Hz tone at 16 kHz with a 60 ms burst of quiet alternating noise at 1 s.
    /// The hop is a whole number of tone periods so every tone frame is alike.
    fn tone_with_burst() -> Vec<f32> {
        let sr = 16000.0;
        let mut samples: Vec<f32> = (0..32000)
            .map(|i| (0.5 * (2.0 * PI * 200.0 * i as f64 / sr + 0.3).sin()) as f32)
            .collect();

        for (k, sample) in samples[16000..16960].iter_mut().enumerate() {
            *sample = if k % 2 == 0 { 0.001 } else { -0.001 };
        }
        samples
    }

    #[test]
    fn test_burst_is_one_glitch() {
        let signal = AudioSignal::mono_only(tone_with_burst(), 16000);
        let issues = GlitchDetector::new().run(&signal).unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::VoiceGlitch);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert!(issues[0].timestamp >= 0.9 && issues[0].timestamp <= 1.0);
        assert!(issues[0].duration > 0.05);
    }

    #[test]
    fn test_steady_tone_has_no_glitch() {
        let samples: Vec<f32> = (0..32000)
            .map(|i| (0.5 * (2.0 * PI * 200.0 * i as f64 / 16000.0 + 0.3).sin()) as f32)
            .collect();
        let signal = AudioSignal::mono_only(samples, 16000);
        assert!(GlitchDetector::new().run(&signal).unwrap().is_empty());
    }

    #[test]
    fn test_silence_has_no_glitch() {
        let signal = AudioSignal::mono_only(vec![0.0; 44100], 44100);
        assert!(GlitchDetector::new().run(&signal).unwrap().is_empty());
    }

    #[test]
    fn test_too_short_signal_is_an_error() {
        let signal = AudioSignal::mono_only(vec![0.1; 100], 44100);
        assert!(matches!(
            GlitchDetector::new().run(&signal),
            Err(AnalysisError::AudioCheck { check: "voice_glitch", .. })
        ));
    }
}
