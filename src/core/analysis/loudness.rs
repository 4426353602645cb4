// src/core/analysis/loudness.rs
//
// Integrated loudness compared against a target band

use super::{AudioCheck, AudioSignal};
use crate::detection::{Issue, IssueKind, Severity};
use crate::error::{AnalysisError, Result};

pub struct LoudnessDetector {
    min_lufs: f64,
    max_lufs: f64,
}

impl Default for LoudnessDetector {
    fn default() -> Self {
        Self {
            min_lufs: -28.0,
            max_lufs: -12.0,
        }
    }
}

impl LoudnessDetector {
    pub fn with_target_band(mut self, min_lufs: f64, max_lufs: f64) -> Self {
        self.min_lufs = min_lufs;
        self.max_lufs = max_lufs;
        self
    }
}

impl AudioCheck for LoudnessDetector {
    fn name(&self) -> &'static str {
        "loudness"
    }

    fn run(&self, signal: &AudioSignal) -> Result<Vec<Issue>> {
        let lufs = signal.integrated_lufs().ok_or(AnalysisError::AudioCheck {
            check: "loudness",
            message: "signal is shorter than one gating block".to_string(),
        })?;

        // Silence has no defined loudness; the silence check reports it
        if !lufs.is_finite() {
            return Ok(Vec::new());
        }

        let (kind, description) = if lufs < self.min_lufs {
            (IssueKind::LowLoudness, format!("Audio too quiet: {:.1} LUFS", lufs))
        } else if lufs > self.max_lufs {
            (IssueKind::HighLoudness, format!("Audio too loud: {:.1} LUFS", lufs))
        } else {
            return Ok(Vec::new());
        };

        Ok(vec![Issue::new(
            kind,
            0.0,
            signal.duration(),
            Severity::Medium,
            description,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(amplitude: f64) -> AudioSignal {
        let samples = (0..44100 * 3)
            .map(|i| (amplitude * (2.0 * PI * 1000.0 * i as f64 / 44100.0).sin()) as f32)
            .collect();
        AudioSignal::mono_only(samples, 44100)
    }

    #[test]
    fn test_quiet_tone() {
        // About -43 LUFS
        let issues = LoudnessDetector::default().run(&tone(0.01)).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::LowLoudness);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert!((issues[0].duration - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_loud_tone() {
        // About -3 LUFS
        let issues = LoudnessDetector::default().run(&tone(1.0)).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::HighLoudness);
    }

    #[test]
    fn test_tone_inside_band() {
        // About -20 LUFS
        let issues = LoudnessDetector::default().run(&tone(0.14)).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_silence_is_skipped() {
        let signal = AudioSignal::mono_only(vec![0.0; 44100 * 2], 44100);
        assert!(LoudnessDetector::default().run(&signal).unwrap().is_empty());
    }

    #[test]
    fn test_short_signal_is_an_error() {
        let signal = AudioSignal::mono_only(vec![0.2; 100], 44100);
        assert!(LoudnessDetector::default().run(&signal).is_err());
    }
}
