// src/core/analysis/stereo.rs
//
// Stereo field analysis for detecting duplicated mono content

use super::{AudioCheck, AudioSignal};
use crate::core::dsp::pearson_correlation;
use crate::detection::{Issue, IssueKind, Severity};
use crate::error::Result;

pub struct MonoInStereoDetector {
    correlation_threshold: f64,
}

impl Default for MonoInStereoDetector {
    fn default() -> Self {
        Self {
            correlation_threshold: 0.99,
        }
    }
}

impl MonoInStereoDetector {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = threshold;
        self
    }
}

impl AudioCheck for MonoInStereoDetector {
    fn name(&self) -> &'static str {
        "mono_in_stereo"
    }

    fn run(&self, signal: &AudioSignal) -> Result<Vec<Issue>> {
        let Some((left, right)) = signal.stereo() else {
            return Ok(Vec::new());
        };

        // Undefined when either channel is constant
        let correlation = pearson_correlation(left, right);
        log::debug!("Stereo correlation {:?}", correlation);

        match correlation {
            Some(c) if c > self.correlation_threshold => Ok(vec![Issue::new(
                IssueKind::MonoInStereo,
                0.0,
                signal.duration(),
                Severity::Low,
                format!("Stereo channels are nearly identical (correlation: {:.3})", c),
            )]),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decoder::AudioData;

    fn interleave(left: &[f32], right: &[f32]) -> Vec<f32> {
        left.iter().zip(right).flat_map(|(&l, &r)| [l, r]).collect()
    }

    #[test]
    fn test_duplicated_channels() {
        let left: Vec<f32> = (0..4800).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let audio = AudioData::new(interleave(&left, &left), 48000, 2);
        let signal = AudioSignal::from_audio(&audio).unwrap();

        let issues = MonoInStereoDetector::default().run(&signal).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MonoInStereo);
        assert_eq!(issues[0].severity, Severity::Low);
    }

    #[test]
    fn test_independent_channels() {
        let left: Vec<f32> = (0..4800).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let right: Vec<f32> = (0..4800).map(|i| (i as f32 * 0.173).cos() * 0.5).collect();
        let audio = AudioData::new(interleave(&left, &right), 48000, 2);
        let signal = AudioSignal::from_audio(&audio).unwrap();

        assert!(MonoInStereoDetector::default().run(&signal).unwrap().is_empty());
    }

    #[test]
    fn test_silent_stereo_is_not_flagged() {
        let audio = AudioData::new(vec![0.0; 9600], 48000, 2);
        let signal = AudioSignal::from_audio(&audio).unwrap();
        assert!(MonoInStereoDetector::default().run(&signal).unwrap().is_empty());
    }

    #[test]
    fn test_mono_source_is_skipped() {
        let signal = AudioSignal::mono_only(vec![0.3; 100], 1000);
        assert!(MonoInStereoDetector::default().run(&signal).unwrap().is_empty());
    }

    #[test]
    fn test_constant_channel_is_skipped() {
        let left: Vec<f32> = (0..4800).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let audio = AudioData::new(interleave(&left, &vec![0.25; 4800]), 48000, 2);
        let signal = AudioSignal::from_audio(&audio).unwrap();
        assert!(MonoInStereoDetector::default().run(&signal).unwrap().is_empty());
    }
}
