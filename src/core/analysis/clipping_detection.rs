//! Clipping detection analysis
//!
//! Flags samples at or above a near-unity threshold, either as individual
//! runs or as one file-level percentage.

use super::{AudioCheck, AudioSignal};
use crate::config::ClippingMode;
use crate::core::dsp::find_runs;
use crate::detection::{Issue, IssueKind, Severity};
use crate::error::Result;

/// Clipping detection analyzer
pub struct ClippingDetector {
    mode: ClippingMode,
}

impl Default for ClippingDetector {
    fn default() -> Self {
        Self {
            mode: ClippingMode::Spans { threshold: 0.99 },
        }
    }
}

impl ClippingDetector {
    pub fn new(mode: ClippingMode) -> Self {
        Self { mode }
    }

    /// Contiguous clipped regions as half-open sample ranges
    pub fn clipped_regions(&self, samples: &[f32]) -> Vec<(usize, usize)> {
        let threshold = self.mode.threshold();
        find_runs(samples.iter().map(|s| s.abs() >= threshold))
    }

    fn span_issues(&self, samples: &[f32], sample_rate: u32) -> Vec<Issue> {
        let sr = sample_rate as f64;

        self.clipped_regions(samples)
            .into_iter()
            .map(|(start, end)| {
                let duration = (end - start) as f64 / sr;
                Issue::new(
                    IssueKind::Clipping,
                    start as f64 / sr,
                    duration,
                    Severity::High,
                    format!("Audio clipping detected for {:.3} seconds", duration),
                )
            })
            .collect()
    }

    fn percentage_issue(
        &self,
        samples: &[f32],
        sample_rate: u32,
        report_above: f64,
        high_above: f64,
    ) -> Option<Issue> {
        let threshold = self.mode.threshold();
        let first = samples.iter().position(|s| s.abs() >= threshold)?;
        let clipped = samples.iter().filter(|s| s.abs() >= threshold).count();
        let percent = clipped as f64 / samples.len() as f64 * 100.0;

        if percent <= report_above {
            return None;
        }

        let severity = if percent > high_above {
            Severity::High
        } else {
            Severity::Medium
        };

        Some(Issue::new(
            IssueKind::Clipping,
            first as f64 / sample_rate as f64,
            clipped as f64 / sample_rate as f64,
            severity,
            format!("Audio clipping detected ({:.2}% of samples)", percent),
        ))
    }
}

impl AudioCheck for ClippingDetector {
    fn name(&self) -> &'static str {
        "clipping"
    }

    fn run(&self, signal: &AudioSignal) -> Result<Vec<Issue>> {
        let samples = signal.mono();

        let issues = match self.mode {
            ClippingMode::Spans { .. } => self.span_issues(samples, signal.sample_rate()),
            ClippingMode::Percentage {
                report_above_percent,
                high_above_percent,
                ..
            } => self
                .percentage_issue(
                    samples,
                    signal.sample_rate(),
                    report_above_percent,
                    high_above_percent,
                )
                .into_iter()
                .collect(),
        };

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(samples: Vec<f32>, sample_rate: u32) -> AudioSignal {
        AudioSignal::mono_only(samples, sample_rate)
    }

    #[test]
    fn test_one_issue_per_run() {
        let mut samples = vec![0.1f32; 1000];
        samples[100..150].fill(1.0);
        samples[500..501].fill(-0.995);
        samples[900..1000].fill(0.99);

        let issues = ClippingDetector::default().run(&signal(samples, 100)).unwrap();

        assert_eq!(issues.len(), 3);
        assert!((issues[0].timestamp - 1.0).abs() < 1e-9);
        assert!((issues[0].duration - 0.5).abs() < 1e-9);
        assert!((issues[1].duration - 0.01).abs() < 1e-9);
        assert!((issues[2].timestamp - 9.0).abs() < 1e-9);
        assert!(issues.iter().all(|i| i.severity == Severity::High));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let detector = ClippingDetector::default();
        assert_eq!(detector.clipped_regions(&[0.98, 0.99, 0.989]), vec![(1, 2)]);
    }

    #[test]
    fn test_clean_signal() {
        let samples: Vec<f32> = (0..4410).map(|i| 0.5 * (i as f32 * 0.06).sin()).collect();
        let issues = ClippingDetector::default().run(&signal(samples, 44100)).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_percentage_mode() {
        let mode = ClippingMode::Percentage {
            threshold: 0.95,
            report_above_percent: 0.01,
            high_above_percent: 0.5,
        };

        let mut samples = vec![0.2f32; 10_000];
        samples[1000..1010].fill(0.96);
        let issues = ClippingDetector::new(mode).run(&signal(samples.clone(), 1000)).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert!((issues[0].timestamp - 1.0).abs() < 1e-9);

        samples[2000..2100].fill(-1.0);
        let issues = ClippingDetector::new(mode).run(&signal(samples, 1000)).unwrap();
        assert_eq!(issues[0].severity, Severity::High);
    }

    #[test]
    fn test_percentage_mode_ignores_stray_samples() {
        let mode = ClippingMode::Percentage {
            threshold: 0.95,
            report_above_percent: 0.01,
            high_above_percent: 0.5,
        };

        let mut samples = vec![0.2f32; 100_000];
        samples[10] = 1.0;
        let issues = ClippingDetector::new(mode).run(&signal(samples, 1000)).unwrap();
        assert!(issues.is_empty());
    }
}
