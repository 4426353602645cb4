// src/core/analysis/audio.rs
//
// Audio defect detector: runs the independent checks over the decoded
// signal and merges their issues in timestamp order.

use log::{debug, warn};
use rayon::prelude::*;

use super::{
    AudioCheck, AudioSignal, ClippingDetector, DcOffsetDetector, GlitchDetector,
    LoudnessDetector, MonoInStereoDetector, SilenceDetector,
};
use crate::config::AudioThresholds;
use crate::core::decoder::AudioData;
use crate::detection::{sort_by_timestamp, Issue, IssueKind, Severity};
use crate::error::Result;

/// Output of the audio stage
#[derive(Debug, Default)]
pub struct AudioReport {
    pub issues: Vec<Issue>,
    /// Prepared signal, kept for the metric aggregator
    pub signal: Option<AudioSignal>,
}

impl AudioReport {
    /// Report for media without an audio stream
    pub fn no_audio(media_duration: f64) -> Self {
        Self {
            issues: vec![Issue::new(
                IssueKind::NoAudio,
                0.0,
                media_duration,
                Severity::Medium,
                "No audio track detected in video file",
            )],
            signal: None,
        }
    }

    /// Report for an audio stream that could not be decoded at all
    pub fn analysis_failed(message: impl std::fmt::Display) -> Self {
        Self {
            issues: vec![Issue::new(
                IssueKind::AudioAnalysisError,
                0.0,
                0.0,
                Severity::High,
                format!("Audio analysis failed: {}", message),
            )],
            signal: None,
        }
    }
}

pub struct AudioDetector {
    checks: Vec<Box<dyn AudioCheck>>,
    parallel: bool,
}

impl AudioDetector {
    pub fn new(config: &AudioThresholds) -> Self {
        let checks: Vec<Box<dyn AudioCheck>> = vec![
            Box::new(
                LoudnessDetector::default()
                    .with_target_band(config.loudness_min_lufs, config.loudness_max_lufs),
            ),
            Box::new(ClippingDetector::new(config.clipping)),
            Box::new(
                SilenceDetector::new()
                    .with_threshold(config.silence_threshold_db)
                    .with_min_duration(config.silence_min_secs)
                    .with_medium_duration(config.silence_medium_secs),
            ),
            Box::new(DcOffsetDetector::default().with_threshold(config.dc_offset_threshold)),
            Box::new(
                MonoInStereoDetector::default()
                    .with_threshold(config.stereo_correlation_threshold),
            ),
            Box::new(
                GlitchDetector::new()
                    .with_framing(config.glitch_frame_secs, config.glitch_hop_secs)
                    .with_percentiles(config.glitch_zcr_percentile, config.glitch_rms_percentile)
                    .with_grouping(config.glitch_max_gap, config.glitch_min_secs),
            ),
        ];

        Self {
            checks,
            parallel: config.parallel_checks,
        }
    }

    /// Run every check on decoded audio.
    ///
    /// Fails only when the audio cannot be turned into a usable signal; a
    /// failing individual check is logged and skipped.
    pub fn analyze(&self, audio: &AudioData) -> Result<AudioReport> {
        let signal = AudioSignal::from_audio(audio)?;

        debug!(
            "Audio: {} samples @ {} Hz, {} channel(s)",
            signal.mono().len(),
            signal.sample_rate(),
            audio.channels
        );

        let outcomes: Vec<_> = if self.parallel {
            self.checks
                .par_iter()
                .map(|check| (check.name(), check.run(&signal)))
                .collect()
        } else {
            self.checks
                .iter()
                .map(|check| (check.name(), check.run(&signal)))
                .collect()
        };

        let mut issues = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(found) => {
                    debug!("Check '{}' reported {} issue(s)", name, found.len());
                    issues.extend(found);
                }
                Err(e) => warn!("Skipping audio check '{}': {}", name, e),
            }
        }

        sort_by_timestamp(&mut issues);

        Ok(AudioReport {
            issues,
            signal: Some(signal),
        })
    }
}

impl Default for AudioDetector {
    fn default() -> Self {
        Self::new(&AudioThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_with_clip(secs: f64, sr: u32) -> AudioData {
        let mut samples: Vec<f32> = (0..(secs * sr as f64) as usize)
            .map(|i| 0.3 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sr as f32).sin())
            .collect();
        samples[2 * sr as usize..3 * sr as usize].fill(1.0);
        AudioData::new(samples, sr, 1)
    }

    #[test]
    fn test_silent_clip() {
        let audio = AudioData::new(vec![0.0; 441_000], 44100, 1);
        let report = AudioDetector::default().analyze(&audio).unwrap();

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::Silence);
        assert!(report.signal.unwrap().integrated_lufs().unwrap().is_infinite());
    }

    #[test]
    fn test_clipped_segment() {
        let report = AudioDetector::default()
            .analyze(&sine_with_clip(5.0, 44100))
            .unwrap();

        let clipping: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::Clipping)
            .collect();
        assert_eq!(clipping.len(), 1);
        assert!((clipping[0].timestamp - 2.0).abs() < 1e-9);
        assert!((clipping[0].duration - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let audio = sine_with_clip(5.0, 22050);

        let parallel = AudioDetector::new(&AudioThresholds::default())
            .analyze(&audio)
            .unwrap();
        let sequential = AudioDetector::new(&AudioThresholds {
            parallel_checks: false,
            ..Default::default()
        })
        .analyze(&audio)
        .unwrap();

        assert_eq!(parallel.issues, sequential.issues);
    }

    #[test]
    fn test_issues_are_sorted() {
        let mut audio = sine_with_clip(6.0, 8000);
        audio.samples[4 * 8000..6 * 8000].fill(0.0);

        let report = AudioDetector::default().analyze(&audio).unwrap();
        assert!(report
            .issues
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
        assert!(report.issues.iter().any(|i| i.kind == IssueKind::Silence));
    }

    #[test]
    fn test_short_audio_skips_failing_checks() {
        let audio = AudioData::new(vec![0.995; 200], 44100, 1);
        let report = AudioDetector::default().analyze(&audio).unwrap();

        // Loudness and glitch checks cannot run; clipping still does
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues.iter().any(|i| i.kind == IssueKind::Clipping));
        assert!(report.issues.iter().any(|i| i.kind == IssueKind::DcOffset));
    }

    #[test]
    fn test_fallback_reports() {
        let report = AudioReport::no_audio(12.0);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::NoAudio);
        assert_eq!(report.issues[0].duration, 12.0);

        let report = AudioReport::analysis_failed("bad codec");
        assert_eq!(report.issues[0].kind, IssueKind::AudioAnalysisError);
        assert_eq!(report.issues[0].severity, Severity::High);
    }
}
