// src/core/analysis/silence.rs
//
// Silence detection: runs of samples below a dBFS floor

use super::{AudioCheck, AudioSignal};
use crate::core::dsp::{amplitude_to_db, find_runs};
use crate::detection::{Issue, IssueKind, Severity};
use crate::error::Result;

pub struct SilenceDetector {
    threshold_db: f64,
    min_duration: f64,
    medium_duration: f64,
}

impl Default for SilenceDetector {
    fn default() -> Self {
        Self {
            threshold_db: -40.0,
            min_duration: 1.0,
            medium_duration: 3.0,
        }
    }
}

impl SilenceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold_db: f64) -> Self {
        self.threshold_db = threshold_db;
        self
    }

    pub fn with_min_duration(mut self, secs: f64) -> Self {
        self.min_duration = secs;
        self
    }

    pub fn with_medium_duration(mut self, secs: f64) -> Self {
        self.medium_duration = secs;
        self
    }

    /// Silent regions as half-open sample ranges, before the duration filter
    pub fn silent_regions(&self, samples: &[f32]) -> Vec<(usize, usize)> {
        find_runs(
            samples
                .iter()
                .map(|&s| amplitude_to_db(s as f64) < self.threshold_db),
        )
    }
}

impl AudioCheck for SilenceDetector {
    fn name(&self) -> &'static str {
        "silence"
    }

    fn run(&self, signal: &AudioSignal) -> Result<Vec<Issue>> {
        let sr = signal.sample_rate() as f64;

        let issues = self
            .silent_regions(signal.mono())
            .into_iter()
            .map(|(start, end)| (start as f64 / sr, (end - start) as f64 / sr))
            .filter(|&(_, duration)| duration >= self.min_duration)
            .map(|(timestamp, duration)| {
                let severity = if duration < self.medium_duration {
                    Severity::Low
                } else {
                    Severity::Medium
                };
                Issue::new(
                    IssueKind::Silence,
                    timestamp,
                    duration,
                    severity,
                    format!("Silence detected for {:.1} seconds", duration),
                )
            })
            .collect();

        Ok(issues)
    }
}
