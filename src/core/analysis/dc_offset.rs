// src/core/analysis/dc_offset.rs
//
// DC offset: a constant bias in the mono mix

use super::{AudioCheck, AudioSignal};
use crate::core::dsp::mean;
use crate::detection::{Issue, IssueKind, Severity};
use crate::error::Result;

pub struct DcOffsetDetector {
    threshold: f64,
}

impl Default for DcOffsetDetector {
    fn default() -> Self {
        Self { threshold: 0.01 }
    }
}

impl DcOffsetDetector {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

impl AudioCheck for DcOffsetDetector {
    fn name(&self) -> &'static str {
        "dc_offset"
    }

    fn run(&self, signal: &AudioSignal) -> Result<Vec<Issue>> {
        let offset = mean(signal.mono());

        if offset.abs() <= self.threshold {
            return Ok(Vec::new());
        }

        Ok(vec![Issue::new(
            IssueKind::DcOffset,
            0.0,
            signal.duration(),
            Severity::Low,
            format!("DC offset detected (mean: {:.4})", offset),
        )])
    }
}
