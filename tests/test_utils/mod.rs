// tests/test_utils/mod.rs
//
// Shared helpers for the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use futures::StreamExt;
use mediaqa::config::{AnalysisConfig, ServiceConfig};
use mediaqa::jobs::{JobStatus, MemoryStore, Orchestrator};
use mediaqa::testgen::{self, SyntheticMedia, SyntheticOpener};

pub type TestOrchestrator = Orchestrator<Arc<MemoryStore>, Arc<SyntheticOpener>>;

/// Service settings with a fast poll loop
pub fn fast_service() -> ServiceConfig {
    ServiceConfig {
        poll_interval_ms: 10,
        stream_timeout_secs: 60,
        ..ServiceConfig::default()
    }
}

pub struct Harness {
    pub orchestrator: TestOrchestrator,
    pub store: Arc<MemoryStore>,
    pub opener: Arc<SyntheticOpener>,
    pub dir: tempfile::TempDir,
}

impl Harness {
    pub fn new(service: ServiceConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let opener = Arc::new(SyntheticOpener::new());
        let orchestrator = Orchestrator::new(
            Arc::clone(&store),
            Arc::clone(&opener),
            AnalysisConfig::default(),
            service,
        );

        Self {
            orchestrator,
            store,
            opener,
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Create a placeholder upload on disk and register the media behind it
    pub fn upload(&self, name: &str, media: SyntheticMedia) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, b"placeholder").expect("Failed to write upload");
        self.opener.register(&path, media);
        path
    }

    /// Follow the status stream to the end
    pub async fn follow(&self, job_id: &str) -> Vec<JobStatus> {
        self.orchestrator.stream_status(job_id).collect().await
    }
}

/// Ten seconds of clean 1080p video with a steady tone
pub fn clean_media() -> SyntheticMedia {
    SyntheticMedia::new(10.0, 30.0, 1920, 1080).with_audio(testgen::sine(200.0, 0.1, 10.0, 16000))
}

/// Write a frame directory: numbered grey PNGs and an optional WAV
pub fn write_frame_dir(dir: &Path, levels: &[u8], with_audio: bool) {
    fs::create_dir_all(dir).expect("Failed to create frame dir");
    for (i, &level) in levels.iter().enumerate() {
        image::GrayImage::from_pixel(48, 27, image::Luma([level]))
            .save(dir.join(format!("frame_{:05}.png", i)))
            .expect("Failed to write frame");
    }
    if with_audio {
        let seconds = levels.len() as f64;
        testgen::write_wav(&dir.join("audio.wav"), &testgen::sine(200.0, 0.1, seconds, 16000))
            .expect("Failed to write audio");
    }
}

pub fn run_mediaqa<P: AsRef<std::ffi::OsStr>>(input: P) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mediaqa"));
    cmd.arg(input);
    cmd
}
