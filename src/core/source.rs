// src/core/source.rs
//
// Media source backed by a directory of still frames plus an optional
// audio file, as produced by `ffmpeg -i in.mp4 frames/%06d.png`.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use super::decoder::{decode_audio, probe_audio, AudioData};
use super::media::{no_audio_stream, MediaOpener, MediaSource, StreamInfo, VideoFrame};
use crate::error::{AnalysisError, Result};

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];
const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac", "mp3", "ogg", "m4a", "aac"];

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Frames ordered by file name, shown at a fixed rate
pub struct FrameSequenceSource {
    root: PathBuf,
    frames: Vec<PathBuf>,
    audio: Option<PathBuf>,
    fps: f64,
    total_size: u64,
}

impl FrameSequenceSource {
    /// Scan `dir` (not recursively) for frame images and the first audio file
    pub fn open(dir: &Path, fps: f64) -> Result<Self> {
        if !dir.is_dir() {
            return Err(AnalysisError::Decode(format!(
                "{} is not a frame directory",
                dir.display()
            )));
        }

        let mut frames = Vec::new();
        let mut audio_files = Vec::new();
        let mut total_size = 0u64;

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path().to_path_buf();
            let Some(ext) = extension_of(&path) else {
                continue;
            };

            if FRAME_EXTENSIONS.contains(&ext.as_str()) {
                total_size += entry.metadata().map(|m| m.len()).unwrap_or(0);
                frames.push(path);
            } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
                total_size += entry.metadata().map(|m| m.len()).unwrap_or(0);
                audio_files.push(path);
            }
        }

        frames.sort();
        audio_files.sort();

        if audio_files.len() > 1 {
            warn!(
                "{} audio files in {}, using {}",
                audio_files.len(),
                dir.display(),
                audio_files[0].display()
            );
        }

        debug!(
            "Frame sequence {}: {} frame(s), audio: {}",
            dir.display(),
            frames.len(),
            !audio_files.is_empty()
        );

        Ok(Self {
            root: dir.to_path_buf(),
            frames,
            audio: audio_files.into_iter().next(),
            fps,
            total_size,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame_index(&self, timestamp: f64) -> usize {
        let index = (timestamp.max(0.0) * self.fps).floor() as usize;
        index.min(self.frames.len().saturating_sub(1))
    }
}

impl MediaSource for FrameSequenceSource {
    fn probe(&self) -> Result<StreamInfo> {
        let first = self.frames.first().ok_or_else(|| {
            AnalysisError::Decode(format!("no frames found in {}", self.root.display()))
        })?;
        let (width, height) = image::image_dimensions(first)?;

        let audio_info = match &self.audio {
            Some(path) => match probe_audio(path) {
                Ok(info) => Some(info),
                Err(e) => {
                    warn!("Could not probe {}: {}", path.display(), e);
                    None
                }
            },
            None => None,
        };

        Ok(StreamInfo {
            duration: self.frames.len() as f64 / self.fps,
            fps: self.fps,
            width,
            height,
            has_audio: self.audio.is_some(),
            video_codec: extension_of(first).unwrap_or_default(),
            audio_codec: audio_info.as_ref().map(|i| i.codec_name.clone()),
            audio_sample_rate: audio_info.map(|i| i.sample_rate),
            file_size: self.total_size,
        })
    }

    fn frame_at(&mut self, timestamp: f64) -> Result<VideoFrame> {
        let path = self
            .frames
            .get(self.frame_index(timestamp))
            .ok_or_else(|| AnalysisError::Frame {
                timestamp,
                message: "sequence has no frames".to_string(),
            })?;

        let luma = image::open(path)?.to_luma8();
        let (width, height) = luma.dimensions();
        Ok(VideoFrame::luma(width, height, luma.into_raw()))
    }

    fn audio(&mut self) -> Result<AudioData> {
        match &self.audio {
            Some(path) => decode_audio(path),
            None => Err(no_audio_stream()),
        }
    }
}

/// Opens every source path as a [`FrameSequenceSource`] at a fixed rate
#[derive(Debug, Clone)]
pub struct FrameSequenceOpener {
    fps: f64,
}

impl FrameSequenceOpener {
    pub fn new(fps: f64) -> Self {
        Self { fps }
    }
}

impl MediaOpener for FrameSequenceOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn MediaSource>> {
        Ok(Box::new(FrameSequenceSource::open(path, self.fps)?))
    }
}
