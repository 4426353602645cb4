//! Decoded-media handle consumed by the analysis engine
//!
//! Container demuxing and codec decoding live behind [`MediaSource`]; the
//! detectors only ever see raw frames and float samples.

use rayon::prelude::*;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use super::decoder::AudioData;
use crate::error::{AnalysisError, Result};

/// Stream parameters reported by a source before any decoding
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub duration: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub has_audio: bool,
    pub video_codec: String,
    pub audio_codec: Option<String>,
    pub audio_sample_rate: Option<u32>,
    /// Size of the source on disk in bytes
    pub file_size: u64,
}

/// Pixel layout of a decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Luma8,
    Rgb8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Luma8 => 1,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// A single decoded video frame, row-major
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl VideoFrame {
    pub fn luma(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Luma8,
            data,
        }
    }

    pub fn rgb(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgb8,
            data,
        }
    }

    /// Uniform grey frame
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self::luma(width, height, vec![value; (width * height) as usize])
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check that the buffer matches the declared geometry
    pub fn validate(&self) -> std::result::Result<(), String> {
        let expected = self.pixel_count() * self.format.bytes_per_pixel();
        if self.pixel_count() == 0 {
            return Err("frame has no pixels".to_string());
        }
        if self.data.len() != expected {
            return Err(format!(
                "frame buffer holds {} bytes, expected {} for {}x{}",
                self.data.len(),
                expected,
                self.width,
                self.height
            ));
        }
        Ok(())
    }

    /// Single-channel luminance plane (BT.601 weights for RGB input)
    pub fn to_luma(&self) -> Cow<'_, [u8]> {
        match self.format {
            PixelFormat::Luma8 => Cow::Borrowed(&self.data),
            PixelFormat::Rgb8 => Cow::Owned(
                self.data
                    .par_chunks_exact(3)
                    .map(|px| {
                        let y = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
                        y.round().clamp(0.0, 255.0) as u8
                    })
                    .collect(),
            ),
        }
    }
}

/// Decoded-media handle for one source
pub trait MediaSource: Send {
    /// Probe stream parameters without decoding content
    fn probe(&self) -> Result<StreamInfo>;

    /// Decode the frame shown at `timestamp` seconds
    fn frame_at(&mut self, timestamp: f64) -> Result<VideoFrame>;

    /// Materialize the complete audio signal
    fn audio(&mut self) -> Result<AudioData>;
}

/// Opens a [`MediaSource`] for a source path
pub trait MediaOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn MediaSource>>;
}

impl<T: MediaOpener + ?Sized> MediaOpener for Arc<T> {
    fn open(&self, path: &Path) -> Result<Box<dyn MediaSource>> {
        (**self).open(path)
    }
}

/// Convenience for sources without an audio stream
pub fn no_audio_stream() -> AnalysisError {
    AnalysisError::AudioDecode("source has no audio stream".to_string())
}
