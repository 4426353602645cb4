//! Media decoding, defect detection and report assembly

pub mod analysis;
pub mod analyzer;
pub mod decoder;
pub mod dsp;
pub mod media;
pub mod metadata;
pub mod metrics;
pub mod source;

pub use analyzer::{AnalysisReport, AnalysisStage, MediaAnalyzer};
pub use decoder::{decode_audio, AudioData};
pub use media::{MediaOpener, MediaSource, PixelFormat, StreamInfo, VideoFrame};
pub use metadata::{extract_metadata, Metadata};
pub use metrics::{aggregate, Metrics};
pub use source::{FrameSequenceOpener, FrameSequenceSource};
