//! Configuration module for mediaqa

mod profiles;
mod service;

pub use profiles::{
    AnalysisConfig, AudioThresholds, ClippingMode, FrozenMetric, ProfileBuilder, ProfilePreset,
    VideoThresholds,
};
pub use service::{default_config_path, load_config, resolve_config, FileConfig, ServiceConfig};
