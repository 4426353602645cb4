//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

use crate::config::{AnalysisConfig, ProfilePreset};

#[derive(Parser, Debug)]
#[command(name = "mediaqa")]
#[command(version, about = "Automated technical quality checks for video and audio media")]
pub struct Args {
    /// Frame directory (still frames plus an optional audio file)
    pub input: PathBuf,

    /// Frame rate of the frame sequence
    #[arg(long, default_value_t = 25.0)]
    pub fps: f64,

    /// Threshold preset (standard, sensitive)
    #[arg(short, long, env = "MEDIAQA_PROFILE")]
    pub profile: Option<String>,

    /// JSON config file with analysis and service settings
    #[arg(short, long, env = "MEDIAQA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Remove the input once the analysis has finished
    #[arg(long)]
    pub delete_source: bool,

    /// List available profiles and exit
    #[arg(long)]
    pub list_profiles: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Analysis settings: an explicit profile wins over the config file
    pub fn analysis_config(&self, from_file: AnalysisConfig) -> Result<AnalysisConfig, String> {
        match &self.profile {
            Some(name) => ProfilePreset::from_name(name)
                .map(AnalysisConfig::from_preset)
                .ok_or_else(|| format!("Unknown profile: {}", name)),
            None => Ok(from_file),
        }
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}
