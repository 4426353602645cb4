// src/config/service.rs
//
// Job orchestration settings and config file loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::profiles::AnalysisConfig;

/// Settings for the job orchestrator and status streaming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// How long job status and results stay in the store
    pub retention_secs: u64,
    /// Delay between two snapshots of a status stream
    pub poll_interval_ms: u64,
    /// Upper bound on a status stream before it reports a timeout
    pub stream_timeout_secs: u64,
    /// Number of analyses allowed to run at the same time
    pub max_concurrent_jobs: usize,
    /// Wall-clock limit for a single analysis; 0 disables it
    pub job_time_limit_secs: u64,
    /// Remove the source media once a job reaches a terminal state
    pub delete_source: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            retention_secs: 3600,
            poll_interval_ms: 1000,
            stream_timeout_secs: 300,
            max_concurrent_jobs: 2,
            job_time_limit_secs: 1800,
            delete_source: true,
        }
    }
}

impl ServiceConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }

    pub fn job_time_limit(&self) -> Option<Duration> {
        (self.job_time_limit_secs > 0).then(|| Duration::from_secs(self.job_time_limit_secs))
    }
}

/// Contents of a `config.json` file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub analysis: AnalysisConfig,
    pub service: ServiceConfig,
}

/// Default location of the user config file, if the platform has one
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mediaqa").join("config.json"))
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Load the explicit config file, else the default one if it exists, else defaults
pub fn resolve_config(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            log::debug!("Loading config from {}", path.display());
            load_config(&path)
        }
        _ => Ok(FileConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_service_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.retention(), Duration::from_secs(3600));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.stream_timeout(), Duration::from_secs(300));
        assert_eq!(config.job_time_limit(), Some(Duration::from_secs(1800)));
        assert!(config.delete_source);
    }

    #[test]
    fn test_zero_time_limit_disables_it() {
        let config = ServiceConfig {
            job_time_limit_secs: 0,
            ..Default::default()
        };
        assert!(config.job_time_limit().is_none());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "service": {{"retention_secs": 60}},
                "analysis": {{"audio": {{"silence_min_secs": 2.5}}}}
            }}"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.service.retention_secs, 60);
        assert_eq!(config.service.poll_interval_ms, 1000);
        assert_eq!(config.analysis.audio.silence_min_secs, 2.5);
        assert_eq!(config.analysis.video.black_threshold, 8.0);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = load_config(Path::new("/nonexistent/mediaqa/config.json"));
        assert!(result.is_err());
    }
}
