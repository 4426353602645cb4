//! Output formatting for CLI results

use colorful::{Color, Colorful};
use serde::Serialize;

use crate::config::{AnalysisConfig, ProfilePreset};
use crate::detection::{format_timestamp, Issue, OverallStatus, Severity, Summary};
use crate::jobs::AnalysisResult;

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::LightBlue,
    }
}

fn status_line(status: OverallStatus) -> String {
    let text = format!("Status: {}", status);
    match status {
        OverallStatus::Pass => text.green().bold().to_string(),
        OverallStatus::Warning => text.yellow().bold().to_string(),
        OverallStatus::Fail | OverallStatus::Error => text.red().bold().to_string(),
    }
}

fn format_issue(issue: &Issue, verbose: bool) -> String {
    let color = severity_color(issue.severity);
    let mut line = format!(
        "    {} {} {}",
        issue.severity.symbol().color(color),
        format_timestamp(issue.timestamp).dim(),
        issue.description
    );

    if verbose {
        line.push_str(&format!(
            "\n      {}",
            format!(
                "{} | {} | {:.2}s | fix: {}",
                issue.kind, issue.severity, issue.duration, issue.suggested_fix
            )
            .dim()
        ));
    }

    line
}

fn format_issue_list(title: &str, issues: &[Issue], verbose: bool) -> String {
    let mut output = format!("\n  {} ({}):\n", title.bold(), issues.len());
    if issues.is_empty() {
        output.push_str(&format!("    {}\n", "none".dim()));
    }
    for issue in issues {
        output.push_str(&format_issue(issue, verbose));
        output.push('\n');
    }
    output
}

/// Format an analysis result for terminal output
pub fn format_result(result: &AnalysisResult, verbose: bool) -> String {
    let mut output = format!(
        "{}\n  {}\n",
        result.filename.clone().bold(),
        status_line(result.summary.status)
    );

    for point in &result.summary.points {
        output.push_str(&format!("    • {}\n", point));
    }

    output.push_str(&format_issue_list("Audio issues", &result.audio_issues, verbose));
    output.push_str(&format_issue_list("Video issues", &result.video_issues, verbose));

    if verbose {
        let m = &result.metrics;
        output.push_str(&format!("\n  {}\n", "Technical Details:".bold()));
        output.push_str(&format!("    Duration: {}\n", m.duration_formatted));
        output.push_str(&format!(
            "    Video: {} @ {:.2} fps ({}), aspect {:.2}\n",
            m.resolution, m.fps, m.video_codec, m.aspect_ratio
        ));
        output.push_str(&format!(
            "    Size: {:.2} MB, ~{:.0} kbps\n",
            m.file_size_mb, m.bitrate_estimate_kbps
        ));
        output.push_str(&format!(
            "    Loudness: {}, dynamic range: {}\n",
            m.integrated_lufs
                .map_or_else(|| "N/A".to_string(), |v| format!("{:.1} LUFS", v)),
            m.dynamic_range_db
                .map_or_else(|| "N/A".to_string(), |v| format!("{:.1} dB", v))
        ));
        output.push_str(&format!(
            "    Frames: {} analyzed, {} black, {} frozen\n",
            m.frames_analyzed, m.black_frames_detected, m.frozen_frames_detected
        ));
    }

    output
}

pub fn print_report(result: &AnalysisResult, verbose: bool) {
    println!("{}", format_result(result, verbose));
}

/// Pretty-printed JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format the summary of a job that ended in ERROR
pub fn format_failure(job_id: &str, summary: &Summary) -> String {
    let mut output = format!(
        "{} job {}\n  {}\n",
        "Analysis failed".red().bold(),
        job_id,
        status_line(summary.status)
    );
    for point in &summary.points {
        output.push_str(&format!("    • {}\n", point));
    }
    output
}

pub fn print_failure(job_id: &str, summary: &Summary) {
    eprint!("{}", format_failure(job_id, summary));
}

pub fn print_profiles() {
    println!("{}", "Available profiles:".bold());
    for preset in ProfilePreset::all() {
        let config = AnalysisConfig::from_preset(preset);
        println!(
            "  {:<10} black < {:.0}, frozen {:?}, clipping {:?}",
            config.name.to_lowercase(),
            config.video.black_threshold,
            config.video.frozen_metric,
            config.audio.clipping
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::aggregate;
    use crate::core::analysis::{AudioReport, VideoReport};
    use crate::core::Metadata;
    use crate::detection::{classify, IssueKind};

    fn result() -> AnalysisResult {
        let metadata = Metadata {
            duration: 5.0,
            fps: 25.0,
            width: 1280,
            height: 720,
            has_audio: false,
            video_codec: "png".to_string(),
            audio_codec: None,
            audio_sample_rate: None,
            file_size: 2048,
        };
        let audio = AudioReport::no_audio(5.0);
        let metrics = aggregate(&metadata, &audio, &VideoReport::default());
        let summary = classify(&audio.issues, &[], &metadata, &metrics);

        AnalysisResult {
            job_id: "job".to_string(),
            filename: "clip".to_string(),
            analysis_timestamp: chrono::Utc::now(),
            metadata,
            audio_issues: audio.issues,
            video_issues: Vec::new(),
            metrics,
            summary,
        }
    }

    #[test]
    fn test_format_result_lists_issues() {
        let text = format_result(&result(), false);
        assert!(text.contains("clip"));
        assert!(text.contains("No audio track detected in video file"));
        assert!(text.contains("00:00:00.000"));
        assert!(!text.contains("Technical Details"));
    }

    #[test]
    fn test_failure_lists_message() {
        let text = format_failure("job-7", &Summary::failed("Timeout"));
        assert!(text.contains("job-7"));
        assert!(text.contains("ERROR"));
        assert!(text.contains("Analysis failed: Timeout"));
    }

    #[test]
    fn test_verbose_adds_details() {
        let text = format_result(&result(), true);
        assert!(text.contains("Technical Details"));
        assert!(text.contains(IssueKind::NoAudio.as_str()));
        assert!(text.contains("Loudness: N/A"));
    }
}
