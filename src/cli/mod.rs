// src/cli/mod.rs
//
// Command-line interface: runs one analysis job through the orchestrator
// and renders the result.

mod args;
mod output;

pub use args::{parse_args, Args};
pub use output::{
    format_failure, format_result, print_failure, print_json, print_profiles, print_report,
};

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::time::Duration;

use crate::config::resolve_config;
use crate::core::FrameSequenceOpener;
use crate::detection::Summary;
use crate::jobs::{JobState, MemoryStore, Orchestrator};

fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}% {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run the CLI to completion
pub async fn run(args: Args) -> Result<()> {
    if args.list_profiles {
        print_profiles();
        return Ok(());
    }

    if !args.input.exists() {
        bail!("Input not found: {}", args.input.display());
    }

    let file_config = resolve_config(args.config.as_deref())?;
    let analysis = args
        .analysis_config(file_config.analysis)
        .map_err(anyhow::Error::msg)?;
    let mut service = file_config.service;
    // The CLI never removes its input unless asked to
    service.delete_source = args.delete_source;

    debug!("Using profile '{}'", analysis.name);

    let orchestrator = Orchestrator::new(
        MemoryStore::new(),
        FrameSequenceOpener::new(args.fps),
        analysis,
        service,
    );

    let job_id = orchestrator
        .submit(args.input.clone())
        .await
        .context("Failed to submit analysis job")?;

    let pb = progress_bar(args.json);
    let mut updates = Box::pin(orchestrator.stream_status(&job_id));
    let mut last = None;
    while let Some(status) = updates.next().await {
        pb.set_position(status.progress as u64);
        pb.set_message(status.stage.clone());
        last = Some(status);
    }
    pb.finish_and_clear();

    let Some(status) = last else {
        bail!("No status received for job {}", job_id);
    };

    if status.state != JobState::Done {
        let message = status.error.unwrap_or_else(|| status.state.to_string());
        if let Some(detail) = orchestrator.diagnostics(&job_id).await? {
            debug!("Job {} error chain: {}", job_id, detail);
        }
        let summary = Summary::failed(&message);
        if args.json {
            print_json(&serde_json::json!({ "job_id": job_id, "summary": summary }))?;
        }
        print_failure(&job_id, &summary);
        bail!("Analysis of {} failed", args.input.display());
    }

    let result = orchestrator
        .get_result(&job_id)
        .await?
        .with_context(|| format!("Result for job {} is missing", job_id))?;

    if args.json {
        print_json(&result)?;
    } else {
        print_report(&result, args.verbose);
    }

    Ok(())
}
