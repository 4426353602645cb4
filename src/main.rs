// src/main.rs
use anyhow::{Context, Result};
use log::LevelFilter;

use mediaqa::cli;

fn main() -> Result<()> {
    let args = cli::parse_args();

    let mut logger = env_logger::Builder::from_default_env();
    logger.format_timestamp_secs();
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Warn);
    }
    logger.init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(cli::run(args))
}
