use anyhow::{Context, Result};
use clap::Parser;
use graphsnap_common::observability::{LogConfig, init_logging};
use graphsnap_config::{ConfigLoader, FetchSettings, GraphsnapConfig};
use graphsnap_fetch::{Backoff, Paginator};
use graphsnap_social::bsky::BskyClient;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Duration;

mod cli;
mod dispatch;
mod output;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Config: optional file, env wins
    let cfg: GraphsnapConfig = ConfigLoader::new()
        .with_file(&cli.config)
        .load()
        .with_context(|| format!("loading configuration ({})", cli.config.display()))?;

    // 2) Logging to stderr (+ rolling file); stdout is reserved for the snapshot
    let log_file = init_logging(LogConfig {
        file_sink: cfg.log.file,
        log_dir: cfg.log.dir.as_deref().map(PathBuf::from),
        format: cli.log_format.into(),
        ..LogConfig::default()
    })?;
    tracing::debug!(?log_file, command = ?cli.command, "starting");

    // 3) Session, then the one requested listing
    let client = BskyClient::connect(&cfg.instance, &cfg.handle, &cfg.app_password).await?;
    let paginator = paginator_from(&cfg.fetch);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    dispatch::run(cli.command, &client, &paginator, &mut out).await?;
    Ok(())
}

fn paginator_from(settings: &FetchSettings) -> Paginator {
    Paginator::new(
        Backoff::new(
            settings.max_retries,
            Duration::from_millis(settings.initial_backoff_ms),
        ),
        settings.page_limit,
        Duration::from_millis(settings.page_delay_ms),
    )
}
