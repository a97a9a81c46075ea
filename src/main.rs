//! rfp-monitor — binary entrypoint.
//! Runs one scan/filter/report/email cycle and exits. Only a bad config exits non-zero.

use anyhow::Result;
use clap::Parser;

use rfp_monitor::classify::OpenAiBackend;
use rfp_monitor::config::{config_path, load_config_from, seen_path, ProcessEnv};
use rfp_monitor::ingest::HttpFetcher;

#[derive(Parser, Debug)]
#[command(name = "rfp-monitor", about = "Monitor RFP sources")]
struct Cli {
    /// Ignore seen cache and process all items
    #[arg(long)]
    force_refresh: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let env = ProcessEnv;
    rfp_monitor::logging::init(&env);

    let cfg = load_config_from(&config_path(&env))?;
    let fetcher = HttpFetcher::new()?;

    rfp_monitor::run_cycle(
        &cfg,
        &seen_path(&env),
        cli.force_refresh,
        &fetcher,
        OpenAiBackend::new(),
        &env,
    )
    .await;
    Ok(())
}
