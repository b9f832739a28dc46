//! Cortex Stream Replay - entry point.

use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cortex_stream_replay::render::render_summary;
use cortex_stream_replay::{Cli, OutputFormat, ReplayOptions, Replayer};

fn init_logging(cli: &Cli) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(cli.log_level.as_filter_str())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = cli.session_config()?;
    let options = ReplayOptions {
        auto_start: !cli.no_start,
        event_time: cli.event_time,
    };
    let mut replayer = Replayer::new(config, options);

    match cli.input_path() {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            replayer.run(BufReader::new(file))?;
        }
        None => replayer.run(io::stdin().lock())?,
    }

    let report = replayer.finish();
    match cli.format {
        OutputFormat::Human => print!("{}", render_summary(&report.snapshot)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.snapshot)?);
        }
    }
    Ok(())
}
