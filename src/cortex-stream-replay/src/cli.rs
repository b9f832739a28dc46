//! Command-line arguments.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cortex_stream_session::SessionConfig;

/// Replay a JSON-lines stream event log and print the resulting session.
#[derive(Debug, Parser)]
#[command(name = "cortex-stream-replay", version, about)]
pub struct Cli {
    /// Event log to read. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Output format for the final session snapshot.
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Session config file (TOML).
    #[arg(long, short = 'c', env = "CORTEX_STREAM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log verbosity. Ignored when RUST_LOG is set.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Do not start the stream before the first event.
    #[arg(long)]
    pub no_start: bool,

    /// Drive the session clock from event timestamps instead of wall time.
    #[arg(long)]
    pub event_time: bool,
}

impl Cli {
    /// Loads the session config, or the default when none was given.
    pub fn session_config(&self) -> Result<SessionConfig> {
        match &self.config {
            Some(path) => SessionConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display())),
            None => Ok(SessionConfig::default()),
        }
    }

    /// Input path, with `-` treated as stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }
}

/// How the final snapshot is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Readable summary
    #[default]
    Human,
    /// Pretty-printed snapshot JSON
    Json,
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages
    Info,
    /// Show debug messages, including lifecycle transitions
    Debug,
    /// Show every event and token
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["cortex-stream-replay"]).expect("parse");
        assert_eq!(cli.format, OutputFormat::Human);
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert!(!cli.no_start);
        assert!(!cli.event_time);
        assert_eq!(cli.input_path(), None);
    }

    #[test]
    fn test_dash_means_stdin() {
        let cli = Cli::try_parse_from(["cortex-stream-replay", "-"]).expect("parse");
        assert_eq!(cli.input_path(), None);

        let cli = Cli::try_parse_from(["cortex-stream-replay", "turn.jsonl", "--format", "json"])
            .expect("parse");
        assert_eq!(cli.input_path(), Some(&PathBuf::from("turn.jsonl")));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_session_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "throughput_epsilon_ms = 20").expect("write");
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::try_parse_from(["cortex-stream-replay", "--config", path.as_str()])
            .expect("parse");
        let config = cli.session_config().expect("config");
        assert_eq!(config.throughput_epsilon_ms, 20);
    }

    #[test]
    fn test_log_level_filter_strings() {
        assert_eq!(LogLevel::Trace.as_filter_str(), "trace");
        assert_eq!(LogLevel::default().as_filter_str(), "warn");
    }
}
