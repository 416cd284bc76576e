use std::path::PathBuf;

use clap::Parser;
use interpreter_core::SubmissionMode;

use super::logging::{LogDestination, DEFAULT_LOG_FILE};

/// Upload a CSV file, describe its columns, and chat with the analysis service about it.
#[derive(Debug, Parser)]
#[command(name = "data-interpreter", version)]
pub struct Args {
    /// RON config file; defaults to ./interpreter.ron when present
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Analysis service endpoint, overriding the config file
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Model to request (GPT-4 or GPT-3.5)
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<SubmissionMode>,

    /// Allow the service to log request contents
    #[arg(long)]
    pub allow_logging: bool,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Log file used by the `file` and `both` destinations
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// CSV file to load on startup
    pub file: Option<PathBuf>,
}

fn parse_mode(raw: &str) -> Result<SubmissionMode, String> {
    raw.parse().map_err(|err: interpreter_core::UnknownMode| err.to_string())
}
