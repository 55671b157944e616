use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::dimension::Dimension;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "fcevents",
    version,
    about = "Filter a program listing by category, audience and day"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// JSON array of program records.
    #[arg(long = "listing")]
    pub listing: PathBuf,

    /// Category id, e.g. `fc-teens`. Defaults to `all`.
    #[arg(long = "category")]
    pub category: Option<String>,

    #[arg(long = "audience", action = ArgAction::Append)]
    pub audiences: Vec<String>,

    #[arg(long = "day", action = ArgAction::Append)]
    pub days: Vec<String>,

    /// Catalog TOML file; overrides FCEVENTS_CONFIG.
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(long = "color", default_value = "on")]
    pub color: String,
}

impl GlobalCli {
    /// Multi-select values in dimension order.
    pub fn filter_values(&self) -> impl Iterator<Item = (Dimension, &str)> {
        let audiences = self
            .audiences
            .iter()
            .map(|value| (Dimension::Audience, value.as_str()));
        let days = self
            .days
            .iter()
            .map(|value| (Dimension::Day, value.as_str()));
        audiences.chain(days)
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
