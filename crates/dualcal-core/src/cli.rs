use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        let key = k.trim();
        if key.is_empty() {
            return Err(anyhow!("empty key in override: {s}"));
        }
        Ok(Self {
            key: key.to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dualcal",
    version,
    about = "Jalali and Gregorian calendar with task due-date buckets",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Jalali,
    Gregorian,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert a date between calendars.
    Convert {
        date: String,
        /// Target calendar. Input is read in the other one.
        #[arg(long = "to", value_enum, default_value_t = Direction::Jalali)]
        to: Direction,
    },
    /// Format a Gregorian ISO date or date-time in Jalali.
    Format { iso: String },
    /// Relative due text for an ISO date.
    Due { iso: String },
    /// Print the task bucket map as JSON.
    Buckets {
        #[arg(long = "tasks")]
        tasks: Option<PathBuf>,
    },
    /// Render the current Jalali month.
    Month {
        #[arg(long = "tasks")]
        tasks: Option<PathBuf>,
        #[arg(long = "shift", default_value_t = 0, allow_hyphen_values = true)]
        shift: i32,
        #[arg(long = "html")]
        html: bool,
    },
    /// Open a Jalali day as if it was clicked on the calendar.
    Day {
        date: String,
        #[arg(long = "tasks")]
        tasks: Option<PathBuf>,
    },
    /// Print today's date in both calendars.
    Today,
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
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
