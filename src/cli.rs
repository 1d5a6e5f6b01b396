use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{SourceConfig, DEFAULT_ENDPOINT};
use crate::logging::LogOptions;
use crate::query::{PageRequest, SortColumn, SortDirection};

#[derive(Parser, Debug)]
#[command(name = "flight-ingest")]
#[command(version, about = "Load flight data from object storage into SQLite")]
pub struct Cli {
    /// More log output (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Delete the database and rebuild it from every source object
    Refresh {
        #[command(flatten)]
        source: SourceArgs,

        /// SQLite database path
        #[arg(long, env = "FLIGHT_INGEST_DB")]
        db: Option<PathBuf>,

        /// Show the full-screen progress view
        #[arg(long)]
        tui: bool,
    },

    /// List source objects and how each would be handled
    Objects {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List the tables and the source objects that feed them
    Tables,

    /// Print one page of the flight listing
    Flights {
        /// SQLite database path
        #[arg(long, env = "FLIGHT_INGEST_DB")]
        db: Option<PathBuf>,

        /// 1-based page; out of range values are clamped
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,

        /// Column to sort by
        #[arg(short, long, default_value_t = SortColumn::Year)]
        sort: SortColumn,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Bucket holding the source objects
    #[arg(long, env = "FLIGHT_INGEST_BUCKET", required_unless_present = "source_dir")]
    pub bucket: Option<String>,

    /// Read objects from a local directory instead of a bucket
    #[arg(long, conflicts_with = "bucket")]
    pub source_dir: Option<PathBuf>,

    /// Object store endpoint
    #[arg(long, env = "FLIGHT_INGEST_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bearer token for private buckets
    #[arg(long, env = "FLIGHT_INGEST_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl SourceArgs {
    pub fn to_config(&self) -> SourceConfig {
        match (&self.source_dir, &self.bucket) {
            (Some(dir), _) => SourceConfig::Directory(dir.clone()),
            (None, bucket) => SourceConfig::Bucket {
                endpoint: self.endpoint.clone(),
                bucket: bucket.clone().unwrap_or_default(),
                token: self.token.clone(),
            },
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            verbosity: self.verbose,
            quiet: self.quiet,
            tui: matches!(self.command, Commands::Refresh { tui: true, .. }),
        }
    }
}

/// Page request from the `flights` arguments
pub fn page_request(page: i64, sort: SortColumn, desc: bool) -> PageRequest {
    let direction = if desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    PageRequest::new(page, sort, direction)
}
