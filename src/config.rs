//! Tunables and run configuration

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

/// Rows per page in the flight listing
pub const PAGE_SIZE: usize = 15;

/// Cloud Storage JSON API host
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

pub const MAX_RETRIES: u32 = 3;

/// First retry delay; doubled on every further attempt
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const DATABASE_FILE: &str = "flights.sqlite";

/// Bounded exponential backoff for object store calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// A policy that tries once and never sleeps
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            base_delay: RETRY_BASE_DELAY,
        }
    }
}

/// Where source objects come from
#[derive(Debug, Clone)]
pub enum SourceConfig {
    Bucket {
        endpoint: String,
        bucket: String,
        token: Option<String>,
    },
    Directory(PathBuf),
}

/// Default database location under the platform data directory
pub fn default_database_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "flight-ingest")
        .context("Could not determine data directory")?;
    let dir = dirs.data_dir();
    std::fs::create_dir_all(dir).context("Failed to create data directory")?;
    Ok(dir.join(DATABASE_FILE))
}
