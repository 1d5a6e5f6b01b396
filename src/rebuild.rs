//! Full refresh of the local database: delete, recreate, ingest.
//!
//! While a rebuild runs, a `<db>.rebuilding` marker sits next to the
//! database. Readers in any process check it before opening the file, and a
//! second rebuild of the same file is refused while it exists.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::RebuildError;
use crate::ingest::{ingest, RunReport};
use crate::source::ObjectSource;
use crate::ui::{Phase, Ui};
use crate::writer::SqliteWriter;

/// Sidecar files SQLite may leave next to the database
const SIDECAR_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

const MARKER_SUFFIX: &str = ".rebuilding";

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Rebuild-in-progress state of one database file, shared across processes
/// through the marker file
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildState {
    marker: PathBuf,
}

impl RebuildState {
    pub fn for_database(db_path: &Path) -> Self {
        Self {
            marker: with_suffix(db_path, MARKER_SUFFIX),
        }
    }

    pub fn marker_path(&self) -> &Path {
        &self.marker
    }

    pub fn is_rebuilding(&self) -> bool {
        self.marker.exists()
    }

    /// Claim the database for a rebuild; the marker is removed when the
    /// guard drops. A leftover marker from a crashed run must be removed by
    /// hand.
    pub fn begin(&self) -> Result<RebuildGuard, RebuildError> {
        let marker_err = |source| RebuildError::Marker {
            path: self.marker.clone(),
            source,
        };

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.marker)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(RebuildError::AlreadyRunning(self.marker.clone()))
            }
            Err(e) => return Err(marker_err(e)),
        };

        let guard = RebuildGuard {
            marker: self.marker.clone(),
        };
        writeln!(file, "{}", std::process::id()).map_err(marker_err)?;
        Ok(guard)
    }
}

#[derive(Debug)]
pub struct RebuildGuard {
    marker: PathBuf,
}

impl Drop for RebuildGuard {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.marker) {
            warn!(path = ?self.marker, error = %err, "failed to remove rebuild marker");
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<bool, RebuildError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(RebuildError::RemoveDatabase {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Delete the database file and any sidecars. Absence is not an error.
pub fn remove_database(db_path: &Path) -> Result<(), RebuildError> {
    if remove_if_exists(db_path)? {
        info!(path = ?db_path, "removed existing database");
    }

    for suffix in SIDECAR_SUFFIXES {
        remove_if_exists(&with_suffix(db_path, suffix))?;
    }

    Ok(())
}

/// The refresh entry point exposed to callers
pub struct Rebuilder {
    db_path: PathBuf,
    state: RebuildState,
}

impl Rebuilder {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        Self {
            state: RebuildState::for_database(&db_path),
            db_path,
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn state(&self) -> &RebuildState {
        &self.state
    }

    /// Delete the database, recreate the schema and ingest every object of
    /// `source`. Record and object failures end up in the report; only
    /// filesystem, schema and listing failures are returned as errors.
    pub fn rebuild<S: ObjectSource, U: Ui>(
        &self,
        source: &S,
        ui: &mut U,
    ) -> Result<RunReport, RebuildError> {
        let _guard = self.state.begin()?;

        ui.set_phase(Phase::Resetting);
        ui.set_info(self.db_path.display().to_string());
        remove_database(&self.db_path)?;

        let writer = SqliteWriter::open(&self.db_path)?;
        writer.create_tables()?;

        let report = ingest(source, &writer, ui).map_err(|err| {
            warn!(error = %err, "listing failed, rebuild aborted");
            RebuildError::Listing(err)
        })?;

        writer.finalize()?;
        ui.set_phase(Phase::Complete);
        ui.clear_progress();
        info!(path = ?self.db_path, summary = %report.summary(), "rebuild complete");

        Ok(report)
    }
}
