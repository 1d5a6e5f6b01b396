use std::time::Instant;
use tracing::{debug, info, warn};

use super::report::{ObjectOutcome, ObjectReport, ObjectStats, RecordIssue, RunReport};
use crate::classify::SourceKind;
use crate::error::{IngestError, RetrievalError};
use crate::parser::FormatParser;
use crate::source::{ObjectInfo, ObjectSource};
use crate::ui::{Phase, Ui};
use crate::writer::SqliteWriter;

/// Everything a run needs, passed explicitly instead of living in globals:
/// the object source, the single write handle, and the run-scoped report.
pub struct IngestContext<'a, S: ObjectSource, U: Ui> {
    source: &'a S,
    writer: &'a SqliteWriter,
    ui: &'a mut U,
    report: RunReport,
}

impl<'a, S: ObjectSource, U: Ui> IngestContext<'a, S, U> {
    pub fn new(source: &'a S, writer: &'a SqliteWriter, ui: &'a mut U) -> Self {
        Self {
            source,
            writer,
            ui,
            report: RunReport::new(source.describe()),
        }
    }

    /// List every object and ingest the recognized ones in order.
    ///
    /// Only a listing failure aborts; every other failure is recorded against
    /// its object or record and the run moves on.
    pub fn run(mut self) -> Result<RunReport, RetrievalError> {
        let start = Instant::now();

        self.ui.set_phase(Phase::Listing);
        self.ui.set_info(self.report.source.clone());
        let objects = self.source.list_objects()?;
        info!(source = %self.report.source, count = objects.len(), "listed source objects");

        self.ui.set_phase(Phase::Ingesting);
        let total = objects.len() as u64;
        for (i, object) in objects.iter().enumerate() {
            self.ui.set_progress(i as u64, total, object.name.clone());
            let report = self.ingest_object(object);
            self.ui.object_done(&report);
            self.report.push(report);
        }
        self.ui.set_progress(total, total, "done");

        self.report.elapsed = start.elapsed();
        info!(
            loaded = self.report.records_loaded(),
            dropped = self.report.records_dropped(),
            failed_objects = self.report.objects_failed(),
            missing_fields = self.report.warnings(),
            "ingestion finished"
        );
        Ok(self.report)
    }

    fn ingest_object(&self, object: &ObjectInfo) -> ObjectReport {
        let kind = SourceKind::classify(&object.name);
        let outcome = match kind.parser() {
            None => {
                debug!(object = %object.name, "skipping unrecognized object");
                ObjectOutcome::Skipped
            }
            Some(parser) => match self.load_object(&object.name, parser.as_ref()) {
                Ok(stats) => ObjectOutcome::Processed(stats),
                Err(err) => {
                    warn!(object = %object.name, kind = err.kind(), error = %err, "object failed");
                    ObjectOutcome::Failed(err)
                }
            },
        };

        ObjectReport {
            name: object.name.clone(),
            kind,
            outcome,
        }
    }

    fn load_object(
        &self,
        name: &str,
        parser: &dyn FormatParser,
    ) -> Result<ObjectStats, IngestError> {
        let bytes = self.source.fetch(name)?;
        debug!(object = %name, bytes = bytes.len(), format = parser.format(), "fetched");

        let rows = parser.parse(&bytes)?;
        let mut stats = ObjectStats::default();

        for (index, row) in rows.into_iter().enumerate() {
            let canonical = match row {
                Ok(canonical) => canonical,
                Err(err) => {
                    warn!(object = %name, record = index, error = %err, "record dropped");
                    stats.issues.push(RecordIssue {
                        index,
                        error: err.into(),
                    });
                    continue;
                }
            };

            for warning in &canonical.warnings {
                warn!(
                    object = %name,
                    record = index,
                    field = warning.field,
                    value = %warning.value,
                    "field loaded as missing"
                );
            }

            match self.writer.insert(&canonical.record) {
                Ok(()) => {
                    stats.loaded += 1;
                    stats
                        .warnings
                        .extend(canonical.warnings.into_iter().map(|w| (index, w)));
                }
                Err(err) => {
                    warn!(object = %name, record = index, error = %err, "insert failed");
                    stats.issues.push(RecordIssue {
                        index,
                        error: err.into(),
                    });
                }
            }
        }

        info!(
            object = %name,
            loaded = stats.loaded,
            dropped = stats.dropped(),
            missing_fields = stats.warnings.len(),
            "object ingested"
        );
        Ok(stats)
    }
}

/// Ingest every object of `source` through `writer`
pub fn ingest<S: ObjectSource, U: Ui>(
    source: &S,
    writer: &SqliteWriter,
    ui: &mut U,
) -> Result<RunReport, RetrievalError> {
    IngestContext::new(source, writer, ui).run()
}
