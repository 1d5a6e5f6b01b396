pub mod orchestrator;
pub mod report;

pub use orchestrator::{ingest, IngestContext};
pub use report::{ObjectOutcome, ObjectReport, ObjectStats, RecordIssue, RunReport};
