//! Structured outcome of an ingestion run

use std::fmt;
use std::time::Duration;

use crate::classify::SourceKind;
use crate::error::{IngestError, NormalizationError};

/// A record that was dropped, by its position in the object
#[derive(Debug)]
pub struct RecordIssue {
    pub index: usize,
    pub error: IngestError,
}

#[derive(Debug, Default)]
pub struct ObjectStats {
    pub loaded: u64,
    /// Fields loaded as missing, per record index
    pub warnings: Vec<(usize, NormalizationError)>,
    pub issues: Vec<RecordIssue>,
}

impl ObjectStats {
    pub fn dropped(&self) -> u64 {
        self.issues.len() as u64
    }
}

#[derive(Debug)]
pub enum ObjectOutcome {
    /// Name matched no known format
    Skipped,
    /// Nothing from the object was loaded
    Failed(IngestError),
    Processed(ObjectStats),
}

#[derive(Debug)]
pub struct ObjectReport {
    pub name: String,
    pub kind: SourceKind,
    pub outcome: ObjectOutcome,
}

impl ObjectReport {
    /// One-line outcome for progress views
    pub fn status_line(&self) -> String {
        match &self.outcome {
            ObjectOutcome::Skipped => format!("{}: skipped", self.name),
            ObjectOutcome::Failed(err) => format!("{}: failed ({})", self.name, err),
            ObjectOutcome::Processed(stats) => format!(
                "{}: {} records ({} dropped)",
                self.name,
                stats.loaded,
                stats.dropped()
            ),
        }
    }

    pub fn stats(&self) -> Option<&ObjectStats> {
        match &self.outcome {
            ObjectOutcome::Processed(stats) => Some(stats),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub source: String,
    pub objects: Vec<ObjectReport>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, report: ObjectReport) {
        self.objects.push(report);
    }

    pub fn object(&self, name: &str) -> Option<&ObjectReport> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn count_outcomes(&self, pred: impl Fn(&ObjectOutcome) -> bool) -> usize {
        self.objects.iter().filter(|o| pred(&o.outcome)).count()
    }

    pub fn objects_processed(&self) -> usize {
        self.count_outcomes(|o| matches!(o, ObjectOutcome::Processed(_)))
    }

    pub fn objects_failed(&self) -> usize {
        self.count_outcomes(|o| matches!(o, ObjectOutcome::Failed(_)))
    }

    pub fn objects_skipped(&self) -> usize {
        self.count_outcomes(|o| matches!(o, ObjectOutcome::Skipped))
    }

    pub fn records_loaded(&self) -> u64 {
        self.objects.iter().filter_map(ObjectReport::stats).map(|s| s.loaded).sum()
    }

    pub fn records_dropped(&self) -> u64 {
        self.objects.iter().filter_map(ObjectReport::stats).map(|s| s.dropped()).sum()
    }

    pub fn warnings(&self) -> usize {
        self.objects
            .iter()
            .filter_map(ObjectReport::stats)
            .map(|s| s.warnings.len())
            .sum()
    }

    /// True when every recognized object loaded without losing data
    pub fn is_clean(&self) -> bool {
        self.objects_failed() == 0 && self.records_dropped() == 0 && self.warnings() == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} records loaded from {} objects ({} failed, {} skipped); {} records dropped, {} fields missing in {:.1}s",
            self.records_loaded(),
            self.objects_processed(),
            self.objects_failed(),
            self.objects_skipped(),
            self.records_dropped(),
            self.warnings(),
            self.elapsed.as_secs_f64()
        )
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source: {}", self.source)?;
        for object in &self.objects {
            match &object.outcome {
                ObjectOutcome::Skipped => writeln!(f, "  {:<45} skipped", object.name)?,
                ObjectOutcome::Failed(err) => {
                    writeln!(f, "  {:<45} FAILED ({}): {}", object.name, err.kind(), err)?
                }
                ObjectOutcome::Processed(stats) => writeln!(
                    f,
                    "  {:<45} {}: {} loaded, {} dropped, {} fields missing",
                    object.name,
                    object.kind,
                    stats.loaded,
                    stats.dropped(),
                    stats.warnings.len()
                )?,
            }
        }
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, RetrievalError};

    fn sample() -> RunReport {
        let mut report = RunReport::new("memory");
        report.push(ObjectReport {
            name: "README.md".into(),
            kind: SourceKind::Unrecognized,
            outcome: ObjectOutcome::Skipped,
        });
        report.push(ObjectReport {
            name: "aircrafts.xml".into(),
            kind: SourceKind::Aircraft,
            outcome: ObjectOutcome::Failed(RetrievalError::NotFound("aircrafts.xml".into()).into()),
        });
        report.push(ObjectReport {
            name: "tickets.csv".into(),
            kind: SourceKind::Ticket,
            outcome: ObjectOutcome::Processed(ObjectStats {
                loaded: 4,
                warnings: Vec::new(),
                issues: vec![RecordIssue {
                    index: 0,
                    error: ParseError::MissingField("flightNumber").into(),
                }],
            }),
        });
        report
    }

    #[test]
    fn test_aggregates() {
        let report = sample();
        assert_eq!(report.objects_processed(), 1);
        assert_eq!(report.objects_failed(), 1);
        assert_eq!(report.objects_skipped(), 1);
        assert_eq!(report.records_loaded(), 4);
        assert_eq!(report.records_dropped(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_display_lists_objects() {
        let text = sample().to_string();
        assert!(text.contains("README.md"));
        assert!(text.contains("FAILED (retrieval)"));
        assert!(text.contains("4 loaded, 1 dropped"));
    }

    #[test]
    fn test_empty_report_is_clean() {
        assert!(RunReport::new("memory").is_clean());
    }
}
