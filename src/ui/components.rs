//! Panels for the refresh screen

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;

use super::{Phase, Progress};
use crate::ingest::{ObjectOutcome, ObjectReport};

const BORDER: Color = Color::Blue;

/// Running totals across finished objects
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Tally {
    pub loaded: u64,
    pub dropped: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl Tally {
    pub fn add(&mut self, report: &ObjectReport) {
        match &report.outcome {
            ObjectOutcome::Skipped => self.skipped += 1,
            ObjectOutcome::Failed(_) => self.failed += 1,
            ObjectOutcome::Processed(stats) => {
                self.loaded += stats.loaded;
                self.dropped += stats.dropped();
            }
        }
    }
}

/// Phase, source description and tallies
pub struct StatusPanel {
    phase: Phase,
    info: String,
    tally: Tally,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Resetting,
            info: String::new(),
            tally: Tally::default(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn record(&mut self, report: &ObjectReport) {
        self.tally.add(report);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (marker, color) = match self.phase {
            Phase::Resetting => ("✗", Color::Yellow),
            Phase::Listing => ("◐", Color::Cyan),
            Phase::Ingesting => ("↓", Color::Cyan),
            Phase::Complete => ("✓", Color::Green),
        };
        let phase_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        let tally = self.tally;

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} {}", marker, self.phase), phase_style),
                Span::styled(format!("  {}", self.info), Style::default().fg(Color::Gray)),
            ]),
            Line::from(vec![
                Span::raw("   "),
                Span::styled(format!("{} loaded", tally.loaded), Style::default().fg(Color::Green)),
                Span::raw("  "),
                Span::styled(format!("{} dropped", tally.dropped), Style::default().fg(Color::Yellow)),
                Span::raw("  "),
                Span::styled(format!("{} objects failed", tally.failed), Style::default().fg(Color::Red)),
                Span::raw("  "),
                Span::styled(format!("{} skipped", tally.skipped), Style::default().fg(Color::DarkGray)),
            ]),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Flight Data Refresh ")
            .border_style(Style::default().fg(BORDER));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Object progress gauge
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(BORDER));

        let Some(progress) = &self.progress else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let label = format!(
            "object {}/{}  {}",
            progress.current.min(progress.total),
            progress.total,
            progress.label
        );
        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio().min(1.0))
            .label(label);
        frame.render_widget(gauge, area);
    }
}

/// One line in the object log
#[derive(Debug, Clone)]
pub struct Entry {
    pub text: String,
    pub color: Color,
}

impl Entry {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Color::White,
        }
    }

    pub fn for_object(report: &ObjectReport) -> Self {
        let color = match &report.outcome {
            ObjectOutcome::Skipped => Color::DarkGray,
            ObjectOutcome::Failed(_) => Color::Red,
            ObjectOutcome::Processed(stats) if stats.dropped() > 0 || !stats.warnings.is_empty() => {
                Color::Yellow
            }
            ObjectOutcome::Processed(_) => Color::Green,
        };
        Self {
            text: report.status_line(),
            color,
        }
    }
}

/// Newest-last list of entries, trimmed to the visible height
pub struct LogPanel {
    entries: Vec<Entry>,
    max_entries: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: 500,
        }
    }

    pub fn add(&mut self, entry: Entry) {
        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Objects ")
            .border_style(Style::default().fg(BORDER));

        let visible = area.height.saturating_sub(2) as usize;
        let start = self.entries.len().saturating_sub(visible);
        let items: Vec<ListItem> = self.entries[start..]
            .iter()
            .map(|entry| {
                let style = Style::default().fg(entry.color);
                ListItem::new(Span::styled(format!(" {}", entry.text), style))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::SourceKind;
    use crate::ingest::ObjectStats;

    fn processed(loaded: u64) -> ObjectReport {
        ObjectReport {
            name: "tickets.csv".into(),
            kind: SourceKind::Ticket,
            outcome: ObjectOutcome::Processed(ObjectStats {
                loaded,
                ..ObjectStats::default()
            }),
        }
    }

    #[test]
    fn test_tally() {
        let mut tally = Tally::default();
        tally.add(&processed(3));
        tally.add(&processed(2));
        tally.add(&ObjectReport {
            name: "notes.txt".into(),
            kind: SourceKind::Unrecognized,
            outcome: ObjectOutcome::Skipped,
        });
        assert_eq!(
            tally,
            Tally {
                loaded: 5,
                dropped: 0,
                failed: 0,
                skipped: 1
            }
        );
    }

    #[test]
    fn test_entry_color() {
        assert_eq!(Entry::for_object(&processed(1)).color, Color::Green);
    }

    #[test]
    fn test_log_panel_is_bounded() {
        let mut panel = LogPanel::new();
        for i in 0..600 {
            panel.add(Entry::plain(i.to_string()));
        }
        assert_eq!(panel.entries.len(), 500);
        assert_eq!(panel.entries[0].text, "100");
    }
}
