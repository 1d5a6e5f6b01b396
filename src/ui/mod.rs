//! Terminal progress view for a rebuild, using ratatui.
//!
//! The orchestrator drives any [`Ui`]: phases of the rebuild, progress
//! through the listed objects, and one outcome line per object.

mod components;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::warn;

use crate::ingest::ObjectReport;
use components::{Entry, LogPanel, ProgressPanel, StatusPanel};

pub use components::Tally;

/// Stages of a rebuild
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Resetting,
    Listing,
    Ingesting,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Resetting => write!(f, "Removing previous database"),
            Phase::Listing => write!(f, "Listing source objects"),
            Phase::Ingesting => write!(f, "Loading objects"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Receives rebuild progress
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);

    /// Called once per listed object, after it has been handled
    fn object_done(&mut self, report: &ObjectReport) {
        self.log(report.status_line());
    }
}

type Screen = Terminal<CrosstermBackend<Stdout>>;

fn enter_screen() -> Result<Screen> {
    terminal::enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(io::stdout()))?)
}

fn leave_screen(screen: &mut Screen) -> io::Result<()> {
    terminal::disable_raw_mode()?;
    screen.backend_mut().execute(LeaveAlternateScreen)?;
    screen.show_cursor()
}

/// Status, progress bar and log, top to bottom
fn panels(area: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(5),
    ])
    .areas(area)
}

/// Block until a key is pressed
fn wait_for_key() -> io::Result<()> {
    loop {
        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let CrosstermEvent::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}

/// Full-screen refresh view. The terminal is restored by [`UiApp::close`],
/// or on drop if the rebuild bails out early.
pub struct UiApp {
    screen: Screen,
    active: bool,
    draw_failed: bool,
    status: StatusPanel,
    progress: ProgressPanel,
    log: LogPanel,
}

impl UiApp {
    pub fn new() -> Result<Self> {
        Ok(Self {
            screen: enter_screen()?,
            active: true,
            draw_failed: false,
            status: StatusPanel::new(),
            progress: ProgressPanel::new(),
            log: LogPanel::new(),
        })
    }

    /// Repaint; a failed frame is logged once and otherwise ignored so the
    /// rebuild itself carries on
    fn redraw(&mut self) {
        let (status, progress, log) = (&self.status, &self.progress, &self.log);
        let drawn = self.screen.draw(|frame| {
            let [top, middle, bottom] = panels(frame.area());

            status.render(frame, top);
            progress.render(frame, middle);
            log.render(frame, bottom);
        });

        if let Err(err) = drawn {
            if !self.draw_failed {
                warn!(error = %err, "progress view failed to draw");
                self.draw_failed = true;
            }
        }
    }

    /// Leave the full-screen view. With a summary, show it and wait for a
    /// key first.
    pub fn close(mut self, summary: Option<&str>) -> Result<()> {
        if let Some(summary) = summary {
            self.status.set_phase(Phase::Complete);
            self.progress.clear();
            self.log.add(Entry::plain(summary));
            self.log.add(Entry::plain("Press any key to exit..."));
            self.redraw();
            wait_for_key()?;
        }

        self.active = false;
        leave_screen(&mut self.screen)?;
        Ok(())
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.status.set_phase(phase);
        self.redraw();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.status.set_info(info);
        self.redraw();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.progress.set_progress(Progress::new(current, total, label));
        self.redraw();
    }

    fn clear_progress(&mut self) {
        self.progress.clear();
        self.redraw();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.add(Entry::plain(message));
        self.redraw();
    }

    fn object_done(&mut self, report: &ObjectReport) {
        self.status.record(report);
        self.log.add(Entry::for_object(report));
        self.redraw();
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        if self.active {
            leave_screen(&mut self.screen).ok();
        }
    }
}

/// Discards progress; structured logging carries the outcome instead
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
    fn object_done(&mut self, _report: &ObjectReport) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio() {
        assert_eq!(Progress::new(0, 0, "empty").ratio(), 0.0);
        assert_eq!(Progress::new(3, 4, "objects").ratio(), 0.75);
    }

    #[test]
    fn test_panels_stack_with_log_taking_the_rest() {
        let [status, progress, log] = panels(Rect::new(0, 0, 80, 24));
        assert_eq!((status.y, status.height), (0, 4));
        assert_eq!((progress.y, progress.height), (4, 3));
        assert_eq!((log.y, log.height), (7, 17));
        assert!([status, progress, log].iter().all(|r| r.width == 80));
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(Phase::Listing.to_string(), "Listing source objects");
        assert_eq!(Phase::Complete.to_string(), "Complete");
    }
}
