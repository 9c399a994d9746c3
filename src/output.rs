// ABOUTME: Terminal feedback for a pipeline run: progress lines, errors, and the final summary.
// ABOUTME: Quiet mode keeps only the summary line and warnings, for CI logs.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::orchestrator::{Command, RunReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Normal,
    /// `--quiet`: no progress or per-release details.
    Quiet,
}

/// Writes progress to stdout and errors to stderr. The run clock starts
/// when the value is created.
pub struct Output {
    mode: OutputMode,
    started: Instant,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            started: Instant::now(),
        }
    }

    /// Restart the run clock, e.g. once the catalog is loaded.
    pub fn restart_clock(&mut self) {
        self.started = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn verbose(&self) -> bool {
        matches!(self.mode, OutputMode::Normal)
    }

    pub fn progress(&self, message: &str) {
        if self.verbose() {
            println!("{message}");
        }
    }

    pub fn success(&self, message: &str) {
        if self.verbose() {
            println!("{message} ({:.1}s)", self.elapsed().as_secs_f64());
        } else {
            println!("{message}");
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("Error: {message}");
    }

    /// Print what a finished run produced.
    pub fn report(&self, command: Command, report: &RunReport) {
        if self.verbose() {
            let details = render_details(report);
            if !details.is_empty() {
                print!("{details}");
            }
        }
        let warnings = render_warnings(&report.diagnostics);
        if !warnings.is_empty() {
            eprint!("{warnings}");
        }
        self.success(&format!("{command} complete"));
    }
}

/// Releases, manifest path, and health results, one per line.
pub fn render_details(report: &RunReport) -> String {
    let mut out = String::new();
    for release in &report.releases {
        let _ = writeln!(
            out,
            "  {} {} -> {}, {}",
            release.service, release.version, release.image, release.alias
        );
    }
    if let Some(path) = &report.manifest {
        let _ = writeln!(out, "  manifest: {}", path.display());
    }
    if let Some(health) = &report.health {
        let _ = writeln!(
            out,
            "  healthy: {}/{}",
            health.healthy.len(),
            health.healthy.len() + health.timed_out.len()
        );
    }
    if report.tests_ran {
        let _ = writeln!(out, "  integration tests passed");
    }
    out
}

/// Warning summary grouped under a count header; empty when there were none.
pub fn render_warnings(diag: &Diagnostics) -> String {
    if !diag.has_warnings() {
        return String::new();
    }
    let mut out = format!("{} warning(s):\n", diag.warnings().len());
    for warning in diag.warnings() {
        let label = match warning.kind {
            WarningKind::IgnoredCommand => "ignored",
            WarningKind::Persistence => "versions",
            WarningKind::HealthTimeout => "health",
            WarningKind::TestsSkipped => "tests",
        };
        let _ = writeln!(out, "  [{label}] {}", warning.message);
    }
    out
}
