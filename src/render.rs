//! Colored terminal rendering for calmirror-core types.

use calmirror_core::notify::ReportOutcome;
use calmirror_core::reconcile::{DiffKind, PassStats};
use calmirror_core::run::{PassOutcome, PassReport, RunSummary};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        let symbol = self.symbol();
        match self {
            DiffKind::Create => symbol.green().to_string(),
            DiffKind::Update => symbol.yellow().to_string(),
            DiffKind::Delete => symbol.red().to_string(),
        }
    }
}

impl Render for PassStats {
    fn render(&self) -> String {
        if self.is_empty() {
            return "in sync".dimmed().to_string();
        }

        let mut parts = vec![
            format!("{} {} created", DiffKind::Create.render(), self.created),
            format!("{} {} updated", DiffKind::Update.render(), self.updated),
            format!("{} {} deleted", DiffKind::Delete.render(), self.deleted),
        ];
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed).red().to_string());
        }
        parts.join(", ")
    }
}

impl Render for PassReport {
    fn render(&self) -> String {
        match &self.outcome {
            PassOutcome::Completed(stats) => format!("📅 {}: {}", self.direction, stats.render()),
            PassOutcome::Skipped(reason) => format!(
                "📅 {}: {}",
                self.direction,
                format!("skipped ({})", reason).red()
            ),
        }
    }
}

impl Render for ReportOutcome {
    fn render(&self) -> String {
        if self.skipped {
            return "Report: not sent".dimmed().to_string();
        }
        let text = format!("Report: {} sent, {} failed", self.delivered, self.failed);
        if self.failed > 0 {
            text.yellow().to_string()
        } else {
            text.green().to_string()
        }
    }
}

impl Render for RunSummary {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        if self.dry_run {
            lines.push("DRY RUN (no calendar was modified)".yellow().bold().to_string());
        }
        for pass in &self.passes {
            lines.push(pass.render());
        }
        for change in &self.changes {
            lines.push(format!("   {}", change));
        }
        lines.push(self.notification.render());

        lines.join("\n")
    }
}
