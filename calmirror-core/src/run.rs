//! One full sync run: both directions, then the report.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::Settings;
use crate::context::RunContext;
use crate::notify::{ReportOutcome, Reporter};
use crate::provider::CalendarProvider;
use crate::reconcile::{PassStats, reconcile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(PassStats),
    /// The pass could not start; the reason is the error that stopped it.
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub direction: String,
    pub outcome: PassOutcome,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub dry_run: bool,
    pub passes: Vec<PassReport>,
    /// The change log's lines, in the order the changes happened.
    pub changes: Vec<String>,
    pub notification: ReportOutcome,
}

impl RunSummary {
    pub fn totals(&self) -> PassStats {
        self.passes
            .iter()
            .filter_map(|p| match p.outcome {
                PassOutcome::Completed(stats) => Some(stats),
                PassOutcome::Skipped(_) => None,
            })
            .fold(PassStats::default(), |acc, s| PassStats {
                created: acc.created + s.created,
                updated: acc.updated + s.updated,
                deleted: acc.deleted + s.deleted,
                failed: acc.failed + s.failed,
            })
    }

    pub fn skipped(&self) -> usize {
        self.passes
            .iter()
            .filter(|p| matches!(p.outcome, PassOutcome::Skipped(_)))
            .count()
    }
}

pub async fn run<P: CalendarProvider>(
    provider: &P,
    settings: &Settings,
    reporter: &Reporter,
) -> RunSummary {
    run_at(provider, settings, reporter, Utc::now()).await
}

/// Run both directions with the window starting at `now`.
///
/// A direction that cannot start is logged and skipped; the other still
/// runs, and the report covers whatever was recorded.
pub async fn run_at<P: CalendarProvider>(
    provider: &P,
    settings: &Settings,
    reporter: &Reporter,
    now: DateTime<Utc>,
) -> RunSummary {
    let mut ctx = RunContext::new(settings, now);

    if ctx.dry_run {
        info!("DRY_RUN mode: no calendar will be modified");
    }
    info!(
        "Syncing {} → {}",
        ctx.window.from_rfc3339(),
        ctx.window.to_rfc3339()
    );

    let mut passes = Vec::new();
    for direction in settings.directions() {
        let outcome = match reconcile(provider, &mut ctx, &direction).await {
            Ok(stats) => PassOutcome::Completed(stats),
            Err(e) => {
                error!("Skipping {}: {}", direction, e);
                PassOutcome::Skipped(e.to_string())
            }
        };
        passes.push(PassReport {
            direction: direction.name.clone(),
            outcome,
        });
    }

    let notification = reporter.report(&ctx.change_log, ctx.dry_run).await;
    let changes = ctx.change_log.lines();
    ctx.change_log.clear();

    RunSummary {
        dry_run: ctx.dry_run,
        passes,
        changes,
        notification,
    }
}
