//! The reconciliation engine.
//!
//! A pass mirrors one source calendar into one target calendar. It first
//! computes a [`DirectionDiff`] (what to create, recreate and delete on the
//! target) and then applies it, recording every change in the run's
//! change log.
//!
//! Events that are themselves mirrors are never used as sources, so the
//! two passes of a run cannot feed each other.

mod diff_kind;
mod mirror_diff;
mod target_index;

pub use diff_kind::DiffKind;
pub use mirror_diff::{MirrorDiff, build_mirror};
pub use target_index::TargetIndex;

use std::fmt;

use tracing::{debug, info};

use crate::changelog::ChangeLog;
use crate::context::RunContext;
use crate::date_range::DateRange;
use crate::error::{CalMirrorError, CalMirrorResult};
use crate::event::{CalendarInfo, Event};
use crate::holiday::HolidayClassifier;
use crate::policy::SyncPolicy;
use crate::provider::CalendarProvider;
use crate::tags::{MirrorTags, Provenance, is_mirror};

/// A source calendar, a target calendar and the rules between them.
#[derive(Debug, Clone)]
pub struct Direction {
    pub name: String,
    pub source_calendar_id: String,
    pub target_calendar_id: String,
    pub policy: SyncPolicy,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Counts of what one pass did (or would do, in dry-run).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl PassStats {
    pub fn is_empty(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deleted == 0 && self.failed == 0
    }

    fn count(&mut self, kind: DiffKind) {
        match kind {
            DiffKind::Create => self.created += 1,
            DiffKind::Update => self.updated += 1,
            DiffKind::Delete => self.deleted += 1,
        }
    }
}

/// The changes needed to bring a target's mirrors in line with the source.
#[derive(Debug)]
pub struct DirectionDiff {
    pub target_calendar_id: String,
    pub diffs: Vec<MirrorDiff>,
}

impl DirectionDiff {
    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn count(&self, kind: DiffKind) -> usize {
        self.diffs.iter().filter(|d| d.kind == kind).count()
    }

    /// Compare source and target inside `window`.
    ///
    /// Fails without computing anything if either calendar cannot be
    /// resolved or listed.
    pub async fn compute<P: CalendarProvider>(
        provider: &P,
        classifier: &mut HolidayClassifier,
        direction: &Direction,
        window: &DateRange,
    ) -> CalMirrorResult<Self> {
        let source = resolve(provider, &direction.source_calendar_id).await?;
        let target = resolve(provider, &direction.target_calendar_id).await?;

        let source_events = provider.list_events(&source.id, window).await?;
        let target_events = provider.list_events(&target.id, window).await?;
        debug!(
            "{}: {} source events, {} target events",
            direction,
            source_events.len(),
            target_events.len()
        );

        let mut index = TargetIndex::build(target_events, &direction.source_calendar_id);
        debug!("{}: {} mirrors indexed", direction, index.len());
        let mut diffs = Vec::new();

        // Upsert
        for event in &source_events {
            if is_mirror(event) {
                continue;
            }
            if !should_sync(provider, classifier, &direction.policy, event).await {
                continue;
            }

            let mirror = build_mirror(event, &direction.policy, &direction.source_calendar_id);

            match index.take(&event.id) {
                Some(existing) => {
                    let current = Provenance::of(&existing)
                        .mirror()
                        .is_some_and(|tags| tags.is_current(&event.updated));
                    if !current {
                        diffs.push(MirrorDiff::update(existing, mirror));
                    }
                }
                None => diffs.push(MirrorDiff::create(mirror)),
            }
        }

        // Delete whatever the upsert did not account for
        for orphan in index.into_remaining() {
            let from_source = MirrorTags::decode(&orphan.tags)
                .is_some_and(|tags| tags.is_from(&direction.source_calendar_id));
            if from_source {
                diffs.push(MirrorDiff::delete(orphan));
            }
        }

        Ok(DirectionDiff {
            target_calendar_id: target.id,
            diffs,
        })
    }

    /// Execute the diff against the target calendar.
    ///
    /// In dry-run nothing is written; every change is still logged. A failed
    /// write is logged as a failure and the remaining changes still run.
    pub async fn apply<P: CalendarProvider>(
        &self,
        provider: &P,
        log: &mut ChangeLog,
        dry_run: bool,
    ) -> PassStats {
        let mut stats = PassStats::default();

        for diff in &self.diffs {
            let Some(event) = diff.event() else {
                continue;
            };
            debug!("{}", diff);

            if dry_run {
                log.record(diff.kind, &event.summary, &event.start, true);
                stats.count(diff.kind);
                continue;
            }

            match self.apply_one(provider, diff).await {
                Ok(()) => {
                    log.record(diff.kind, &event.summary, &event.start, false);
                    stats.count(diff.kind);
                }
                Err(e) => {
                    log.record_failure(diff.kind, &event.summary, &event.start, &e.to_string());
                    stats.failed += 1;
                }
            }
        }

        stats
    }

    async fn apply_one<P: CalendarProvider>(&self, provider: &P, diff: &MirrorDiff) -> CalMirrorResult<()> {
        if let Some(old) = &diff.old {
            provider.delete_event(&self.target_calendar_id, &old.id).await?;
        }
        if let Some(new) = &diff.new {
            provider.create_event(&self.target_calendar_id, new).await?;
        }
        Ok(())
    }
}

async fn resolve<P: CalendarProvider>(provider: &P, calendar_id: &str) -> CalMirrorResult<CalendarInfo> {
    provider
        .resolve_calendar(calendar_id)
        .await?
        .ok_or_else(|| CalMirrorError::CalendarNotFound(calendar_id.to_string()))
}

/// Keyword match first; otherwise the day classification decides.
async fn should_sync<P: CalendarProvider>(
    provider: &P,
    classifier: &mut HolidayClassifier,
    policy: &SyncPolicy,
    event: &Event,
) -> bool {
    if policy.keywords().matches(&event.summary) {
        return true;
    }
    if !policy.needs_classification(&event.summary) {
        return false;
    }

    let date = event.start.date_in(&classifier.rules().timezone);
    let non_working = classifier.classify(provider, date).await;
    policy.auto_syncs(non_working)
}

/// Run one direction's pass and record its changes in the run's change log.
pub async fn reconcile<P: CalendarProvider>(
    provider: &P,
    ctx: &mut RunContext,
    direction: &Direction,
) -> CalMirrorResult<PassStats> {
    info!("Syncing {}", direction);

    let diff = DirectionDiff::compute(provider, &mut ctx.classifier, direction, &ctx.window).await?;
    if diff.is_empty() {
        info!("{}: already in sync", direction);
    } else {
        debug!(
            "{}: {} to create, {} to update, {} to delete",
            direction,
            diff.count(DiffKind::Create),
            diff.count(DiffKind::Update),
            diff.count(DiffKind::Delete)
        );
    }

    Ok(diff.apply(provider, &mut ctx.change_log, ctx.dry_run).await)
}
