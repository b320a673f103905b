//! Interaction and scheduling engine.
//!
//! The engine is a pure function of `(routine, rule table)`. It owns no state
//! between calls; everything below borrows the table read-only and keeps its
//! accumulators local to one run.
//!
//! ## How the parts work together
//!
//! ```text
//! RuleTable ── CompiledRules::new      (compiled_rules.rs)
//!                    │
//! routine ── resolve_routine ──────────  (resolve.rs)
//!                    │  per-product actives + active -> products
//!        ┌───────────┼──────────────────┐
//!        v           v                  v
//!  detect       missing_essentials   schedule
//!  (interactions.rs, dedup.rs)       (completeness.rs)  (schedule.rs)
//!        │           │
//!        └─────┬─────┘
//!              v
//!            rate                    (rating.rs)
//!              │
//!              v
//!          RunResult                 (metrics.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `compiled_rules.rs`: lookup indexes over the table (categories, tags).
//! - `resolve.rs`: keyword matching of ingredient labels to canonical actives.
//! - `dedup.rs`: canonical unordered pair keys.
//! - `interactions.rs`: conflict and synergy detection.
//! - `completeness.rs`: essential-category gaps.
//! - `schedule.rs`: AM/PM slot and step assignment.
//! - `rating.rs`: the 1..=5 score and its summary line.
//! - `metrics.rs`: per-stage timings for the verbose API.
//!
//! ## Debugging
//!
//! Every stage emits `tracing` events at `debug` level. The CLI enables them
//! with `DERMASCRIBE_LOG=debug`.

#[path = "engine/compiled_rules.rs"]
mod compiled_rules;
#[path = "engine/completeness.rs"]
mod completeness;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/interactions.rs"]
mod interactions;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/rating.rs"]
mod rating;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/schedule.rs"]
mod schedule;

use std::time::Instant;

use compiled_rules::CompiledRules;
pub(crate) use interactions::PairFinding;
pub use metrics::RunMetrics;
pub(crate) use metrics::RunResult;
pub use rating::{MAX_RATING, MIN_RATING};
pub(crate) use rating::summary;
pub(crate) use schedule::ScheduledStep;

use crate::routine::Product;
use crate::rules::RuleTable;

/// Runs the pipeline for one routine against one table.
///
/// Usage: `Engine::new(&rules).run_with_metrics(&routine)`.
#[derive(Debug)]
pub(crate) struct Engine<'r> {
    compiled: CompiledRules<'r>,
}

impl<'r> Engine<'r> {
    pub(crate) fn new(table: &'r RuleTable) -> Self {
        Engine { compiled: CompiledRules::new(table) }
    }

    /// Run every stage, timing each one.
    pub(crate) fn run_with_metrics<'a>(&self, routine: &'a [Product]) -> RunResult<'r, 'a> {
        let total_start = Instant::now();
        let mut metrics = RunMetrics::default();

        let start = Instant::now();
        let resolution = resolve::resolve_routine(&self.compiled, routine);
        metrics.resolve = start.elapsed();

        let start = Instant::now();
        let interactions = interactions::detect(&self.compiled, &resolution);
        metrics.interactions = start.elapsed();

        let start = Instant::now();
        let missing_essentials = completeness::missing_essentials(&self.compiled, routine);
        metrics.completeness = start.elapsed();

        let start = Instant::now();
        let schedule = schedule::schedule(&self.compiled, routine, &resolution);
        metrics.schedule = start.elapsed();

        let rating = rating::rate(interactions.conflicts.len(), missing_essentials.len());
        metrics.total = total_start.elapsed();

        tracing::debug!(
            products = routine.len(),
            actives = resolution.active_count(),
            conflicts = interactions.conflicts.len(),
            synergies = interactions.synergies.len(),
            missing = missing_essentials.len(),
            rating,
            "analysis complete"
        );

        RunResult { resolution, interactions, missing_essentials, schedule, rating, metrics }
    }
}
