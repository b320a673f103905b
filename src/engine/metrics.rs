//! Engine run metrics.
//!
//! Timings are collected only on the verbose path (`Engine::run_with_metrics`)
//! and never feed into the analysis result, so two runs over the same input
//! still produce identical results.

use std::time::Duration;

use super::interactions::Interactions;
use super::schedule::DaySchedule;
use crate::Resolution;

/// Wall-clock time per pipeline stage.
#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    pub total: Duration,
    pub resolve: Duration,
    pub interactions: Duration,
    pub completeness: Duration,
    pub schedule: Duration,
}

/// Everything one engine run produced.
#[derive(Debug, Clone)]
pub(crate) struct RunResult<'r, 'a> {
    pub(crate) resolution: Resolution<'r, 'a>,
    pub(crate) interactions: Interactions<'r>,
    pub(crate) missing_essentials: Vec<&'r str>,
    pub(crate) schedule: DaySchedule,
    pub(crate) rating: u8,
    pub(crate) metrics: RunMetrics,
}
