//! AM/PM routine scheduling.
//!
//! Each product starts from its category rule (or the fallback rule) and then
//! passes through a fixed-priority override chain:
//!
//! ```text
//!                 category == sunscreen ──▶ AM only, step 10, pinned last
//!                        │ no
//!                        v
//! category rule ──▶ photosensitizing active? ──▶ PM only
//!                        │ no
//!                        v
//!                 antioxidant-acid active and rule not PM-only? ──▶ AM only
//!                        │ no
//!                        v
//!                 category rule unchanged (AM, PM or both)
//! ```
//!
//! The first matching branch wins; there are no further transitions. A
//! product emits one entry per slot of its final time value, with the same
//! step in both slots. Each slot is then ordered by `(pinned_last, step)`
//! with a stable sort, so equal steps keep routine order.
//!
//! A pinned sunscreen entry takes the highest step in the morning: if the
//! table places another category after step 10, sunscreen moves up to that
//! step so the sequence still reads in ascending step order.

use super::compiled_rules::CompiledRules;
use crate::Resolution;
use crate::routine::Product;
use crate::rules::{ActiveTags, SUNSCREEN_CATEGORY, SUNSCREEN_STEP, Slot, TimeOfDay};

/// Which branch of the override chain decided a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Sunscreen,
    Photosensitizer,
    AntioxidantAcid,
    CategoryDefault,
}

/// Final slot assignment for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Assignment {
    pub(crate) time: TimeOfDay,
    pub(crate) step: i32,
    pub(crate) placement: Placement,
}

impl Assignment {
    fn pinned_last(&self) -> bool {
        self.placement == Placement::Sunscreen
    }
}

/// One product in one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScheduledStep {
    pub(crate) product: usize,
    pub(crate) step: i32,
    pinned_last: bool,
}

/// Ordered AM and PM sequences. `product` indexes into the routine.
#[derive(Debug, Clone, Default)]
pub(crate) struct DaySchedule {
    pub(crate) am: Vec<ScheduledStep>,
    pub(crate) pm: Vec<ScheduledStep>,
}

impl DaySchedule {
    pub(crate) fn slot(&self, slot: Slot) -> &[ScheduledStep] {
        match slot {
            Slot::Am => &self.am,
            Slot::Pm => &self.pm,
        }
    }
}

/// Run the override chain for one product.
pub(crate) fn assign(compiled: &CompiledRules<'_>, category: Option<&str>, tags: ActiveTags) -> Assignment {
    let rule = compiled.category_rule(category);

    if category == Some(SUNSCREEN_CATEGORY) {
        return Assignment { time: TimeOfDay::Am, step: SUNSCREEN_STEP, placement: Placement::Sunscreen };
    }
    if tags.contains(ActiveTags::PHOTOSENSITIZING) {
        return Assignment { time: TimeOfDay::Pm, step: rule.step, placement: Placement::Photosensitizer };
    }
    if tags.contains(ActiveTags::ANTIOXIDANT_ACID) && rule.time != TimeOfDay::Pm {
        return Assignment { time: TimeOfDay::Am, step: rule.step, placement: Placement::AntioxidantAcid };
    }
    Assignment { time: rule.time, step: rule.step, placement: Placement::CategoryDefault }
}

pub(crate) fn schedule(
    compiled: &CompiledRules<'_>,
    routine: &[Product],
    resolution: &Resolution<'_, '_>,
) -> DaySchedule {
    let mut out = DaySchedule::default();

    for (idx, (product, actives)) in routine.iter().zip(&resolution.per_product).enumerate() {
        let category = product.category_key();
        let tags = compiled.tags_of(actives.iter().copied());
        let assignment = assign(compiled, category.as_deref(), tags);

        tracing::debug!(
            product = product.display_name(),
            time = assignment.time.as_str(),
            step = assignment.step,
            placement = ?assignment.placement,
            "scheduled"
        );

        for slot in assignment.time.slots() {
            let entry = ScheduledStep { product: idx, step: assignment.step, pinned_last: assignment.pinned_last() };
            match slot {
                Slot::Am => out.am.push(entry),
                Slot::Pm => out.pm.push(entry),
            }
        }
    }

    out.am.sort_by_key(|s| (s.pinned_last, s.step));
    out.pm.sort_by_key(|s| (s.pinned_last, s.step));

    let latest = out.am.iter().filter(|s| !s.pinned_last).map(|s| s.step).max();
    if let Some(latest) = latest {
        for entry in out.am.iter_mut().filter(|s| s.pinned_last && s.step < latest) {
            tracing::debug!(from = entry.step, to = latest, "sunscreen step raised to close the morning");
            entry.step = latest;
        }
    }
    out
}
