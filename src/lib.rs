#[macro_use]
mod macros;
mod api;
mod engine;
pub mod error;
pub mod export;
pub mod routine;
pub mod rules;

pub use api::{
    AM_EMPTY, Analysis, AnalysisDetails, AnalysisVerbose, DEFAULT_RULES, Finding, PM_EMPTY, ProductActives, Schedule,
    ScheduleEntry, StageTimings, analyze, analyze_verbose_with, analyze_with,
};
pub use engine::{MAX_RATING, MIN_RATING};
pub use error::RuleTableError;
pub use routine::Product;
pub use rules::{LoadOptions, RuleTable};

use std::collections::{BTreeMap, BTreeSet};

// --- Internal types ---------------------------------------------------------

/// Actives discovered across one routine.
///
/// Keys borrow from the rule table (`'r`), product names from the routine
/// (`'a`). Everything here is call-local; nothing is written back to the
/// table.
#[derive(Debug, Clone, Default)]
pub(crate) struct Resolution<'r, 'a> {
    /// Canonical actives per product, indexed like the routine.
    pub per_product: Vec<BTreeSet<&'r str>>,
    /// Display name per product, indexed like the routine.
    names: Vec<&'a str>,
    /// Active -> routine indexes of the products containing it, ascending.
    contributors: BTreeMap<&'r str, Vec<usize>>,
}

impl<'r, 'a> Resolution<'r, 'a> {
    /// Record the actives found in the next product of the routine.
    pub fn record(&mut self, product_name: &'a str, actives: BTreeSet<&'r str>) {
        let index = self.names.len();
        for &active in &actives {
            self.contributors.entry(active).or_default().push(index);
        }
        self.names.push(product_name);
        self.per_product.push(actives);
    }

    /// Every active present anywhere, sorted by key.
    pub fn actives(&self) -> impl Iterator<Item = &'r str> + '_ {
        self.contributors.keys().copied()
    }

    /// Names of the products containing `active`, in routine order. Distinct
    /// products that share a name are each listed.
    pub fn contributors(&self, active: &str) -> Vec<&'a str> {
        self.contributors.get(active).map(|idx| idx.iter().map(|&i| self.names[i]).collect()).unwrap_or_default()
    }

    pub fn active_count(&self) -> usize {
        self.contributors.len()
    }
}

/// Lowercase, trim and collapse inner whitespace.
///
/// Keywords, ingredient labels and category names all go through this so
/// that `"Sodium  Hyaluronate"` still matches `"sodium hyaluronate"`.
pub(crate) fn normalize_label(raw: &str) -> String {
    regex!(r"\s+").replace_all(raw.trim(), " ").to_lowercase()
}
