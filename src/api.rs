use crate::engine::{self, Engine, PairFinding, RunResult, ScheduledStep};
use crate::routine::Product;
use crate::rules::glossary::title_case;
use crate::rules::{Interaction, RuleTable, Slot, defaults};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::engine::RunMetrics as StageTimings;

/// Built-in rule table, built on first use and shared by every call.
pub static DEFAULT_RULES: Lazy<RuleTable> = Lazy::new(defaults::table);

/// Rendered AM sequence when no product lands in the morning.
pub const AM_EMPTY: &str = "No products suggested for AM.";
/// Rendered PM sequence when no product lands in the evening.
pub const PM_EMPTY: &str = "No products suggested for PM.";

const STEP_SEPARATOR: &str = " → ";
const COMPLETE_GAP_ANALYSIS: &str = "Routine appears complete regarding essential steps.";

/// A conflict or synergy between two actives.
///
/// `active_a` is always the lexicographically smaller key, so the same pair
/// is reported the same way whichever side of the table declared it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: Interaction,
    pub active_a: String,
    pub active_b: String,
    pub display_a: String,
    pub display_b: String,
    /// Products containing `active_a`, in routine order.
    pub products_a: Vec<String>,
    /// Products containing `active_b`, in routine order.
    pub products_b: Vec<String>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, verb) = match self.kind {
            Interaction::Conflict => ("Conflict", "conflicts with"),
            Interaction::Synergy => ("Synergy", "pairs well with"),
        };
        write!(
            f,
            "{label}: '{}' (in {}) {verb} '{}' (in {}).",
            self.display_a,
            self.products_a.join(", "),
            self.display_b,
            self.products_b.join(", ")
        )
    }
}

/// One product placed in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub product_name: String,
    pub step: i32,
    pub slot: Slot,
}

/// Ordered morning and evening sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub am: Vec<ScheduleEntry>,
    pub pm: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn slot(&self, slot: Slot) -> &[ScheduleEntry] {
        match slot {
            Slot::Am => &self.am,
            Slot::Pm => &self.pm,
        }
    }

    /// Product names joined in application order, or the slot's
    /// "no products" sentinel when the slot is empty.
    pub fn render(&self, slot: Slot) -> String {
        let entries = self.slot(slot);
        if entries.is_empty() {
            return match slot {
                Slot::Am => AM_EMPTY,
                Slot::Pm => PM_EMPTY,
            }
            .to_string();
        }
        entries.iter().map(|e| e.product_name.as_str()).collect::<Vec<_>>().join(STEP_SEPARATOR)
    }
}

/// Result of analysing one routine.
///
/// Every field is a deterministic function of the routine and the rule
/// table; analysing the same input twice yields equal values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Overall score in `1..=5`.
    pub rating: u8,
    pub summary: String,
    pub conflicts: Vec<String>,
    pub synergies: Vec<String>,
    /// Essential categories absent from the routine, in table order.
    pub missing_essentials: Vec<String>,
    pub gap_analysis: String,
    pub am_routine: String,
    pub pm_routine: String,
    /// Display names of every active present, each listed once.
    pub active_ingredients: Vec<String>,
    pub findings: Vec<Finding>,
    pub schedule: Schedule,
}

impl Analysis {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_essentials.is_empty()
    }
}

/// Actives resolved for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductActives {
    pub product: String,
    pub actives: Vec<String>,
}

/// Additional details returned by [`analyze_verbose_with`].
#[derive(Debug, Clone)]
pub struct AnalysisDetails {
    pub products: Vec<ProductActives>,
    /// Active key -> products containing it.
    pub contributors: Vec<(String, Vec<String>)>,
    pub timings: StageTimings,
}

/// Result from [`analyze_verbose_with`].
#[derive(Debug, Clone)]
pub struct AnalysisVerbose {
    pub analysis: Analysis,
    pub details: AnalysisDetails,
}

/// Analyse `routine` against the built-in rule table.
///
/// # Example
/// ```
/// use dermascribe::{Product, analyze};
///
/// let routine = vec![
///     Product::new("Night Serum", "Acme", "serum", &["Retinol"]),
///     Product::new("Day Serum", "Acme", "serum", &["Ascorbic Acid"]),
/// ];
/// let out = analyze(&routine);
/// assert_eq!(out.conflicts.len(), 1);
/// assert!((1..=5).contains(&out.rating));
/// ```
pub fn analyze(routine: &[Product]) -> Analysis {
    analyze_with(routine, &DEFAULT_RULES)
}

/// Analyse `routine` against `rules`.
///
/// Never fails: missing names, unknown categories and empty ingredient lists
/// fall back to documented defaults.
pub fn analyze_with(routine: &[Product], rules: &RuleTable) -> Analysis {
    let engine = Engine::new(rules);
    let run = engine.run_with_metrics(routine);
    to_analysis(rules, routine, &run)
}

/// Analyse `routine` and also return per-product actives and stage timings.
pub fn analyze_verbose_with(routine: &[Product], rules: &RuleTable) -> AnalysisVerbose {
    let engine = Engine::new(rules);
    let run = engine.run_with_metrics(routine);
    let analysis = to_analysis(rules, routine, &run);

    let products: Vec<ProductActives> = routine
        .iter()
        .zip(&run.resolution.per_product)
        .map(|(p, actives)| ProductActives {
            product: p.display_name().to_string(),
            actives: actives.iter().map(|a| a.to_string()).collect(),
        })
        .collect();
    let contributors: Vec<(String, Vec<String>)> = run
        .resolution
        .actives()
        .map(|a| (a.to_string(), run.resolution.contributors(a).into_iter().map(str::to_string).collect()))
        .collect();

    AnalysisVerbose { analysis, details: AnalysisDetails { products, contributors, timings: run.metrics.clone() } }
}

fn to_analysis(rules: &RuleTable, routine: &[Product], run: &RunResult<'_, '_>) -> Analysis {
    let conflicts: Vec<Finding> = run.interactions.conflicts.iter().map(|f| to_finding(rules, run, f)).collect();
    let synergies: Vec<Finding> = run.interactions.synergies.iter().map(|f| to_finding(rules, run, f)).collect();

    let missing_essentials: Vec<String> = run.missing_essentials.iter().map(|c| c.to_string()).collect();
    let gap_analysis = if missing_essentials.is_empty() {
        COMPLETE_GAP_ANALYSIS.to_string()
    } else {
        let titled: Vec<String> = missing_essentials.iter().map(|c| title_case(c)).collect();
        format!("Missing essentials: {}", titled.join(", "))
    };

    let schedule = Schedule {
        am: to_entries(routine, run.schedule.slot(Slot::Am), Slot::Am),
        pm: to_entries(routine, run.schedule.slot(Slot::Pm), Slot::Pm),
    };

    Analysis {
        rating: run.rating,
        summary: engine::summary(run.rating).to_string(),
        conflicts: conflicts.iter().map(|f| f.to_string()).collect(),
        synergies: synergies.iter().map(|f| f.to_string()).collect(),
        missing_essentials,
        gap_analysis,
        am_routine: schedule.render(Slot::Am),
        pm_routine: schedule.render(Slot::Pm),
        active_ingredients: run.resolution.actives().map(|a| rules.display_name(a).to_string()).collect(),
        findings: conflicts.into_iter().chain(synergies).collect(),
        schedule,
    }
}

fn to_finding(rules: &RuleTable, run: &RunResult<'_, '_>, finding: &PairFinding<'_>) -> Finding {
    let (a, b) = (finding.pair.low, finding.pair.high);
    let names =
        |key: &str| -> Vec<String> { run.resolution.contributors(key).into_iter().map(str::to_string).collect() };
    Finding {
        kind: finding.kind,
        active_a: a.to_string(),
        active_b: b.to_string(),
        display_a: rules.display_name(a).to_string(),
        display_b: rules.display_name(b).to_string(),
        products_a: names(a),
        products_b: names(b),
    }
}

fn to_entries(routine: &[Product], steps: &[ScheduledStep], slot: Slot) -> Vec<ScheduleEntry> {
    steps
        .iter()
        .map(|s| ScheduleEntry { product_name: routine[s.product].display_name().to_string(), step: s.step, slot })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routine() -> Vec<Product> {
        vec![
            Product::new("Gentle Wash", "A", "cleanser", &["Aqua", "Glycerin"]),
            Product::new("Night Serum", "B", "serum", &["Squalane", "Retinol"]),
            Product::new("Day Serum", "C", "serum", &["Ascorbic Acid", "Tocopherol"]),
            Product::new("Barrier Cream", "D", "moisturizer", &["Ceramide NP", "Niacinamide"]),
        ]
    }

    #[test]
    fn analyze_reports_conflict_synergy_gap_and_schedule() {
        let out = analyze(&routine());

        assert_eq!(
            out.conflicts,
            vec!["Conflict: 'Retinol' (in Night Serum) conflicts with 'Vitamin C' (in Day Serum).".to_string()]
        );
        assert!(out.synergies.contains(
            &"Synergy: 'Vitamin C' (in Day Serum) pairs well with 'Vitamin E' (in Day Serum).".to_string()
        ));
        assert_eq!(out.missing_essentials, vec!["sunscreen"]);
        assert_eq!(out.gap_analysis, "Missing essentials: Sunscreen");
        assert_eq!(out.rating, 2);
        assert_eq!(out.summary, "Your routine has some potential conflicts or gaps.");
        assert_eq!(out.am_routine, "Gentle Wash → Day Serum → Barrier Cream");
        assert_eq!(out.pm_routine, "Gentle Wash → Night Serum → Barrier Cream");
        assert_eq!(out.findings.len(), out.conflicts.len() + out.synergies.len());
    }

    #[test]
    fn active_ingredients_use_display_names_in_key_order() {
        let out = analyze(&routine());
        assert_eq!(out.active_ingredients, vec!["Ceramides", "Niacinamide", "Retinol", "Vitamin C", "Vitamin E"]);
    }

    #[test]
    fn empty_routine_renders_sentinels() {
        let out = analyze(&[]);
        assert_eq!(out.am_routine, AM_EMPTY);
        assert_eq!(out.pm_routine, PM_EMPTY);
        assert!(out.conflicts.is_empty() && out.synergies.is_empty());
        assert_eq!(out.rating, 4);
        assert!(!out.is_complete());
    }

    #[test]
    fn verbose_exposes_per_product_actives() {
        let res = analyze_verbose_with(&routine(), &DEFAULT_RULES);
        assert_eq!(res.details.products.len(), 4);
        assert_eq!(res.details.products[1].actives, vec!["retinol"]);
        assert!(res.details.contributors.iter().any(|(k, names)| k == "niacinamide" && names == &["Barrier Cream"]));
        assert!(res.details.timings.resolve <= res.details.timings.total);
        assert_eq!(res.analysis, analyze(&routine()));
    }

    #[test]
    fn unnamed_products_are_each_listed_in_a_finding() {
        let routine = vec![
            Product::new("", "A", "serum", &["Retinol"]),
            Product::new("", "B", "serum", &["Retinyl Palmitate"]),
            Product::new("Day Serum", "C", "serum", &["Ascorbic Acid"]),
        ];
        let out = analyze(&routine);
        assert_eq!(
            out.conflicts,
            vec![
                "Conflict: 'Retinol' (in Unknown Product, Unknown Product) conflicts with 'Vitamin C' (in Day Serum)."
                    .to_string()
            ]
        );
    }

    #[test]
    fn analysis_serialises_to_json() {
        let out = analyze(&routine());
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["rating"], 2);
        assert_eq!(json["schedule"]["am"][0]["slot"], "AM");
        assert_eq!(json["findings"][0]["kind"], "conflict");
        let back: Analysis = serde_json::from_value(json).unwrap();
        assert_eq!(back, out);
    }
}
