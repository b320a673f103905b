//! Pairwise interaction detection.
//!
//! Given every active present in the routine, classify each unordered pair as
//! a conflict, a synergy, both, or neither.
//!
//! ```text
//! actives (sorted):  aha, niacinamide, retinol, vitamin_c
//!
//! for a in actives:
//!   for b in actives, b != a:
//!     conflict?  b ∈ a.conflicts_with  ||  a ∈ b.conflicts_with
//!     synergy?   b ∈ a.pairs_well_with ||  a ∈ b.pairs_well_with
//!     PairKey(a, b) not yet seen for that kind -> emit
//! ```
//!
//! Conflict and synergy are independent predicates. A table that declares
//! the same pair as both yields one finding of each kind.
//!
//! Actives without a profile are skipped, as are relations pointing at
//! unknown keys; both are table authoring problems, not analysis failures.

use std::collections::HashSet;

use super::compiled_rules::CompiledRules;
use super::dedup::PairKey;
use crate::Resolution;
use crate::rules::{IngredientProfile, Interaction};

/// One detected relation between two actives, in canonical orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PairFinding<'r> {
    pub(crate) kind: Interaction,
    pub(crate) pair: PairKey<'r>,
}

/// Conflicts and synergies, each in detection order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Interactions<'r> {
    pub(crate) conflicts: Vec<PairFinding<'r>>,
    pub(crate) synergies: Vec<PairFinding<'r>>,
}

pub(crate) fn detect<'r>(compiled: &CompiledRules<'r>, resolution: &Resolution<'r, '_>) -> Interactions<'r> {
    let profiled: Vec<&'r IngredientProfile> = resolution.actives().filter_map(|a| compiled.profile(a)).collect();

    let mut out = Interactions::default();
    let mut seen: HashSet<(Interaction, PairKey<'r>)> = HashSet::new();

    for &a in &profiled {
        for &b in &profiled {
            let Some(pair) = PairKey::new(a.key.as_str(), b.key.as_str()) else {
                continue;
            };

            for kind in [Interaction::Conflict, Interaction::Synergy] {
                if !declared(a, b, kind) || !seen.insert((kind, pair)) {
                    continue;
                }
                tracing::debug!(kind = kind.as_str(), low = pair.low, high = pair.high, "interaction");
                let finding = PairFinding { kind, pair };
                match kind {
                    Interaction::Conflict => out.conflicts.push(finding),
                    Interaction::Synergy => out.synergies.push(finding),
                }
            }
        }
    }

    out
}

/// Either side declaring the relation counts.
fn declared(a: &IngredientProfile, b: &IngredientProfile, kind: Interaction) -> bool {
    a.related(kind).contains(&b.key) || b.related(kind).contains(&a.key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolve::resolve_routine;
    use crate::routine::Product;
    use crate::rules::RuleTable;

    fn table() -> RuleTable {
        RuleTable::builder()
            .profile(IngredientProfile::new("retinol", "Retinol").conflicts_with(["vitamin_c", "aha"]))
            .profile(IngredientProfile::new("vitamin_c", "Vitamin C").conflicts_with(["retinol"]))
            .profile(IngredientProfile::new("aha", "AHA").pairs_well_with(["niacinamide"]))
            .profile(IngredientProfile::new("niacinamide", "Niacinamide").pairs_well_with(["aha"]))
            .keyword("retinol", "retinol")
            .keyword("ascorbic", "vitamin_c")
            .keyword("glycolic", "aha")
            .keyword("niacinamide", "niacinamide")
            .keyword("mystery", "unprofiled")
            .finish()
            .0
    }

    fn run(table: &RuleTable, routine: &[Product]) -> Vec<(Interaction, String, String)> {
        let compiled = CompiledRules::new(table);
        let res = resolve_routine(&compiled, routine);
        let found = detect(&compiled, &res);
        found
            .conflicts
            .iter()
            .chain(&found.synergies)
            .map(|f| (f.kind, f.pair.low.to_string(), f.pair.high.to_string()))
            .collect()
    }

    #[test]
    fn relation_declared_on_both_sides_is_reported_once() {
        let table = table();
        let routine =
            vec![Product::new("A", "", "serum", &["Retinol"]), Product::new("B", "", "serum", &["Ascorbic Acid"])];
        assert_eq!(run(&table, &routine), vec![(Interaction::Conflict, "retinol".into(), "vitamin_c".into())]);
    }

    #[test]
    fn relation_declared_on_one_side_is_still_found() {
        let table = table();
        // aha lists nothing against retinol; retinol lists aha.
        let routine = vec![
            Product::new("Peel", "", "treatment", &["Glycolic Acid"]),
            Product::new("R", "", "serum", &["Retinol"]),
        ];
        assert_eq!(run(&table, &routine), vec![(Interaction::Conflict, "aha".into(), "retinol".into())]);
    }

    #[test]
    fn conflict_and_synergy_are_independent() {
        let table = RuleTable::builder()
            .profile(IngredientProfile::new("x", "X").conflicts_with(["y"]).pairs_well_with(["y"]))
            .profile(IngredientProfile::new("y", "Y"))
            .keyword("x", "x")
            .keyword("y", "y")
            .finish()
            .0;
        let routine = vec![Product::new("XY", "", "serum", &["x", "y"])];
        assert_eq!(
            run(&table, &routine),
            vec![(Interaction::Conflict, "x".into(), "y".into()), (Interaction::Synergy, "x".into(), "y".into())]
        );
    }

    #[test]
    fn unprofiled_actives_and_single_actives_are_skipped() {
        let table = table();
        let routine = vec![Product::new("M", "", "serum", &["Mystery Extract", "Retinol"])];
        assert!(run(&table, &routine).is_empty());
        assert!(run(&table, &[]).is_empty());
    }
}
