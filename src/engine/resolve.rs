//! Ingredient resolution.
//!
//! Maps a product's free-text ingredient labels to canonical active keys by
//! substring matching against the table's keyword aliases.
//!
//! ```text
//! ["Water", "Ethyl Ascorbic Acid", "Retinyl Palmitate"]
//!      │ normalise (lowercase, collapse whitespace)
//!      v
//! keyword "ascorbic" ⊂ "ethyl ascorbic acid"  -> vitamin_c
//! keyword "retinyl"  ⊂ "retinyl palmitate"    -> retinol
//!      │
//!      v
//! {retinol, vitamin_c}   (set: one key however many labels/keywords hit it)
//! ```

use std::collections::BTreeSet;

use super::compiled_rules::CompiledRules;
use crate::routine::Product;
use crate::{Resolution, normalize_label};

/// Canonical actives present in `product`.
pub(crate) fn resolve_product<'r>(compiled: &CompiledRules<'r>, product: &Product) -> BTreeSet<&'r str> {
    let labels: Vec<String> = product.ingredients.iter().map(|i| normalize_label(i)).collect();

    compiled
        .keywords
        .iter()
        .filter(|(keyword, _)| labels.iter().any(|label| label.contains(keyword)))
        .map(|&(_, key)| key)
        .collect()
}

/// Resolve every product in the routine, building the active -> products map.
pub(crate) fn resolve_routine<'r, 'a>(compiled: &CompiledRules<'r>, routine: &'a [Product]) -> Resolution<'r, 'a> {
    let mut resolution = Resolution::default();
    for product in routine {
        let actives = resolve_product(compiled, product);
        tracing::debug!(product = product.display_name(), actives = ?actives, "resolved");
        resolution.record(product.display_name(), actives);
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{IngredientProfile, RuleTable, defaults};

    #[test]
    fn multiple_keywords_for_one_active_yield_one_key() {
        let table = defaults::table();
        let compiled = CompiledRules::new(&table);
        let product = Product::new(
            "C Serum",
            "Brand",
            "serum",
            &["Ascorbic Acid", "Ascorbyl Glucoside", "VITAMIN C", "Tocopherol"],
        );
        let actives = resolve_product(&compiled, &product);
        assert_eq!(actives.into_iter().collect::<Vec<_>>(), vec!["vitamin_c", "vitamin_e"]);
    }

    #[test]
    fn one_label_can_match_several_keywords() {
        let table = RuleTable::builder()
            .profile(IngredientProfile::new("aha", "AHA"))
            .profile(IngredientProfile::new("bha", "BHA"))
            .keyword("glycolic", "aha")
            .keyword("salicylic", "bha")
            .finish()
            .0;
        let compiled = CompiledRules::new(&table);
        let product = Product::new("Peel", "", "treatment", &["Glycolic/Salicylic  Complex"]);
        assert_eq!(resolve_product(&compiled, &product).len(), 2);
    }

    #[test]
    fn empty_ingredients_resolve_to_nothing() {
        let table = defaults::table();
        let compiled = CompiledRules::new(&table);
        assert!(resolve_product(&compiled, &Product::default()).is_empty());
        let plain = Product::new("Water", "", "toner", &["Aqua", "Glycerin"]);
        assert!(resolve_product(&compiled, &plain).is_empty());
    }

    #[test]
    fn routine_map_lists_each_contributing_product() {
        let table = defaults::table();
        let compiled = CompiledRules::new(&table);
        let routine = vec![
            Product::new("Wash", "", "cleanser", &["Niacinamide"]),
            Product::new("Gel", "", "serum", &["Niacinamide", "Zinc PCA"]),
            Product::new("Cream", "", "moisturizer", &["Ceramide NP"]),
        ];
        let res = resolve_routine(&compiled, &routine);
        assert_eq!(res.contributors("niacinamide"), &["Wash", "Gel"]);
        assert_eq!(res.contributors("ceramides"), &["Cream"]);
        assert_eq!(res.per_product[1].len(), 1);
    }
}
