//! Essential category check.

use std::collections::HashSet;

use super::compiled_rules::CompiledRules;
use crate::routine::Product;

/// Essential categories absent from `routine`, in table declaration order.
pub(crate) fn missing_essentials<'r>(compiled: &CompiledRules<'r>, routine: &[Product]) -> Vec<&'r str> {
    let present: HashSet<String> = routine.iter().filter_map(Product::category_key).collect();

    compiled
        .table
        .categories()
        .iter()
        .filter(|(name, rule)| rule.essential && !present.contains(name))
        .map(|(name, _)| name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::defaults;

    #[test]
    fn reports_absent_essentials_in_declaration_order() {
        let table = defaults::table();
        let compiled = CompiledRules::new(&table);
        let routine = vec![Product::new("Serum", "", "serum", &[])];
        assert_eq!(missing_essentials(&compiled, &routine), vec!["cleanser", "moisturizer", "sunscreen"]);
    }

    #[test]
    fn category_match_is_case_insensitive() {
        let table = defaults::table();
        let compiled = CompiledRules::new(&table);
        let routine = vec![
            Product::new("Wash", "", "Cleanser", &[]),
            Product::new("Cream", "", "MOISTURIZER", &[]),
            Product::new("SPF", "", " sunscreen ", &[]),
        ];
        assert!(missing_essentials(&compiled, &routine).is_empty());
    }

    #[test]
    fn empty_routine_misses_every_essential() {
        let table = defaults::table();
        let compiled = CompiledRules::new(&table);
        assert_eq!(missing_essentials(&compiled, &[]).len(), 3);
    }
}
