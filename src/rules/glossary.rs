//! Ingredient glossary lookups over a rule table's profiles.

use std::collections::BTreeSet;

use super::table::{IngredientProfile, RuleTable};
use crate::normalize_label;

/// Find a profile by canonical key or display name (case-insensitive).
pub fn lookup<'t>(rules: &'t RuleTable, key_or_name: &str) -> Option<&'t IngredientProfile> {
    if let Some(profile) = rules.profile(key_or_name) {
        return Some(profile);
    }
    let needle = normalize_label(key_or_name);
    rules.profiles().find(|p| normalize_label(&p.key) == needle || normalize_label(&p.display_name) == needle)
}

/// Profiles whose key or display name contains `query`, optionally narrowed
/// to those targeting at least one of `concerns`. Sorted by display name.
///
/// Concerns match either their raw form (`fine_lines`) or their display
/// form (`Fine Lines`).
pub fn search<'t>(rules: &'t RuleTable, query: &str, concerns: &[&str]) -> Vec<&'t IngredientProfile> {
    let query = normalize_label(query);
    let wanted: BTreeSet<String> = concerns.iter().map(|c| concern_key(c)).collect();

    let mut hits: Vec<&IngredientProfile> = rules
        .profiles()
        .filter(|p| {
            query.is_empty()
                || normalize_label(&p.key).contains(&query)
                || normalize_label(&p.display_name).contains(&query)
        })
        .filter(|p| wanted.is_empty() || p.concerns_targeted.iter().any(|c| wanted.contains(&concern_key(c))))
        .collect();
    hits.sort_by(|a, b| a.display_name.cmp(&b.display_name).then_with(|| a.key.cmp(&b.key)));
    hits
}

/// Every concern targeted by any profile, title-cased and sorted.
pub fn all_concerns(rules: &RuleTable) -> Vec<String> {
    let set: BTreeSet<String> =
        rules.profiles().flat_map(|p| p.concerns_targeted.iter()).map(|c| concern_title(c)).collect();
    set.into_iter().collect()
}

/// `fine_lines` -> `Fine Lines`.
pub fn concern_title(raw: &str) -> String {
    title_case(&raw.replace('_', " "))
}

pub(crate) fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn concern_key(raw: &str) -> String {
    normalize_label(&raw.replace('_', " "))
}
