//! Rule table indexing.
//!
//! `RuleTable` stores rules the way they were declared. A run needs a few
//! different views of the same data: category lookup by normalised name,
//! tag masks by active key, and the keyword list. `CompiledRules` builds those
//! once per run so the stages below never rescan the table.
//!
//! ## Invariants
//!
//! - Everything here borrows from the table; nothing is copied or mutated, so
//!   one `RuleTable` can back any number of concurrent runs.
//! - `categories` and `tags` are derived purely from the table; a product's
//!   category that is not in `categories` gets `fallback`.

use std::collections::HashMap;

use crate::rules::{ActiveTags, CategoryRule, IngredientProfile, RuleTable};

/// Indexed, borrowed view of a [`RuleTable`].
#[derive(Debug)]
pub struct CompiledRules<'r> {
    pub table: &'r RuleTable,
    /// `(keyword, canonical key)`, already normalised by the table builder.
    pub keywords: Vec<(&'r str, &'r str)>,
    pub categories: HashMap<&'r str, CategoryRule>,
    pub tags: HashMap<&'r str, ActiveTags>,
    pub fallback: CategoryRule,
}

impl<'r> CompiledRules<'r> {
    pub fn new(table: &'r RuleTable) -> Self {
        let keywords = table.keywords().iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let categories = table.categories().iter().map(|(name, rule)| (name.as_str(), *rule)).collect();
        let tags = table.profiles().filter(|p| !p.tags.is_empty()).map(|p| (p.key.as_str(), p.tags)).collect();

        CompiledRules { table, keywords, categories, tags, fallback: table.fallback_category() }
    }

    pub fn profile(&self, key: &str) -> Option<&'r IngredientProfile> {
        self.table.profile(key)
    }

    /// Category rule for an already-normalised category name, or the fallback.
    pub fn category_rule(&self, category: Option<&str>) -> CategoryRule {
        category.and_then(|c| self.categories.get(c).copied()).unwrap_or(self.fallback)
    }

    /// Union of the tags of `actives`.
    pub fn tags_of<'k>(&self, actives: impl IntoIterator<Item = &'k str>) -> ActiveTags {
        actives.into_iter().filter_map(|a| self.tags.get(a).copied()).fold(ActiveTags::empty(), |acc, t| acc | t)
    }
}
