//! Typed rule table records.
//!
//! The rule table is the declarative half of the engine: ingredient profiles
//! with their pairwise relations, keyword aliases used to recognise actives in
//! free-text ingredient labels, and per-category scheduling defaults.
//!
//! A `RuleTable` is immutable once built. Construction goes through
//! [`RuleTableBuilder`], which normalises keys, keeps category declaration
//! order and collects [`ValidationIssue`]s for the loader to report.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RuleTableError;
use crate::normalize_label;

/// Category that is always pinned to the end of the morning sequence.
pub const SUNSCREEN_CATEGORY: &str = "sunscreen";

/// Step assigned to sunscreen regardless of its category rule.
pub const SUNSCREEN_STEP: i32 = 10;

/// Scheduling used for products whose category the table does not know.
pub const FALLBACK_CATEGORY: CategoryRule = CategoryRule { step: 5, time: TimeOfDay::Both, essential: false };

bitflags::bitflags! {
    /// Behavioural tags an ingredient profile can declare.
    ///
    /// The scheduler reads these to decide slot overrides, so a table can
    /// mark a new active as photosensitizing without touching code.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActiveTags: u8 {
        const PHOTOSENSITIZING = 1 << 0;
        const ANTIOXIDANT_ACID = 1 << 1;
    }
}

impl ActiveTags {
    /// Parse a tag name as written in a rule table source.
    pub fn from_tag(name: &str) -> Option<Self> {
        match normalize_label(name).replace([' ', '-'], "_").as_str() {
            "photosensitizing" | "photosensitising" => Some(ActiveTags::PHOTOSENSITIZING),
            "antioxidant_acid" => Some(ActiveTags::ANTIOXIDANT_ACID),
            _ => None,
        }
    }

    pub fn names(self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.contains(ActiveTags::PHOTOSENSITIZING) {
            out.push("photosensitizing");
        }
        if self.contains(ActiveTags::ANTIOXIDANT_ACID) {
            out.push("antioxidant_acid");
        }
        out
    }
}

/// A single application slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Am => "AM",
            Slot::Pm => "PM",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-of-day value of a category rule: one slot or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    Am,
    Pm,
    Both,
}

impl TimeOfDay {
    /// Parse `"AM"`, `"PM"` or `"AM/PM"` (case and whitespace insensitive;
    /// `"PM/AM"` is accepted as well).
    pub fn parse(raw: &str) -> Option<Self> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_ascii_uppercase();
        match compact.as_str() {
            "AM" => Some(TimeOfDay::Am),
            "PM" => Some(TimeOfDay::Pm),
            "AM/PM" | "PM/AM" => Some(TimeOfDay::Both),
            _ => None,
        }
    }

    /// Slots this value emits into, AM first.
    pub fn slots(self) -> &'static [Slot] {
        match self {
            TimeOfDay::Am => &[Slot::Am],
            TimeOfDay::Pm => &[Slot::Pm],
            TimeOfDay::Both => &[Slot::Am, Slot::Pm],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Am => "AM",
            TimeOfDay::Pm => "PM",
            TimeOfDay::Both => "AM/PM",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of pairwise relation between two actives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interaction {
    Conflict,
    Synergy,
}

impl Interaction {
    pub fn as_str(self) -> &'static str {
        match self {
            Interaction::Conflict => "conflicts_with",
            Interaction::Synergy => "pairs_well_with",
        }
    }
}

/// Scheduling defaults for one product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRule {
    pub step: i32,
    pub time: TimeOfDay,
    pub essential: bool,
}

impl CategoryRule {
    pub fn new(step: i32, time: TimeOfDay) -> Self {
        CategoryRule { step, time, essential: false }
    }

    pub fn essential(mut self) -> Self {
        self.essential = true;
        self
    }
}

/// Display metadata and relations for one canonical active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientProfile {
    pub key: String,
    pub display_name: String,
    pub conflicts_with: BTreeSet<String>,
    pub pairs_well_with: BTreeSet<String>,
    pub tags: ActiveTags,
    /// Glossary classification, e.g. "retinoid" or "humectant".
    pub kind: Option<String>,
    pub description: Option<String>,
    pub warning: Option<String>,
    pub best_time: Option<String>,
    pub concerns_targeted: Vec<String>,
}

impl IngredientProfile {
    pub fn new(key: &str, display_name: &str) -> Self {
        IngredientProfile {
            key: key.to_string(),
            display_name: display_name.to_string(),
            conflicts_with: BTreeSet::new(),
            pairs_well_with: BTreeSet::new(),
            tags: ActiveTags::empty(),
            kind: None,
            description: None,
            warning: None,
            best_time: None,
            concerns_targeted: Vec::new(),
        }
    }

    pub fn conflicts_with<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.conflicts_with.extend(keys.into_iter().map(|k| k.as_ref().to_string()));
        self
    }

    pub fn pairs_well_with<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pairs_well_with.extend(keys.into_iter().map(|k| k.as_ref().to_string()));
        self
    }

    pub fn tagged(mut self, tags: ActiveTags) -> Self {
        self.tags |= tags;
        self
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn warning(mut self, text: &str) -> Self {
        self.warning = Some(text.to_string());
        self
    }

    pub fn best_time(mut self, text: &str) -> Self {
        self.best_time = Some(text.to_string());
        self
    }

    pub fn concerns<I, S>(mut self, concerns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.concerns_targeted.extend(concerns.into_iter().map(|c| c.as_ref().to_string()));
        self
    }

    /// Relation set for `interaction`.
    pub fn related(&self, interaction: Interaction) -> &BTreeSet<String> {
        match interaction {
            Interaction::Conflict => &self.conflicts_with,
            Interaction::Synergy => &self.pairs_well_with,
        }
    }
}

/// A problem found while building a rule table.
///
/// None of these stop analysis: dangling references are skipped at run time.
/// The loader decides whether they are fatal (strict mode) or merely logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    DanglingReference { from: String, to: String, interaction: Interaction },
    SelfReference { key: String, interaction: Interaction },
    UnknownKeywordTarget { keyword: String, key: String },
    UnknownTag { key: String, tag: String },
    EmptyKeyword { key: String },
    StepAfterSunscreen { category: String, step: i32 },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::DanglingReference { from, to, interaction } => {
                write!(f, "'{from}' {} unknown ingredient '{to}'", interaction.as_str())
            }
            ValidationIssue::SelfReference { key, interaction } => {
                write!(f, "'{key}' lists itself in {}", interaction.as_str())
            }
            ValidationIssue::UnknownKeywordTarget { keyword, key } => {
                write!(f, "keyword '{keyword}' maps to '{key}', which has no ingredient profile")
            }
            ValidationIssue::UnknownTag { key, tag } => write!(f, "'{key}' declares unknown tag '{tag}'"),
            ValidationIssue::EmptyKeyword { key } => write!(f, "empty keyword mapped to '{key}'"),
            ValidationIssue::StepAfterSunscreen { category, step } => {
                write!(f, "category '{category}' uses step {step}, after sunscreen (step {SUNSCREEN_STEP})")
            }
        }
    }
}

/// Whether validation issues reject a table or are only reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub strict: bool,
}

impl LoadOptions {
    pub fn strict() -> Self {
        LoadOptions { strict: true }
    }
}

/// Immutable rule table shared by every analysis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    profiles: BTreeMap<String, IngredientProfile>,
    keywords: Vec<(String, String)>,
    categories: Vec<(String, CategoryRule)>,
    fallback: CategoryRule,
}

impl RuleTable {
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    pub fn profile(&self, key: &str) -> Option<&IngredientProfile> {
        self.profiles.get(key)
    }

    /// Profiles ordered by canonical key.
    pub fn profiles(&self) -> impl Iterator<Item = &IngredientProfile> {
        self.profiles.values()
    }

    /// `(keyword, canonical key)` pairs, keyword already lowercased.
    pub fn keywords(&self) -> &[(String, String)] {
        &self.keywords
    }

    /// Category rules in declaration order.
    pub fn categories(&self) -> &[(String, CategoryRule)] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&CategoryRule> {
        let name = normalize_label(name);
        self.categories.iter().find(|(n, _)| *n == name).map(|(_, rule)| rule)
    }

    pub fn fallback_category(&self) -> CategoryRule {
        self.fallback
    }

    /// Display name for `key`, falling back to the key itself.
    pub fn display_name<'t>(&'t self, key: &'t str) -> &'t str {
        self.profiles.get(key).map(|p| p.display_name.as_str()).unwrap_or(key)
    }
}

/// Incremental constructor for [`RuleTable`].
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    profiles: BTreeMap<String, IngredientProfile>,
    keywords: Vec<(String, String)>,
    categories: Vec<(String, CategoryRule)>,
    fallback: Option<CategoryRule>,
    issues: Vec<ValidationIssue>,
}

impl RuleTableBuilder {
    pub fn profile(mut self, profile: IngredientProfile) -> Self {
        self.profiles.insert(profile.key.clone(), profile);
        self
    }

    pub fn keyword(mut self, keyword: &str, key: &str) -> Self {
        self.keywords.push((keyword.to_string(), key.to_string()));
        self
    }

    /// Add a category rule. Redeclaring a category replaces the earlier rule
    /// but keeps its original position.
    pub fn category(mut self, name: &str, rule: CategoryRule) -> Self {
        let name = normalize_label(name);
        match self.categories.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = rule,
            None => self.categories.push((name, rule)),
        }
        self
    }

    pub fn fallback_category(mut self, rule: CategoryRule) -> Self {
        self.fallback = Some(rule);
        self
    }

    /// Record an issue found by a loader before the table is assembled.
    pub fn note(mut self, issue: ValidationIssue) -> Self {
        self.issues.push(issue);
        self
    }

    /// Assemble the table and return every issue found along the way.
    ///
    /// Empty keywords are dropped (they would match every ingredient).
    pub fn finish(self) -> (RuleTable, Vec<ValidationIssue>) {
        let RuleTableBuilder { profiles, keywords, categories, fallback, mut issues } = self;

        let mut normalized: Vec<(String, String)> = Vec::with_capacity(keywords.len());
        for (keyword, key) in keywords {
            let keyword = normalize_label(&keyword);
            if keyword.is_empty() {
                issues.push(ValidationIssue::EmptyKeyword { key });
                continue;
            }
            if !profiles.contains_key(&key) {
                issues.push(ValidationIssue::UnknownKeywordTarget { keyword: keyword.clone(), key: key.clone() });
            }
            if !normalized.iter().any(|(k, v)| *k == keyword && *v == key) {
                normalized.push((keyword, key));
            }
        }

        for profile in profiles.values() {
            for interaction in [Interaction::Conflict, Interaction::Synergy] {
                for other in profile.related(interaction) {
                    if *other == profile.key {
                        issues.push(ValidationIssue::SelfReference { key: profile.key.clone(), interaction });
                    } else if !profiles.contains_key(other) {
                        issues.push(ValidationIssue::DanglingReference {
                            from: profile.key.clone(),
                            to: other.clone(),
                            interaction,
                        });
                    }
                }
            }
        }

        for (name, rule) in &categories {
            if name != SUNSCREEN_CATEGORY && rule.step > SUNSCREEN_STEP {
                issues.push(ValidationIssue::StepAfterSunscreen { category: name.clone(), step: rule.step });
            }
        }

        let table =
            RuleTable { profiles, keywords: normalized, categories, fallback: fallback.unwrap_or(FALLBACK_CATEGORY) };
        (table, issues)
    }

    /// Assemble the table, applying `options` to the collected issues.
    ///
    /// An empty keyword is always an error. Other issues are logged in
    /// lenient mode and rejected in strict mode.
    pub fn build(self, options: &LoadOptions) -> Result<RuleTable, RuleTableError> {
        let (table, issues) = self.finish();

        if let Some(ValidationIssue::EmptyKeyword { key }) =
            issues.iter().find(|i| matches!(i, ValidationIssue::EmptyKeyword { .. }))
        {
            return Err(RuleTableError::EmptyKeyword { key: key.clone() });
        }

        if issues.is_empty() {
            return Ok(table);
        }
        if options.strict {
            return Err(RuleTableError::Validation(issues));
        }
        for issue in &issues {
            tracing::warn!("rule table: {issue}");
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_actives() -> RuleTableBuilder {
        RuleTable::builder()
            .profile(IngredientProfile::new("retinol", "Retinol").conflicts_with(["vitamin_c"]))
            .profile(IngredientProfile::new("vitamin_c", "Vitamin C"))
    }

    #[test]
    fn time_of_day_parsing_is_lenient_about_case_and_spacing() {
        assert_eq!(TimeOfDay::parse("am"), Some(TimeOfDay::Am));
        assert_eq!(TimeOfDay::parse(" PM "), Some(TimeOfDay::Pm));
        assert_eq!(TimeOfDay::parse("AM / PM"), Some(TimeOfDay::Both));
        assert_eq!(TimeOfDay::parse("pm/am"), Some(TimeOfDay::Both));
        assert_eq!(TimeOfDay::parse("noon"), None);
        assert_eq!(TimeOfDay::Both.slots(), &[Slot::Am, Slot::Pm]);
    }

    #[test]
    fn tags_parse_from_source_text() {
        assert_eq!(ActiveTags::from_tag("Photosensitizing"), Some(ActiveTags::PHOTOSENSITIZING));
        assert_eq!(ActiveTags::from_tag("antioxidant-acid"), Some(ActiveTags::ANTIOXIDANT_ACID));
        assert_eq!(ActiveTags::from_tag("sparkly"), None);
        // The generated constant-name lookup stays available alongside it.
        assert_eq!(ActiveTags::from_name("PHOTOSENSITIZING"), Some(ActiveTags::PHOTOSENSITIZING));
        assert_eq!(ActiveTags::from_name("photosensitizing"), None);
        assert_eq!(ActiveTags::all().names(), vec!["photosensitizing", "antioxidant_acid"]);
    }

    #[test]
    fn clean_table_has_no_issues() {
        let (table, issues) = two_actives().keyword("Retinol", "retinol").finish();
        assert!(issues.is_empty(), "{issues:?}");
        assert_eq!(table.keywords(), &[("retinol".to_string(), "retinol".to_string())]);
        assert_eq!(table.display_name("vitamin_c"), "Vitamin C");
        assert_eq!(table.display_name("mystery"), "mystery");
    }

    #[test]
    fn dangling_and_self_references_are_reported() {
        let (_, issues) = RuleTable::builder()
            .profile(IngredientProfile::new("retinol", "Retinol").conflicts_with(["ghost", "retinol"]))
            .finish();
        assert!(issues.contains(&ValidationIssue::DanglingReference {
            from: "retinol".into(),
            to: "ghost".into(),
            interaction: Interaction::Conflict,
        }));
        let self_ref = ValidationIssue::SelfReference { key: "retinol".into(), interaction: Interaction::Conflict };
        assert!(issues.contains(&self_ref));
    }

    #[test]
    fn strict_build_rejects_issues_and_lenient_build_keeps_table() {
        let builder = || two_actives().keyword("niacinamide", "niacinamide");
        assert!(matches!(builder().build(&LoadOptions::strict()), Err(RuleTableError::Validation(_))));
        let table = builder().build(&LoadOptions::default()).unwrap();
        assert_eq!(table.keywords().len(), 1);
    }

    #[test]
    fn empty_keyword_is_always_rejected() {
        let result = two_actives().keyword("   ", "retinol").build(&LoadOptions::default());
        assert!(matches!(result, Err(RuleTableError::EmptyKeyword { key }) if key == "retinol"));
    }

    #[test]
    fn categories_keep_declaration_order_and_normalise_names() {
        let table = RuleTable::builder()
            .category("Sunscreen", CategoryRule::new(SUNSCREEN_STEP, TimeOfDay::Am).essential())
            .category("cleanser", CategoryRule::new(1, TimeOfDay::Both).essential())
            .category("  Eye   Cream ", CategoryRule::new(6, TimeOfDay::Both))
            .category("SUNSCREEN", CategoryRule::new(9, TimeOfDay::Am).essential())
            .finish()
            .0;
        let names: Vec<&str> = table.categories().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["sunscreen", "cleanser", "eye cream"]);
        assert_eq!(table.category("Eye Cream").map(|r| r.step), Some(6));
        assert_eq!(table.category("sunscreen").map(|r| r.step), Some(9));
        assert_eq!(table.fallback_category(), FALLBACK_CATEGORY);
    }

    #[test]
    fn late_steps_are_flagged() {
        let (_, issues) = RuleTable::builder().category("night balm", CategoryRule::new(12, TimeOfDay::Pm)).finish();
        assert_eq!(issues, vec![ValidationIssue::StepAfterSunscreen { category: "night balm".into(), step: 12 }]);
    }
}
