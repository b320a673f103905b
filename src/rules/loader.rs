//! JSON rule table loader.
//!
//! The source format is the one the product analyzer ships with:
//!
//! ```json
//! {
//!   "ingredient_profiles": {
//!     "retinol": { "display_name": "Retinol", "conflicts_with": ["vitamin_c"], "tags": ["photosensitizing"] }
//!   },
//!   "keywords_to_ingredients": { "retinol": "retinol" },
//!   "category_rules": { "sunscreen": { "step": 10, "time": "AM", "essential": true } }
//! }
//! ```
//!
//! Loosely-typed fields are converted into the typed records of `table.rs`
//! here, so a bad time value or tag is caught once at load time instead of
//! surfacing as a wrong lookup during analysis.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::table::{
    ActiveTags, CategoryRule, FALLBACK_CATEGORY, IngredientProfile, LoadOptions, RuleTable, RuleTableBuilder,
    TimeOfDay, ValidationIssue,
};
use crate::error::RuleTableError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRuleTable {
    ingredient_profiles: BTreeMap<String, RawProfile>,
    keywords_to_ingredients: BTreeMap<String, String>,
    // `serde_json::Map` with `preserve_order` keeps declaration order.
    category_rules: serde_json::Map<String, serde_json::Value>,
    fallback_category: Option<RawCategoryRule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProfile {
    display_name: Option<String>,
    conflicts_with: Vec<String>,
    pairs_well_with: Vec<String>,
    tags: Vec<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
    warning: Option<String>,
    best_time: Option<String>,
    concerns_targeted: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCategoryRule {
    step: Option<i32>,
    time: Option<String>,
    essential: bool,
}

/// Parse a rule table from JSON text.
pub fn from_json_str(json: &str, options: &LoadOptions) -> Result<RuleTable, RuleTableError> {
    let raw: RawRuleTable = serde_json::from_str(json)?;
    let builder = into_builder(raw)?;
    let table = builder.build(options)?;

    tracing::debug!(
        profiles = table.profiles().count(),
        keywords = table.keywords().len(),
        categories = table.categories().len(),
        "rule table loaded"
    );
    Ok(table)
}

/// Read and parse a rule table file.
pub fn from_path(path: impl AsRef<Path>, options: &LoadOptions) -> Result<RuleTable, RuleTableError> {
    let path = path.as_ref();
    let json =
        std::fs::read_to_string(path).map_err(|source| RuleTableError::Io { path: path.to_path_buf(), source })?;
    from_json_str(&json, options)
}

fn into_builder(raw: RawRuleTable) -> Result<RuleTableBuilder, RuleTableError> {
    let mut builder = RuleTable::builder();

    for (key, profile) in raw.ingredient_profiles {
        let mut tags = ActiveTags::empty();
        for tag in &profile.tags {
            match ActiveTags::from_tag(tag) {
                Some(t) => tags |= t,
                None => builder = builder.note(ValidationIssue::UnknownTag { key: key.clone(), tag: tag.clone() }),
            }
        }

        let display_name = profile.display_name.unwrap_or_else(|| key.clone());
        let mut out = IngredientProfile::new(&key, &display_name)
            .conflicts_with(profile.conflicts_with)
            .pairs_well_with(profile.pairs_well_with)
            .tagged(tags)
            .concerns(profile.concerns_targeted);
        out.kind = profile.kind;
        out.description = profile.description;
        out.warning = profile.warning;
        out.best_time = profile.best_time;
        builder = builder.profile(out);
    }

    for (keyword, key) in raw.keywords_to_ingredients {
        builder = builder.keyword(&keyword, &key);
    }

    let fallback = match raw.fallback_category {
        Some(rule) => category_rule("<fallback>", rule, FALLBACK_CATEGORY)?,
        None => FALLBACK_CATEGORY,
    };
    builder = builder.fallback_category(fallback);

    for (name, value) in raw.category_rules {
        let rule: RawCategoryRule = serde_json::from_value(value)?;
        builder = builder.category(&name, category_rule(&name, rule, fallback)?);
    }

    Ok(builder)
}

fn category_rule(name: &str, raw: RawCategoryRule, defaults: CategoryRule) -> Result<CategoryRule, RuleTableError> {
    let time = match raw.time {
        Some(value) => TimeOfDay::parse(&value)
            .ok_or_else(|| RuleTableError::InvalidTime { category: name.to_string(), value: value.clone() })?,
        None => defaults.time,
    };
    Ok(CategoryRule { step: raw.step.unwrap_or(defaults.step), time, essential: raw.essential })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Interaction, SUNSCREEN_STEP};

    const SAMPLE: &str = r#"{
        "ingredient_profiles": {
            "retinol": {
                "display_name": "Retinol",
                "type": "retinoid",
                "conflicts_with": ["vitamin_c"],
                "pairs_well_with": ["niacinamide"],
                "tags": ["photosensitizing"],
                "concerns_targeted": ["fine_lines", "acne"]
            },
            "vitamin_c": { "display_name": "Vitamin C", "tags": ["antioxidant_acid"] },
            "niacinamide": {}
        },
        "keywords_to_ingredients": { "Retinol": "retinol", "ascorbic": "vitamin_c" },
        "category_rules": {
            "sunscreen": { "step": 10, "time": "AM", "essential": true },
            "cleanser": { "step": 1, "time": "AM/PM", "essential": true },
            "moisturizer": { "step": 7, "time": "AM/PM", "essential": true },
            "serum": { "step": 4 }
        }
    }"#;

    #[test]
    fn loads_profiles_keywords_and_categories() {
        let table = from_json_str(SAMPLE, &LoadOptions::strict()).unwrap();

        let retinol = table.profile("retinol").unwrap();
        assert_eq!(retinol.display_name, "Retinol");
        assert_eq!(retinol.kind.as_deref(), Some("retinoid"));
        assert!(retinol.tags.contains(ActiveTags::PHOTOSENSITIZING));
        assert!(retinol.related(Interaction::Conflict).contains("vitamin_c"));
        assert_eq!(retinol.concerns_targeted, vec!["fine_lines", "acne"]);

        assert_eq!(table.profile("niacinamide").unwrap().display_name, "niacinamide");
        assert!(table.keywords().iter().any(|(k, v)| k == "retinol" && v == "retinol"));

        let order: Vec<&str> = table.categories().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(order, vec!["sunscreen", "cleanser", "moisturizer", "serum"]);
        assert_eq!(table.category("sunscreen").unwrap().step, SUNSCREEN_STEP);
        // Missing time falls back to the fallback rule's time.
        assert_eq!(table.category("serum").unwrap().time, TimeOfDay::Both);
    }

    #[test]
    fn invalid_time_is_a_load_error() {
        let json = r#"{ "category_rules": { "toner": { "step": 2, "time": "evening" } } }"#;
        let err = from_json_str(json, &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            RuleTableError::InvalidTime { ref category, ref value } if category == "toner" && value == "evening"
        ));
    }

    #[test]
    fn dangling_reference_is_fatal_only_in_strict_mode() {
        let json = r#"{
            "ingredient_profiles": { "retinol": { "conflicts_with": ["aha"] } },
            "keywords_to_ingredients": { "retinol": "retinol" }
        }"#;
        assert!(matches!(from_json_str(json, &LoadOptions::strict()), Err(RuleTableError::Validation(_))));
        let table = from_json_str(json, &LoadOptions::default()).unwrap();
        assert!(table.profile("aha").is_none());
    }

    #[test]
    fn unknown_tags_are_validation_issues() {
        let json = r#"{ "ingredient_profiles": { "aha": { "tags": ["exfoliant"] } } }"#;
        match from_json_str(json, &LoadOptions::strict()) {
            Err(RuleTableError::Validation(issues)) => {
                assert_eq!(issues, vec![ValidationIssue::UnknownTag { key: "aha".into(), tag: "exfoliant".into() }]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn fallback_category_can_be_overridden() {
        let json = r#"{ "fallback_category": { "step": 6, "time": "PM" } }"#;
        let table = from_json_str(json, &LoadOptions::default()).unwrap();
        assert_eq!(table.fallback_category(), CategoryRule::new(6, TimeOfDay::Pm));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(from_json_str("{ not json", &LoadOptions::default()), Err(RuleTableError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = from_path("/definitely/not/here/rules.json", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, RuleTableError::Io { .. }));
    }
}
