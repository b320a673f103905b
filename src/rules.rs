//! Rule table: the declarative data the engine runs against.
//!
//! - `table.rs`: typed records and the builder that validates them.
//! - `loader.rs`: JSON source format.
//! - `defaults.rs`: the built-in table.
//! - `glossary.rs`: read-only lookups for ingredient reference pages.

pub mod defaults;
pub mod glossary;
mod loader;
mod table;

use std::path::Path;

pub use table::{
    ActiveTags, CategoryRule, FALLBACK_CATEGORY, IngredientProfile, Interaction, LoadOptions, RuleTable,
    RuleTableBuilder, SUNSCREEN_CATEGORY, SUNSCREEN_STEP, Slot, TimeOfDay, ValidationIssue,
};

use crate::error::RuleTableError;

impl RuleTable {
    /// Parse a rule table from its JSON source.
    pub fn from_json_str(json: &str, options: &LoadOptions) -> Result<Self, RuleTableError> {
        loader::from_json_str(json, options)
    }

    /// Read and parse a rule table file.
    pub fn from_path(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, RuleTableError> {
        loader::from_path(path, options)
    }
}
