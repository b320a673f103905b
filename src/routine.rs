//! Products and routines as submitted by a caller.
//!
//! Input comes from search results or hand-written JSON, so deserialisation is
//! forgiving: every field is optional, `null` is accepted, and non-string
//! ingredient entries are stringified.

use serde::{Deserialize, Deserializer, Serialize};

use crate::normalize_label;

/// Name shown for products submitted without one.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub brand: String,
    #[serde(deserialize_with = "lenient_category")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub ingredients: Vec<String>,
}

impl Product {
    pub fn new(name: &str, brand: &str, category: &str, ingredients: &[&str]) -> Self {
        Product {
            name: name.to_string(),
            brand: brand.to_string(),
            category: Some(category.to_string()),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Name used in findings and schedules.
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() { UNKNOWN_PRODUCT } else { name }
    }

    /// Lowercased, whitespace-collapsed category, or `None` when absent or blank.
    pub fn category_key(&self) -> Option<String> {
        self.category.as_deref().map(normalize_label).filter(|c| !c.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RoutineSource {
    Products(Vec<Product>),
    Envelope { products: Vec<Product> },
}

/// Parse a routine from JSON: either a bare array of products or any object
/// with a `products` array (such as an exported routine).
pub fn from_json_str(json: &str) -> Result<Vec<Product>, serde_json::Error> {
    Ok(match serde_json::from_str::<RoutineSource>(json)? {
        RoutineSource::Products(products) | RoutineSource::Envelope { products } => products,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_to_string(value).unwrap_or_default())
}

/// Only a string names a category; anything else counts as uncategorised.
fn lenient_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items.into_iter().filter_map(value_to_string).collect(),
        // A single comma-separated label list.
        serde_json::Value::String(s) => {
            s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
        }
        _ => Vec::new(),
    })
}

fn value_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
