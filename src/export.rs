//! Routine export document.
//!
//! ```json
//! {
//!   "metadata": { "app": "dermascribe", "version": "0.1.0",
//!                 "exported_at": "2026-01-01T08:00:00Z", "product_count": 2 },
//!   "products": [ ... ],
//!   "last_analysis": { ... } | null
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Analysis;
use crate::routine::Product;

pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub app: String,
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub product_count: usize,
}

/// A saved routine together with its most recent analysis, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineExport {
    pub metadata: ExportMetadata,
    pub products: Vec<Product>,
    pub last_analysis: Option<Analysis>,
}

impl RoutineExport {
    /// `now` is passed in so callers (and tests) control the timestamp.
    pub fn new(products: &[Product], last_analysis: Option<Analysis>, now: DateTime<Utc>) -> Self {
        RoutineExport {
            metadata: ExportMetadata {
                app: APP_NAME.to_string(),
                version: APP_VERSION.to_string(),
                exported_at: now,
                product_count: products.len(),
            },
            products: products.to_vec(),
            last_analysis,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
