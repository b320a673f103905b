//! Errors for the fallible edge of the crate: loading a rule table.
//!
//! Analysis itself never fails; malformed products fall back to defaults.

use std::path::PathBuf;

use crate::rules::ValidationIssue;

#[derive(Debug, thiserror::Error)]
pub enum RuleTableError {
    #[error("failed to read rule table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rule table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("category '{category}' has invalid time '{value}' (expected AM, PM or AM/PM)")]
    InvalidTime { category: String, value: String },
    #[error("empty keyword mapped to '{key}'")]
    EmptyKeyword { key: String },
    #[error("rule table failed validation: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Interaction;

    #[test]
    fn validation_error_lists_every_issue() {
        let err = RuleTableError::Validation(vec![
            ValidationIssue::DanglingReference {
                from: "retinol".into(),
                to: "ghost".into(),
                interaction: Interaction::Conflict,
            },
            ValidationIssue::UnknownTag { key: "aha".into(), tag: "sticky".into() },
        ]);
        assert_eq!(
            err.to_string(),
            "rule table failed validation: 'retinol' conflicts_with unknown ingredient 'ghost'; \
             'aha' declares unknown tag 'sticky'"
        );
    }
}
