//! Error types for schema loading, customization and ordering.

use std::fmt;
use std::path::PathBuf;

/// Error type for core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The schema snapshot has never been written
    #[error("Schema snapshot not found at {0}; run `datafill analyze` first")]
    SnapshotMissing(PathBuf),

    /// Error reading or writing a settings file
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// One or more columns failed generator validation
    #[error("Invalid customization ({} problem(s)):\n{}", .0.len(), format_violations(.0))]
    Validation(Vec<Violation>),

    /// Foreign keys form a cycle between distinct tables
    #[error("Foreign key cycle detected: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),
}

/// A single validation failure, located by table, column and field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub table: String,
    pub column: Option<String>,
    pub field: String,
    pub reason: String,
}

impl Violation {
    /// Create a violation for a column field.
    pub fn column(
        table: impl Into<String>,
        column: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: Some(column.into()),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Field path of this violation, e.g. `users.email.max`.
    pub fn path(&self) -> String {
        match &self.column {
            Some(column) => format!("{}.{}.{}", self.table, column, self.field),
            None => format!("{}.{}", self.table, self.field),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path(), self.reason)
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_path() {
        let err = CoreError::Validation(vec![
            Violation::column("users", "born", "minDate", "required for date columns"),
            Violation::column("users", "kind", "values", "no values found"),
        ]);
        let message = err.to_string();
        assert!(message.contains("2 problem(s)"));
        assert!(message.contains("users.born.minDate: required for date columns"));
        assert!(message.contains("users.kind.values: no values found"));
    }

    #[test]
    fn test_cycle_message() {
        let err = CoreError::DependencyCycle(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(err.to_string(), "Foreign key cycle detected: a -> b -> a");
    }
}
