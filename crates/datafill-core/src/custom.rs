//! User-authored customization document.
//!
//! Every field is optional: whatever is left unset falls back to the global
//! per-generator option buckets and then to the introspected schema.

use crate::error::CoreError;
use crate::schema::{
    write_settings_file, Column, ForeignKey, GeneratorKind, Monotonic, ValuesSpec,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default number of rows per insert batch.
pub const DEFAULT_MAX_ROWS_PER_BATCH: usize = 1000;

/// Partial column definition; `Some` fields override the base column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsigned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monotonic: Option<Monotonic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<ValuesSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl ColumnOverrides {
    /// Overwrite every field of `column` that this override sets.
    pub fn apply_to(&self, column: &mut Column) {
        if let Some(generator) = self.generator {
            column.generator = generator;
        }
        if let Some(nullable) = self.nullable {
            column.nullable = nullable;
        }
        if let Some(unique) = self.unique {
            column.unique = unique;
        }
        if let Some(auto_increment) = self.auto_increment {
            column.auto_increment = auto_increment;
        }
        if let Some(unsigned) = self.unsigned {
            column.unsigned = unsigned;
        }
        if let Some(min) = self.min {
            column.min = min;
        }
        if let Some(max) = self.max {
            column.max = max;
        }
        if let Some(min_date) = &self.min_date {
            column.min_date = Some(min_date.clone());
        }
        if let Some(max_date) = &self.max_date {
            column.max_date = Some(max_date.clone());
        }
        if let Some(monotonic) = self.monotonic {
            column.monotonic = monotonic;
        }
        if let Some(foreign_key) = &self.foreign_key {
            column.foreign_key = Some(foreign_key.clone());
        }
        if let Some(values) = &self.values {
            column.values = Some(values.clone());
        }
        if let Some(custom_function) = &self.custom_function {
            column.custom_function = Some(custom_function.clone());
        }
        if let Some(template) = &self.template {
            column.template = Some(template.clone());
        }
        if let Some(locale) = &self.locale {
            column.locale = Some(locale.clone());
        }
    }
}

/// Per-column override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomColumn {
    pub name: String,

    #[serde(flatten)]
    pub overrides: ColumnOverrides,
}

impl CustomColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overrides: ColumnOverrides::default(),
        }
    }
}

/// Per-table override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTable {
    pub name: String,

    /// Column overrides; listed columns are generated first, in this order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<CustomColumn>,

    /// Absolute row-count ceiling
    #[serde(default, alias = "lines", skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u64>,

    /// Rows to add on top of the current row count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_lines: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_triggers: Option<bool>,

    /// SQL statements run before generating this table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Vec<String>>,

    /// SQL statements run after generating this table, if rows were inserted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Vec<String>>,
}

impl CustomTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Find a column override by name (case-insensitive).
    pub fn find_column(&self, name: &str) -> Option<&CustomColumn> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Position of a column in the override list (case-insensitive).
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Default options applied to every column of the listed generator kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    pub generators: Vec<GeneratorKind>,

    #[serde(default)]
    pub options: ColumnOverrides,
}

/// Run-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomSettings {
    /// SQL statements run once before any table
    pub before_all: Vec<String>,

    /// SQL statements run once after every table
    pub after_all: Vec<String>,

    /// Disable triggers for tables that do not decide for themselves
    pub disable_triggers: bool,

    pub ignored_tables: Vec<String>,

    /// When non-empty, only these tables are filled
    pub tables_to_fill: Vec<String>,

    /// Named value pools referenced by columns
    pub values: BTreeMap<String, ValuesSpec>,

    /// Per-generator-kind option buckets
    pub options: Vec<GeneratorOptions>,

    /// PRNG seed; generation is not reproducible without one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    pub max_rows_per_batch: usize,

    /// Upper bound applied to the length of string columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length_value: Option<u32>,
}

impl Default for CustomSettings {
    fn default() -> Self {
        Self {
            before_all: Vec::new(),
            after_all: Vec::new(),
            disable_triggers: false,
            ignored_tables: Vec::new(),
            tables_to_fill: Vec::new(),
            values: BTreeMap::new(),
            options: Vec::new(),
            seed: None,
            max_rows_per_batch: DEFAULT_MAX_ROWS_PER_BATCH,
            max_length_value: None,
        }
    }
}

impl CustomSettings {
    /// Whether a table passes the ignore list and the inclusion list.
    pub fn includes_table(&self, name: &str) -> bool {
        let ignored = self
            .ignored_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(name));
        let selected = self.tables_to_fill.is_empty()
            || self
                .tables_to_fill
                .iter()
                .any(|t| t.eq_ignore_ascii_case(name));
        !ignored && selected
    }

    /// Option bucket for a generator kind (first match wins).
    pub fn options_for(&self, kind: GeneratorKind) -> Option<&ColumnOverrides> {
        self.options
            .iter()
            .find(|o| o.generators.contains(&kind))
            .map(|o| &o.options)
    }
}

/// The whole customization document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomSchema {
    pub settings: CustomSettings,
    pub tables: Vec<CustomTable>,
}

impl CustomSchema {
    pub fn from_yaml(yaml: &str) -> Result<Self, CoreError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load the document, falling back to an empty customization when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            tracing::warn!(
                "Unable to read {}, no customization will be taken into account",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn to_yaml(&self) -> Result<String, CoreError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn write_file(&self, path: &Path) -> Result<(), CoreError> {
        write_settings_file(path, &self.to_yaml()?)
    }

    /// Find a table override by name (case-insensitive).
    pub fn find_table(&self, name: &str) -> Option<&CustomTable> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_customization() {
        let yaml = r#"
settings:
  seed: 42
  disableTriggers: true
  ignoredTables: [audit_log]
  values:
    colors: [red, green]
  options:
    - generators: [integer]
      options:
        autoIncrement: true
tables:
  - name: users
    lines: 50
    addLines: 10
    before: ["DELETE FROM sessions"]
    columns:
      - name: email
        generator: faker
        template: "{{internet.email}}"
"#;
        let custom = CustomSchema::from_yaml(yaml).unwrap();
        assert_eq!(custom.settings.seed, Some(42));
        assert_eq!(custom.settings.max_rows_per_batch, DEFAULT_MAX_ROWS_PER_BATCH);
        assert!(!custom.settings.includes_table("AUDIT_LOG"));
        assert!(custom.settings.includes_table("users"));
        assert_eq!(
            custom
                .settings
                .options_for(GeneratorKind::Integer)
                .and_then(|o| o.auto_increment),
            Some(true)
        );

        let users = custom.find_table("Users").unwrap();
        assert_eq!(users.max_lines, Some(50));
        assert_eq!(users.add_lines, Some(10));
        let email = users.find_column("EMAIL").unwrap();
        assert_eq!(email.overrides.generator, Some(GeneratorKind::Faker));
        assert_eq!(email.overrides.template.as_deref(), Some("{{internet.email}}"));
    }

    #[test]
    fn test_tables_to_fill_restricts_selection() {
        let settings = CustomSettings {
            tables_to_fill: vec!["orders".into()],
            ..Default::default()
        };
        assert!(settings.includes_table("orders"));
        assert!(!settings.includes_table("users"));
    }

    #[test]
    fn test_overrides_only_touch_set_fields() {
        let mut column = Column::new("c", GeneratorKind::Integer);
        column.max = 10.0;
        let overrides = ColumnOverrides {
            min: Some(5.0),
            unique: Some(true),
            ..Default::default()
        };
        overrides.apply_to(&mut column);
        assert_eq!(column.min, 5.0);
        assert_eq!(column.max, 10.0);
        assert!(column.unique);
        assert_eq!(column.generator, GeneratorKind::Integer);
    }

    #[test]
    fn test_missing_customization_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let custom = CustomSchema::load_or_default(&dir.path().join("custom.yaml")).unwrap();
        assert_eq!(custom, CustomSchema::default());
    }
}
