//! Introspected schema model.
//!
//! These types describe a database as discovered by a connector: tables,
//! their columns, and foreign keys. The model is written to a YAML snapshot
//! by `datafill analyze` and is read-only for the rest of a run.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Default upper bound for numeric and length domains.
pub const DEFAULT_COLUMN_MAX: f64 = 255.0;

/// Tag identifying which value-generation strategy a column uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeneratorKind {
    /// No generator; the database default applies
    #[default]
    None,
    Bit,
    Boolean,
    Integer,
    Real,
    Date,
    Time,
    String,
    Values,
    ForeignKey,
    Function,
    Faker,
}

impl GeneratorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bit => "bit",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Date => "date",
            Self::Time => "time",
            Self::String => "string",
            Self::Values => "values",
            Self::ForeignKey => "foreignKey",
            Self::Function => "function",
            Self::Faker => "faker",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering applied to pre-generated monotonic sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Monotonic {
    #[default]
    None,
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl Monotonic {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Foreign key target of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced table
    pub table: String,

    /// Referenced column
    pub column: String,

    /// Optional SQL predicate restricting candidate rows of the referenced table
    #[serde(default, alias = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl ForeignKey {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            filter: None,
        }
    }
}

/// A value pool as written by the user.
///
/// - a list of literals, picked uniformly
/// - a ratio map `{value: weight}`, weights in `0..=1`
/// - the name of a pool declared in the global settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValuesSpec {
    Named(String),
    List(Vec<serde_yaml::Value>),
    Ratio(serde_yaml::Mapping),
}

/// Column metadata as introspected from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name
    pub name: String,

    /// Generator used for this column
    #[serde(default)]
    pub generator: GeneratorKind,

    /// Probability (0..1) that a generated value is replaced by NULL
    #[serde(default)]
    pub nullable: f64,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub auto_increment: bool,

    #[serde(default)]
    pub unsigned: bool,

    /// Lower bound (value for numbers, length for strings)
    #[serde(default)]
    pub min: f64,

    /// Upper bound (value for numbers, length for strings, width for bits)
    #[serde(default = "default_max")]
    pub max: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,

    #[serde(default, skip_serializing_if = "Monotonic::is_none")]
    pub monotonic: Monotonic,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<ValuesSpec>,

    /// Name of a registered column function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_function: Option<String>,

    /// Faker template, e.g. `{{name.firstName}} {{name.lastName}}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

fn default_max() -> f64 {
    DEFAULT_COLUMN_MAX
}

impl Column {
    /// Create a column with default domains.
    pub fn new(name: impl Into<String>, generator: GeneratorKind) -> Self {
        Self {
            name: name.into(),
            generator,
            nullable: 0.0,
            unique: false,
            auto_increment: false,
            unsigned: false,
            min: 0.0,
            max: DEFAULT_COLUMN_MAX,
            min_date: None,
            max_date: None,
            monotonic: Monotonic::None,
            foreign_key: None,
            values: None,
            custom_function: None,
            template: None,
            locale: None,
        }
    }
}

/// Table metadata as introspected from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Table name
    pub name: String,

    /// Columns in declaration order
    #[serde(default)]
    pub columns: Vec<Column>,

    /// Raw foreign key targets; may contain duplicates and self references
    #[serde(default)]
    pub referenced_tables: Vec<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            referenced_tables: Vec::new(),
        }
    }

    /// Get a column by name (case-insensitive).
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Introspected database schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Parse a schema snapshot from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, CoreError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a schema snapshot from a file.
    ///
    /// A missing file is reported as [`CoreError::SnapshotMissing`].
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::SnapshotMissing(path.to_path_buf())
            } else {
                CoreError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String, CoreError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the snapshot to a file, creating parent directories.
    pub fn write_file(&self, path: &Path) -> Result<(), CoreError> {
        write_settings_file(path, &self.to_yaml()?)
    }

    /// Get a table by name (case-insensitive).
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}

pub(crate) fn write_settings_file(path: &Path, content: &str) -> Result<(), CoreError> {
    let io_err = |source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    fs::write(path, content).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_with_defaults() {
        let yaml = r#"
tables:
  - name: users
    columns:
      - name: id
        generator: integer
        autoIncrement: true
      - name: email
        generator: string
        unique: true
        max: 120
  - name: posts
    referencedTables: [users]
    columns:
      - name: author
        generator: foreignKey
        foreignKey:
          table: users
          column: id
          where: "id > 10"
      - name: published
        generator: date
        minDate: "2020-01-01"
        maxDate: "2021-01-01"
        monotonic: asc
"#;
        let schema = Schema::from_yaml(yaml).unwrap();
        assert_eq!(schema.table_names(), vec!["users", "posts"]);

        let users = schema.get_table("USERS").unwrap();
        let id = users.get_column("id").unwrap();
        assert!(id.auto_increment);
        assert_eq!(id.max, DEFAULT_COLUMN_MAX);
        assert_eq!(id.nullable, 0.0);

        let posts = schema.get_table("posts").unwrap();
        let author = posts.get_column("author").unwrap();
        assert_eq!(author.generator, GeneratorKind::ForeignKey);
        assert_eq!(
            author.foreign_key.as_ref().unwrap().filter.as_deref(),
            Some("id > 10")
        );
        let published = posts.get_column("published").unwrap();
        assert_eq!(published.monotonic, Monotonic::Ascending);
    }

    #[test]
    fn test_values_spec_shapes() {
        let named: ValuesSpec = serde_yaml::from_str("colors").unwrap();
        assert_eq!(named, ValuesSpec::Named("colors".into()));

        let list: ValuesSpec = serde_yaml::from_str("[a, 1, null]").unwrap();
        assert!(matches!(list, ValuesSpec::List(ref v) if v.len() == 3));

        let ratio: ValuesSpec = serde_yaml::from_str("{val1: 0.1, val2: 0.9}").unwrap();
        assert!(matches!(ratio, ValuesSpec::Ratio(ref m) if m.len() == 2));
    }

    #[test]
    fn test_missing_snapshot_is_reported_distinctly() {
        let dir = tempfile::tempdir().unwrap();
        let err = Schema::from_file(&dir.path().join("schema.yaml")).unwrap_err();
        assert!(matches!(err, CoreError::SnapshotMissing(_)));
        assert!(err.to_string().contains("run `datafill analyze` first"));
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings").join("schema.yaml");
        let schema = Schema::new(vec![Table::new(
            "t",
            vec![Column::new("c", GeneratorKind::Boolean)],
        )]);
        schema.write_file(&path).unwrap();
        assert_eq!(Schema::from_file(&path).unwrap(), schema);
    }
}
