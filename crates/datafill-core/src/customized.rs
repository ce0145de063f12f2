//! Fully resolved schema consumed by the fill engine.
//!
//! A [`CustomizedSchema`] is built once per run by merging the introspected
//! [`Schema`](crate::Schema) with the user's [`CustomSchema`](crate::CustomSchema)
//! (see [`crate::merge`]). Every column carries a validated [`GeneratorSpec`],
//! so generation never has to check for missing parameters.

use crate::custom::CustomSettings;
use crate::schema::{GeneratorKind, Monotonic};
use crate::values::FillValue;
use chrono::NaiveDateTime;

/// Row-count target used when a table sets neither `maxLines` nor `addLines`.
pub const DEFAULT_MAX_LINES: u64 = 1000;

/// Validated generator parameters, one variant per generator kind.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorSpec {
    /// Left to the database default
    None,
    /// Integer in `[min, 2^width]`
    Bit { min: i64, width: u32 },
    Boolean,
    Integer { min: i64, max: i64 },
    Real { min: f64, max: f64 },
    Date {
        min: NaiveDateTime,
        max: NaiveDateTime,
        monotonic: Monotonic,
    },
    Time,
    /// Random string whose length is uniform in `[min, max]`
    String { min: usize, max: usize },
    /// Flattened, weighted candidate list (never empty)
    Values { candidates: Vec<FillValue> },
    ForeignKey(CustomizedForeignKey),
    /// Name of a host-registered column function
    Function { name: String },
    Faker { template: String, locale: String },
}

impl GeneratorSpec {
    pub fn kind(&self) -> GeneratorKind {
        match self {
            Self::None => GeneratorKind::None,
            Self::Bit { .. } => GeneratorKind::Bit,
            Self::Boolean => GeneratorKind::Boolean,
            Self::Integer { .. } => GeneratorKind::Integer,
            Self::Real { .. } => GeneratorKind::Real,
            Self::Date { .. } => GeneratorKind::Date,
            Self::Time => GeneratorKind::Time,
            Self::String { .. } => GeneratorKind::String,
            Self::Values { .. } => GeneratorKind::Values,
            Self::ForeignKey(_) => GeneratorKind::ForeignKey,
            Self::Function { .. } => GeneratorKind::Function,
            Self::Faker { .. } => GeneratorKind::Faker,
        }
    }
}

/// Resolved foreign key target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomizedForeignKey {
    pub table: String,
    pub column: String,
    pub filter: Option<String>,
}

/// Fully resolved column.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomizedColumn {
    pub name: String,
    pub generator: GeneratorSpec,
    /// Probability (0..1) of replacing a generated value by NULL
    pub nullable: f64,
    pub unique: bool,
    pub auto_increment: bool,
    pub unsigned: bool,
}

impl CustomizedColumn {
    pub fn new(name: impl Into<String>, generator: GeneratorSpec) -> Self {
        Self {
            name: name.into(),
            generator,
            nullable: 0.0,
            unique: false,
            auto_increment: false,
            unsigned: false,
        }
    }

    /// Whether the fill engine produces a value for this column.
    pub fn is_generated(&self) -> bool {
        !self.auto_increment && !matches!(self.generator, GeneratorSpec::None)
    }
}

/// Fully resolved table.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomizedTable {
    pub name: String,
    pub columns: Vec<CustomizedColumn>,
    /// Tables that must be filled before this one
    pub referenced_tables: Vec<String>,
    pub before: Vec<String>,
    pub after: Vec<String>,
    /// `None` means unbounded
    pub max_lines: Option<u64>,
    /// `None` means the table is filled up to `max_lines`
    pub add_lines: Option<u64>,
    /// `None` inherits the global setting
    pub disable_triggers: Option<bool>,
}

impl CustomizedTable {
    /// A table with default row-count target and no hooks.
    pub fn new(name: impl Into<String>, columns: Vec<CustomizedColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
            referenced_tables: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
            max_lines: Some(DEFAULT_MAX_LINES),
            add_lines: None,
            disable_triggers: None,
        }
    }

    /// Row count this table should reach given its current row count.
    pub fn target_rows(&self, current_rows: u64) -> u64 {
        match (self.add_lines, self.max_lines) {
            (Some(add), Some(max)) => current_rows.saturating_add(add).min(max),
            (Some(add), None) => current_rows.saturating_add(add),
            (None, Some(max)) => max,
            (None, None) => DEFAULT_MAX_LINES,
        }
    }

    /// Rows still needed to reach the target; zero or negative means none.
    pub fn delta_rows(&self, current_rows: u64) -> i64 {
        self.target_rows(current_rows) as i64 - current_rows as i64
    }

    /// Whether triggers must be disabled while this table is filled.
    pub fn handles_triggers(&self, global_disable_triggers: bool) -> bool {
        self.disable_triggers.unwrap_or(global_disable_triggers)
    }

    pub fn get_column(&self, name: &str) -> Option<&CustomizedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Settings plus resolved tables in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomizedSchema {
    pub settings: CustomSettings,
    pub tables: Vec<CustomizedTable>,
}

impl CustomizedSchema {
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn get_table(&self, name: &str) -> Option<&CustomizedTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}
