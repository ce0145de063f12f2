//! Mapping of `information_schema` metadata to schema columns.

use chrono::NaiveDateTime;
use datafill_core::{Column, ForeignKey, GeneratorKind, DATETIME_FORMAT};

/// Lower bound of generated dates.
pub const MIN_DATE: &str = "1970-01-01";

/// Faker template producing a UUID.
const UUID_TEMPLATE: &str = "{{random.uuid}}";

const INT16_MAX: f64 = 32767.0;
const INT32_MAX: f64 = 2147483647.0;

/// One row of `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub character_maximum_length: Option<i32>,
    pub is_identity: bool,
    pub is_generated: bool,
    pub column_default: Option<String>,
}

/// One foreign key constraint column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

/// Build a schema column; `now` bounds generated dates.
///
/// Types without a meaningful generator (json, bytea, enums, time of day…)
/// get `GeneratorKind::None` and are left to the database default.
pub fn column_from_info(info: &ColumnInfo, now: NaiveDateTime) -> Column {
    let mut column = Column::new(info.column_name.clone(), GeneratorKind::None);
    column.auto_increment = info.is_identity
        || info.is_generated
        || info
            .column_default
            .as_deref()
            .is_some_and(|d| d.starts_with("nextval("));

    match info.data_type.to_lowercase().as_str() {
        "boolean" | "bool" => column.generator = GeneratorKind::Boolean,
        "smallint" | "int2" => {
            column.generator = GeneratorKind::Integer;
            column.min = -INT16_MAX - 1.0;
            column.max = INT16_MAX;
        }
        "integer" | "int" | "int4" | "bigint" | "int8" => {
            column.generator = GeneratorKind::Integer;
            column.min = -INT32_MAX - 1.0;
            column.max = INT32_MAX;
        }
        "numeric" | "decimal" | "real" | "float4" | "double precision" | "float8" | "money" => {
            column.generator = GeneratorKind::Real;
            column.min = -INT32_MAX - 1.0;
            column.max = INT32_MAX;
        }
        "date" | "timestamp" | "timestamp without time zone" | "timestamptz"
        | "timestamp with time zone" => {
            column.generator = GeneratorKind::Date;
            column.min_date = Some(MIN_DATE.to_string());
            column.max_date = Some(now.format(DATETIME_FORMAT).to_string());
        }
        "interval" => column.generator = GeneratorKind::Time,
        "character varying" | "varchar" | "character" | "char" | "text" => {
            column.generator = GeneratorKind::String;
            column.min = 0.0;
            if let Some(len) = info.character_maximum_length {
                column.max = f64::from(len);
            }
        }
        "uuid" => {
            column.generator = GeneratorKind::Faker;
            column.template = Some(UUID_TEMPLATE.to_string());
        }
        _ => {}
    }
    column
}

/// Attach foreign keys to columns and return the referenced tables.
pub fn apply_foreign_keys(columns: &mut [Column], foreign_keys: &[ForeignKeyInfo]) -> Vec<String> {
    let mut referenced = Vec::new();
    for column in columns.iter_mut() {
        let Some(fk) = foreign_keys
            .iter()
            .find(|fk| fk.column.eq_ignore_ascii_case(&column.name))
        else {
            continue;
        };
        column.generator = GeneratorKind::ForeignKey;
        column.foreign_key = Some(ForeignKey::new(fk.foreign_table.clone(), fk.foreign_column.clone()));
        if !referenced.contains(&fk.foreign_table) {
            referenced.push(fk.foreign_table.clone());
        }
    }
    referenced
}
