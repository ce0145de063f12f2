//! Per-kind validation of resolved columns.
//!
//! [`resolve_generator`] turns a merged [`Column`] into a [`GeneratorSpec`],
//! collecting every missing or inconsistent parameter as a [`Violation`].

use crate::customized::{CustomizedForeignKey, GeneratorSpec};
use crate::error::Violation;
use crate::schema::{Column, GeneratorKind, ValuesSpec};
use crate::values::{yaml_to_fill_value, FillValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// Locale used by faker columns that do not set one.
pub const DEFAULT_LOCALE: &str = "en";

/// Widest bit column that still fits in an i64 domain.
const MAX_BIT_WIDTH: u32 = 62;

/// Validate a merged column and build its generator parameters.
pub fn resolve_generator(
    table: &str,
    column: &Column,
    pools: &BTreeMap<String, ValuesSpec>,
) -> Result<GeneratorSpec, Vec<Violation>> {
    let mut violations = Vec::new();
    let mut violation = |field: &str, reason: String| {
        violations.push(Violation::column(table, &column.name, field, reason));
    };

    if !(0.0..=1.0).contains(&column.nullable) {
        violation(
            "nullable",
            format!("must be a probability in 0..1, got {}", column.nullable),
        );
    }

    let spec = match column.generator {
        GeneratorKind::None => GeneratorSpec::None,
        GeneratorKind::Boolean => GeneratorSpec::Boolean,
        GeneratorKind::Time => GeneratorSpec::Time,
        GeneratorKind::Bit => {
            let width = column.max;
            if !(0.0..=f64::from(MAX_BIT_WIDTH)).contains(&width) || width.fract() != 0.0 {
                violation(
                    "max",
                    format!("bit width must be an integer in 0..={MAX_BIT_WIDTH}, got {width}"),
                );
            } else if column.min < 0.0 || column.min > 2f64.powf(width) {
                violation(
                    "min",
                    format!("must be in 0..=2^{width}, got {}", column.min),
                );
            }
            GeneratorSpec::Bit {
                min: column.min as i64,
                width: width.max(0.0) as u32,
            }
        }
        GeneratorKind::Integer => {
            let (min, max) = (column.min.ceil(), column.max.floor());
            if check_range(&column.min, &column.max, &mut violation) && min > max {
                violation(
                    "max",
                    format!("no integer in [{}, {}]", column.min, column.max),
                );
            }
            GeneratorSpec::Integer {
                min: min as i64,
                max: max as i64,
            }
        }
        GeneratorKind::Real => {
            if check_range(&column.min, &column.max, &mut violation)
                && !(column.max - column.min).is_finite()
            {
                violation(
                    "max",
                    format!("range [{}, {}] is too wide", column.min, column.max),
                );
            }
            GeneratorSpec::Real {
                min: column.min,
                max: column.max,
            }
        }
        GeneratorKind::String => {
            if column.min < 0.0 {
                violation("min", format!("length cannot be negative, got {}", column.min));
            }
            check_range(&column.min, &column.max, &mut violation);
            GeneratorSpec::String {
                min: column.min.max(0.0) as usize,
                max: column.max.max(0.0) as usize,
            }
        }
        GeneratorKind::Date => {
            let min = required_date(column.min_date.as_deref(), "minDate", &mut violation);
            let max = required_date(column.max_date.as_deref(), "maxDate", &mut violation);
            match (min, max) {
                (Some(min), Some(max)) => {
                    if min > max {
                        violation("maxDate", "must not be before minDate".to_string());
                    }
                    GeneratorSpec::Date {
                        min,
                        max,
                        monotonic: column.monotonic,
                    }
                }
                _ => GeneratorSpec::None,
            }
        }
        GeneratorKind::Values => match &column.values {
            Some(values) => match parse_values(values, pools) {
                Ok(candidates) => GeneratorSpec::Values { candidates },
                Err(reason) => {
                    violation("values", reason);
                    GeneratorSpec::None
                }
            },
            None => {
                violation("values", "required for values columns".to_string());
                GeneratorSpec::None
            }
        },
        GeneratorKind::ForeignKey => match &column.foreign_key {
            Some(fk) if !fk.table.is_empty() && !fk.column.is_empty() => {
                GeneratorSpec::ForeignKey(CustomizedForeignKey {
                    table: fk.table.clone(),
                    column: fk.column.clone(),
                    filter: fk.filter.clone().filter(|f| !f.trim().is_empty()),
                })
            }
            Some(_) => {
                violation(
                    "foreignKey",
                    "table and column are both required".to_string(),
                );
                GeneratorSpec::None
            }
            None => {
                violation(
                    "foreignKey",
                    "required for foreignKey columns".to_string(),
                );
                GeneratorSpec::None
            }
        },
        GeneratorKind::Function => match column.custom_function.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => GeneratorSpec::Function {
                name: name.to_string(),
            },
            _ => {
                violation(
                    "customFunction",
                    "a registered function name is required".to_string(),
                );
                GeneratorSpec::None
            }
        },
        GeneratorKind::Faker => match column.template.as_deref() {
            Some(template) if !template.is_empty() => GeneratorSpec::Faker {
                template: template.to_string(),
                locale: column
                    .locale
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            },
            _ => {
                violation(
                    "template",
                    "faker template required for faker columns".to_string(),
                );
                GeneratorSpec::None
            }
        },
    };

    if violations.is_empty() {
        Ok(spec)
    } else {
        Err(violations)
    }
}

/// Returns whether the range is usable.
fn check_range(min: &f64, max: &f64, violation: &mut impl FnMut(&str, String)) -> bool {
    let mut ok = true;
    if !min.is_finite() {
        violation("min", format!("must be a finite number, got {min}"));
        ok = false;
    }
    if !max.is_finite() {
        violation("max", format!("must be a finite number, got {max}"));
        ok = false;
    }
    if min > max {
        violation("max", format!("must be >= min ({min}), got {max}"));
        ok = false;
    }
    ok
}

fn required_date(
    value: Option<&str>,
    field: &str,
    violation: &mut impl FnMut(&str, String),
) -> Option<NaiveDateTime> {
    match value {
        None => {
            violation(field, "required for date columns".to_string());
            None
        }
        Some(s) => {
            let parsed = parse_datetime(s);
            if parsed.is_none() {
                violation(field, format!("unrecognized date '{s}'"));
            }
            parsed
        }
    }
}

/// Parse a date/time in the formats accepted by settings documents.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m-%d-%Y %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    for format in ["%Y-%m-%d", "%m-%d-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Flatten a value pool into its candidate list.
///
/// Ratio maps repeat each key `round(ratio * 100)` times, so weights are
/// only honoured to whole-percent granularity.
pub fn parse_values(
    values: &ValuesSpec,
    pools: &BTreeMap<String, ValuesSpec>,
) -> Result<Vec<FillValue>, String> {
    let resolved = match values {
        ValuesSpec::Named(name) => match pools.get(name) {
            Some(ValuesSpec::Named(_)) => {
                return Err(format!("value pool '{name}' refers to another pool"))
            }
            Some(pool) => pool,
            None => return Err(format!("unknown value pool '{name}'")),
        },
        other => other,
    };

    let candidates = match resolved {
        ValuesSpec::List(list) => list.iter().map(yaml_to_fill_value).collect(),
        ValuesSpec::Ratio(ratios) => {
            let mut candidates = Vec::new();
            for (key, ratio) in ratios {
                let ratio = ratio
                    .as_f64()
                    .ok_or_else(|| format!("ratio for {key:?} is not a number"))?;
                let value = yaml_to_fill_value(key);
                let copies = (ratio * 100.0).round().max(0.0) as usize;
                candidates.extend(std::iter::repeat(value).take(copies));
            }
            candidates
        }
        ValuesSpec::Named(_) => Vec::new(),
    };

    if candidates.is_empty() {
        return Err("no values found".to_string());
    }
    Ok(candidates)
}
