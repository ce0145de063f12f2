//! Customization merge engine.
//!
//! Combines the introspected [`Schema`] with the user's [`CustomSchema`] into
//! a [`CustomizedSchema`]. Field precedence for a column, highest first:
//!
//! 1. the per-column override in the custom table
//! 2. the global option bucket for the column's introspected generator kind
//! 3. the introspected value
//!
//! Every resolved column is validated; all violations are reported together
//! and nothing is returned if any exist. Tables come out in insertion order.

use crate::custom::{CustomSchema, CustomTable};
use crate::customized::{
    CustomizedColumn, CustomizedSchema, CustomizedTable, GeneratorSpec, DEFAULT_MAX_LINES,
};
use crate::error::{CoreError, Violation};
use crate::order::order_tables;
use crate::schema::{Column, GeneratorKind, Schema, Table};
use crate::validate::resolve_generator;
use tracing::{debug, warn};

impl CustomizedSchema {
    /// Merge an introspected schema with a customization document.
    pub fn create(schema: &Schema, custom: &CustomSchema) -> Result<Self, CoreError> {
        let settings = &custom.settings;
        let mut tables = Vec::new();
        let mut violations = Vec::new();

        for table in &schema.tables {
            if !settings.includes_table(&table.name) {
                debug!("Skipping excluded table '{}'", table.name);
                continue;
            }
            let custom_table = custom.find_table(&table.name);
            match merge_table(table, custom_table, custom) {
                Ok(merged) => tables.push(merged),
                Err(mut errors) => violations.append(&mut errors),
            }
        }

        for custom_table in &custom.tables {
            if schema.get_table(&custom_table.name).is_none() {
                warn!(
                    "Customized table '{}' does not exist in the schema snapshot",
                    custom_table.name
                );
            }
        }

        if !violations.is_empty() {
            return Err(CoreError::Validation(violations));
        }

        Ok(Self {
            settings: settings.clone(),
            tables: order_tables(tables)?,
        })
    }
}

fn merge_table(
    table: &Table,
    custom_table: Option<&CustomTable>,
    custom: &CustomSchema,
) -> Result<CustomizedTable, Vec<Violation>> {
    let settings = &custom.settings;
    let mut violations = Vec::new();
    let mut referenced_tables = table.referenced_tables.clone();
    let mut columns = Vec::with_capacity(table.columns.len());

    for base in ordered_columns(table, custom_table) {
        let column = merge_column(base, custom_table, custom);

        if let Some(fk) = column
            .foreign_key
            .as_ref()
            .filter(|_| column.generator == GeneratorKind::ForeignKey)
        {
            if !referenced_tables
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&fk.table))
            {
                referenced_tables.push(fk.table.clone());
            }
        }

        match resolve_generator(&table.name, &column, &settings.values) {
            Ok(generator) => {
                if matches!(generator, GeneratorSpec::None) && !column.auto_increment {
                    warn!(
                        "Column '{}.{}' has no generator; the database default will be used",
                        table.name, column.name
                    );
                }
                columns.push(CustomizedColumn {
                    name: column.name,
                    generator,
                    nullable: column.nullable,
                    unique: column.unique,
                    auto_increment: column.auto_increment,
                    unsigned: column.unsigned,
                });
            }
            Err(mut errors) => violations.append(&mut errors),
        }
    }

    if !violations.is_empty() {
        return Err(violations);
    }

    let mut merged = CustomizedTable {
        referenced_tables,
        ..CustomizedTable::new(table.name.clone(), columns)
    };
    match custom_table {
        Some(custom_table) => {
            merged.max_lines = custom_table.max_lines;
            merged.add_lines = custom_table.add_lines;
            merged.disable_triggers = custom_table.disable_triggers;
            merged.before = custom_table.before.clone().unwrap_or_default();
            merged.after = custom_table.after.clone().unwrap_or_default();
            if merged.max_lines.is_none() && merged.add_lines.is_none() {
                merged.max_lines = Some(DEFAULT_MAX_LINES);
            }
        }
        None => merged.max_lines = Some(DEFAULT_MAX_LINES),
    }
    Ok(merged)
}

/// Columns listed in the custom table come first, in the listed order; the
/// others follow in declaration order.
fn ordered_columns<'a>(table: &'a Table, custom_table: Option<&CustomTable>) -> Vec<&'a Column> {
    let mut columns: Vec<&Column> = table.columns.iter().collect();
    if let Some(custom_table) = custom_table {
        // stable sort keeps the declaration order among unlisted columns
        columns.sort_by_key(|c| custom_table.column_position(&c.name).unwrap_or(usize::MAX));
    }
    columns
}

fn merge_column(base: &Column, custom_table: Option<&CustomTable>, custom: &CustomSchema) -> Column {
    let settings = &custom.settings;
    let mut column = base.clone();

    if let Some(bucket) = settings.options_for(base.generator) {
        bucket.apply_to(&mut column);
    }
    if let Some(custom_column) = custom_table.and_then(|t| t.find_column(&base.name)) {
        custom_column.overrides.apply_to(&mut column);
    }

    if column.generator == GeneratorKind::String {
        if let Some(cap) = settings.max_length_value {
            let cap = f64::from(cap);
            if column.max > cap {
                column.max = cap;
                column.min = column.min.min(cap);
            }
        }
    }
    column
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::{ColumnOverrides, CustomColumn, GeneratorOptions};
    use crate::schema::ForeignKey;
    use crate::values::FillValue;

    fn users() -> Table {
        let mut id = Column::new("id", GeneratorKind::Integer);
        id.max = 1_000_000.0;
        let mut email = Column::new("email", GeneratorKind::String);
        email.max = 500.0;
        let born = Column::new("born", GeneratorKind::Boolean);
        Table::new("users", vec![id, email, born])
    }

    fn posts() -> Table {
        let mut author = Column::new("author", GeneratorKind::ForeignKey);
        author.foreign_key = Some(ForeignKey::new("users", "id"));
        let mut posts = Table::new("posts", vec![Column::new("id", GeneratorKind::Integer), author]);
        posts.referenced_tables = vec!["users".into()];
        posts
    }

    fn schema() -> Schema {
        Schema::new(vec![posts(), users()])
    }

    fn auto_increment_bucket() -> GeneratorOptions {
        GeneratorOptions {
            generators: vec![GeneratorKind::Integer],
            options: ColumnOverrides {
                auto_increment: Some(true),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_defaults_without_customization() {
        let merged = CustomizedSchema::create(&schema(), &CustomSchema::default()).unwrap();
        assert_eq!(merged.table_names(), vec!["users", "posts"]);
        let users = merged.get_table("users").unwrap();
        assert_eq!(users.max_lines, Some(DEFAULT_MAX_LINES));
        assert_eq!(users.add_lines, None);
        assert_eq!(users.target_rows(0), 1000);
        assert!(users.before.is_empty());
    }

    #[test]
    fn test_bucket_applies_auto_increment() {
        let mut custom = CustomSchema::default();
        custom.settings.options.push(auto_increment_bucket());

        let merged = CustomizedSchema::create(&schema(), &custom).unwrap();
        let id = merged.get_table("users").unwrap().get_column("id").unwrap();
        assert!(id.auto_increment);
        assert!(!id.is_generated());
    }

    #[test]
    fn test_column_override_beats_bucket() {
        let mut custom = CustomSchema::default();
        custom.settings.options.push(auto_increment_bucket());
        let mut id = CustomColumn::new("ID");
        id.overrides.auto_increment = Some(false);
        let mut users = CustomTable::new("Users");
        users.columns.push(id);
        custom.tables.push(users);

        let merged = CustomizedSchema::create(&schema(), &custom).unwrap();
        let id = merged.get_table("users").unwrap().get_column("id").unwrap();
        assert!(!id.auto_increment);
        // the bucket still applies to the other table
        let posts_id = merged.get_table("posts").unwrap().get_column("id").unwrap();
        assert!(posts_id.auto_increment);
    }

    #[test]
    fn test_listed_columns_move_to_front() {
        let mut custom = CustomSchema::default();
        let mut users = CustomTable::new("users");
        users.columns = vec![CustomColumn::new("born"), CustomColumn::new("email")];
        custom.tables.push(users);

        let merged = CustomizedSchema::create(&schema(), &custom).unwrap();
        let names: Vec<_> = merged.get_table("users").unwrap().columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["born", "email", "id"]);
    }

    #[test]
    fn test_custom_table_limits_and_hooks() {
        let custom = CustomSchema::from_yaml(
            r#"
tables:
  - name: users
    lines: 5
    addLines: 10
    disableTriggers: true
    before: ["SELECT 1"]
    after: ["SELECT 2"]
"#,
        )
        .unwrap();
        let merged = CustomizedSchema::create(&schema(), &custom).unwrap();
        let users = merged.get_table("users").unwrap();
        assert_eq!(users.target_rows(0), 5);
        assert_eq!(users.disable_triggers, Some(true));
        assert_eq!(users.before, vec!["SELECT 1".to_string()]);
        assert_eq!(users.after, vec!["SELECT 2".to_string()]);

        let posts = merged.get_table("posts").unwrap();
        assert_eq!(posts.disable_triggers, None);
    }

    #[test]
    fn test_add_lines_only_is_unbounded() {
        let custom = CustomSchema::from_yaml("tables: [{name: users, addLines: 7}]").unwrap();
        let merged = CustomizedSchema::create(&schema(), &custom).unwrap();
        let users = merged.get_table("users").unwrap();
        assert_eq!(users.max_lines, None);
        assert_eq!(users.target_rows(5000), 5007);
    }

    #[test]
    fn test_max_length_value_caps_strings() {
        let mut custom = CustomSchema::default();
        custom.settings.max_length_value = Some(64);
        let merged = CustomizedSchema::create(&schema(), &custom).unwrap();
        let email = merged.get_table("users").unwrap().get_column("email").unwrap();
        assert_eq!(email.generator, GeneratorSpec::String { min: 0, max: 64 });
    }

    #[test]
    fn test_ratio_values_from_override() {
        let custom = CustomSchema::from_yaml(
            r#"
tables:
  - name: users
    columns:
      - name: email
        generator: values
        values: {val1: 0.1, val2: 0.9}
"#,
        )
        .unwrap();
        let merged = CustomizedSchema::create(&schema(), &custom).unwrap();
        let email = merged.get_table("users").unwrap().get_column("email").unwrap();
        let GeneratorSpec::Values { candidates } = &email.generator else {
            panic!("expected values generator");
        };
        assert_eq!(candidates.len(), 100);
        assert_eq!(
            candidates.iter().filter(|v| **v == FillValue::from("val1")).count(),
            10
        );
    }

    #[test]
    fn test_foreign_key_override_adds_reference() {
        let custom = CustomSchema::from_yaml(
            r#"
tables:
  - name: users
    columns:
      - name: born
        generator: foreignKey
        foreignKey: {table: groups, column: id}
"#,
        )
        .unwrap();
        let mut schema = schema();
        schema.tables.push(Table::new("groups", vec![Column::new("id", GeneratorKind::Integer)]));

        let merged = CustomizedSchema::create(&schema, &custom).unwrap();
        assert_eq!(merged.table_names(), vec!["groups", "users", "posts"]);
        assert!(merged
            .get_table("users")
            .unwrap()
            .referenced_tables
            .contains(&"groups".to_string()));
    }

    #[test]
    fn test_all_violations_reported_together() {
        let custom = CustomSchema::from_yaml(
            r#"
tables:
  - name: users
    columns:
      - name: born
        generator: date
      - name: email
        generator: values
        values: nowhere
"#,
        )
        .unwrap();
        let err = CustomizedSchema::create(&schema(), &custom).unwrap_err();
        let CoreError::Validation(violations) = err else {
            panic!("expected validation error");
        };
        let paths: Vec<_> = violations.iter().map(Violation::path).collect();
        assert!(paths.contains(&"users.born.minDate".to_string()));
        assert!(paths.contains(&"users.born.maxDate".to_string()));
        assert!(paths.contains(&"users.email.values".to_string()));
    }

    #[test]
    fn test_ignored_and_selected_tables() {
        let mut custom = CustomSchema::default();
        custom.settings.ignored_tables = vec!["POSTS".into()];
        let merged = CustomizedSchema::create(&schema(), &custom).unwrap();
        assert_eq!(merged.table_names(), vec!["users"]);

        let mut custom = CustomSchema::default();
        custom.settings.tables_to_fill = vec!["posts".into()];
        let merged = CustomizedSchema::create(&schema(), &custom).unwrap();
        assert_eq!(merged.table_names(), vec!["posts"]);
    }
}
