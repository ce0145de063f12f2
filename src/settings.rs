//! Settings directory handling.
//!
//! The settings directory holds the schema snapshot written by `analyze`,
//! the user customization, and the trigger backup of an interrupted run.

use anyhow::{Context, Result};
use datafill_core::{CustomSchema, CustomTable, CustomizedSchema, Schema};
use datafill_populate::CommonFillArgs;
use std::path::Path;
use tracing::info;

/// Load the snapshot and customization, apply CLI overrides and merge them.
pub fn load_customized_schema(args: &CommonFillArgs) -> Result<CustomizedSchema> {
    let schema = Schema::from_file(&args.schema_path())?;
    let mut custom = CustomSchema::load_or_default(&args.custom_schema_path())
        .with_context(|| format!("Failed to load {}", args.custom_schema_path().display()))?;
    args.apply_to(&mut custom.settings);
    Ok(CustomizedSchema::create(&schema, &custom)?)
}

/// A customization listing every table with engine defaults.
pub fn default_custom_schema(schema: &Schema) -> CustomSchema {
    CustomSchema {
        tables: schema
            .tables
            .iter()
            .map(|t| CustomTable::new(t.name.clone()))
            .collect(),
        ..Default::default()
    }
}

/// Write the snapshot, and a default customization when none exists yet.
///
/// Returns whether a customization file was created.
pub fn write_analysis(settings_dir: &Path, schema_file: &Path, custom_file: &Path, schema: &Schema) -> Result<bool> {
    schema
        .write_file(schema_file)
        .with_context(|| format!("Failed to write schema snapshot in {}", settings_dir.display()))?;
    info!("Schema snapshot written to {}", schema_file.display());

    if custom_file.exists() {
        return Ok(false);
    }
    default_custom_schema(schema).write_file(custom_file)?;
    info!("Default customization written to {}", custom_file.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use datafill_core::{Column, CoreError, GeneratorKind, Table};

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        common: CommonFillArgs,
    }

    fn snapshot() -> Schema {
        let mut id = Column::new("id", GeneratorKind::Integer);
        id.auto_increment = true;
        Schema::new(vec![Table::new(
            "users",
            vec![id, Column::new("name", GeneratorKind::String)],
        )])
    }

    fn args(dir: &Path, extra: &[&str]) -> CommonFillArgs {
        let dir = dir.to_string_lossy().to_string();
        let mut argv = vec!["datafill", "--settings-dir", dir.as_str()];
        argv.extend_from_slice(extra);
        Cli::parse_from(argv).common
    }

    #[test]
    fn test_missing_snapshot_asks_for_analyze() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_customized_schema(&args(dir.path(), &[])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::SnapshotMissing(_))
        ));
        assert!(err.to_string().contains("datafill analyze"));
    }

    #[test]
    fn test_analysis_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let common = args(dir.path(), &["--seed", "7", "--batch-size", "50"]);

        let created = write_analysis(
            dir.path(),
            &common.schema_path(),
            &common.custom_schema_path(),
            &snapshot(),
        )
        .unwrap();
        assert!(created);

        let customized = load_customized_schema(&common).unwrap();
        assert_eq!(customized.settings.seed, Some(7));
        assert_eq!(customized.settings.max_rows_per_batch, 50);
        assert_eq!(customized.tables.len(), 1);
        assert_eq!(customized.tables[0].max_lines, Some(1000));
    }

    #[test]
    fn test_existing_customization_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let common = args(dir.path(), &[]);
        std::fs::write(
            common.custom_schema_path(),
            "tables:\n  - name: users\n    maxLines: 5\n",
        )
        .unwrap();

        let created = write_analysis(
            dir.path(),
            &common.schema_path(),
            &common.custom_schema_path(),
            &snapshot(),
        )
        .unwrap();
        assert!(!created);
        let customized = load_customized_schema(&common).unwrap();
        assert_eq!(customized.tables[0].max_lines, Some(5));
    }
}
