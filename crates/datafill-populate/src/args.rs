//! Common CLI argument definitions shared by all fill commands.

use clap::Args;
use datafill_core::CustomSettings;
use std::path::PathBuf;

/// Settings file holding the introspected schema snapshot.
pub const SCHEMA_FILE: &str = "schema.yaml";

/// Settings file holding the user customization.
pub const CUSTOM_SCHEMA_FILE: &str = "custom_schema.yaml";

/// Settings file holding the trigger backup.
pub const TRIGGERS_FILE: &str = "triggers.yaml";

/// Common arguments shared by every database engine.
#[derive(Args, Clone, Debug)]
pub struct CommonFillArgs {
    /// Directory holding schema.yaml, custom_schema.yaml and triggers.yaml
    #[arg(long, default_value = "settings", env = "DATAFILL_SETTINGS_DIR")]
    pub settings_dir: PathBuf,

    /// Random seed for deterministic generation (overrides settings.seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Rows per insert batch (overrides settings.maxRowsPerBatch)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Specific tables to fill (comma-separated, overrides settings.tablesToFill)
    #[arg(long, value_delimiter = ',')]
    pub tables: Vec<String>,

    /// Dry-run mode: merge and validate the customization without touching the database
    #[arg(long)]
    pub dry_run: bool,
}

impl CommonFillArgs {
    pub fn schema_path(&self) -> PathBuf {
        self.settings_dir.join(SCHEMA_FILE)
    }

    pub fn custom_schema_path(&self) -> PathBuf {
        self.settings_dir.join(CUSTOM_SCHEMA_FILE)
    }

    pub fn triggers_path(&self) -> PathBuf {
        self.settings_dir.join(TRIGGERS_FILE)
    }

    /// Apply command-line overrides to the customization settings.
    pub fn apply_to(&self, settings: &mut CustomSettings) {
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if let Some(batch_size) = self.batch_size {
            settings.max_rows_per_batch = batch_size.max(1);
        }
        if !self.tables.is_empty() {
            settings.tables_to_fill = self.tables.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        common: CommonFillArgs,
    }

    #[test]
    fn test_defaults_leave_settings_untouched() {
        let cli = Cli::parse_from(["datafill"]);
        assert_eq!(cli.common.settings_dir, PathBuf::from("settings"));
        assert_eq!(cli.common.schema_path(), PathBuf::from("settings/schema.yaml"));

        let mut settings = CustomSettings {
            seed: Some(7),
            ..Default::default()
        };
        cli.common.apply_to(&mut settings);
        assert_eq!(settings.seed, Some(7));
        assert!(settings.tables_to_fill.is_empty());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "datafill",
            "--seed",
            "42",
            "--batch-size",
            "0",
            "--tables",
            "users,posts",
        ]);
        let mut settings = CustomSettings::default();
        cli.common.apply_to(&mut settings);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.max_rows_per_batch, 1);
        assert_eq!(settings.tables_to_fill, vec!["users", "posts"]);
    }
}
