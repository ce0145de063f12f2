//! Trigger backup file.
//!
//! Before triggers are disabled, the tables that own user triggers are
//! recorded here. A run that crashes leaves the file behind so
//! `datafill restore-triggers` can re-enable them.

use crate::error::PostgreSQLConnectorError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A user trigger recorded before its table was filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRecord {
    pub schema: String,
    pub table: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerBackup {
    #[serde(default)]
    pub triggers: Vec<TriggerRecord>,
}

impl TriggerBackup {
    /// Add records that are not already present.
    pub fn merge(&mut self, records: impl IntoIterator<Item = TriggerRecord>) {
        for record in records {
            if !self.triggers.contains(&record) {
                self.triggers.push(record);
            }
        }
    }

    /// Distinct `(schema, table)` pairs, in recording order.
    pub fn tables(&self) -> Vec<(&str, &str)> {
        let mut tables = Vec::new();
        for trigger in &self.triggers {
            let key = (trigger.schema.as_str(), trigger.table.as_str());
            if !tables.contains(&key) {
                tables.push(key);
            }
        }
        tables
    }
}

/// File-backed [`TriggerBackup`].
#[derive(Debug, Clone)]
pub struct TriggerStore {
    path: PathBuf,
}

impl TriggerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the backup; a missing file is an empty backup.
    pub fn load(&self) -> Result<TriggerBackup, PostgreSQLConnectorError> {
        if !self.path.exists() {
            return Ok(TriggerBackup::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn save(&self, backup: &TriggerBackup) -> Result<(), PostgreSQLConnectorError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let content = serde_yaml::to_string(backup)?;
        fs::write(&self.path, content).map_err(|source| self.io_error(source))
    }

    /// Remove the backup file if it exists.
    pub fn clean(&self) -> Result<(), PostgreSQLConnectorError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(self.io_error(e)),
            _ => Ok(()),
        }
    }

    fn io_error(&self, source: std::io::Error) -> PostgreSQLConnectorError {
        PostgreSQLConnectorError::BackupIo {
            path: self.path.clone(),
            source,
        }
    }
}
