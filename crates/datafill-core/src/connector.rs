//! Database connector trait.
//!
//! The fill engine talks to the database only through [`DatabaseConnector`],
//! so the same engine works with any backend (and with in-memory recorders
//! in tests).

use crate::schema::Schema;
use crate::values::{FillValue, Row};
use anyhow::Result;
use async_trait::async_trait;

/// Parameters for fetching foreign key candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRequest<'a> {
    /// Table being filled
    pub table: &'a str,
    /// Column being filled
    pub column: &'a str,
    /// Referenced table
    pub foreign_table: &'a str,
    /// Referenced column
    pub foreign_column: &'a str,
    /// Maximum number of values to return
    pub limit: u64,
    /// Exclude values already present in `table.column`
    pub unique: bool,
    /// Optional SQL predicate on the referenced table
    pub filter: Option<&'a str>,
}

/// Operations the fill engine needs from a database.
///
/// Implementations must return values of [`values_for_foreign_key`] in a
/// stable order for identical database contents; the engine shuffles them
/// with the run's seeded PRNG.
///
/// [`values_for_foreign_key`]: DatabaseConnector::values_for_foreign_key
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    /// Number of rows currently in a table.
    async fn count_rows(&self, table: &str) -> Result<u64>;

    /// Delete every row of a table.
    async fn empty_table(&self, table: &str) -> Result<()>;

    /// Execute a raw SQL statement (hooks).
    async fn execute_raw_query(&self, query: &str) -> Result<()>;

    /// Insert rows, silently skipping duplicates; returns the inserted count.
    async fn insert(&self, table: &str, rows: &[Row]) -> Result<u64>;

    /// Fetch up to `limit` distinct values of `foreign_table.foreign_column`.
    async fn values_for_foreign_key(&self, request: &ForeignKeyRequest<'_>) -> Result<Vec<FillValue>>;

    async fn disable_triggers(&self, table: &str) -> Result<()>;

    async fn enable_triggers(&self, table: &str) -> Result<()>;

    /// Introspect the database.
    async fn schema(&self) -> Result<Schema>;

    /// Persist the trigger state of `tables` before any of them is disabled.
    async fn backup_triggers(&self, _tables: &[String]) -> Result<()> {
        Ok(())
    }

    /// Re-enable every trigger recorded in the backup.
    async fn restore_triggers(&self) -> Result<()> {
        Ok(())
    }

    /// Forget the trigger backup after a clean run.
    async fn clean_trigger_backup(&self) -> Result<()> {
        Ok(())
    }
}
