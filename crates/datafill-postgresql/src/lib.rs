//! PostgreSQL connector for datafill.
//!
//! Introspects a schema into a [`Schema`](datafill_core::Schema) and
//! implements [`DatabaseConnector`](datafill_core::DatabaseConnector) on top
//! of tokio-postgres. Batches are sent as one JSON array per statement and
//! expanded server-side with `json_populate_recordset`.

pub mod args;
pub mod connector;
pub mod error;
pub mod introspect;
pub mod sql;
pub mod triggers;

pub use args::PostgreSQLFillArgs;
pub use connector::{new_postgresql_client, PostgreSQLConnector};
pub use error::PostgreSQLConnectorError;
pub use triggers::{TriggerBackup, TriggerRecord, TriggerStore};
