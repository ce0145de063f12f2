//! Core types for the datafill framework.
//!
//! This crate provides the schema-level half of a fill run:
//!
//! - [`Schema`] - Introspected tables and columns, stored as a YAML snapshot
//! - [`CustomSchema`] - User overrides, stored as a YAML document
//! - [`CustomizedSchema`] - The merged, validated and ordered result
//! - [`DatabaseConnector`] - The database operations a fill run needs
//! - [`FillValue`] / [`Row`] - Generated values
//!
//! # Architecture
//!
//! ```text
//! datafill-core (this crate)
//!    │
//!    ├─── datafill-generator   (per-column value strategies)
//!    ├─── datafill-populate    (fill engine, drives a DatabaseConnector)
//!    └─── datafill-postgresql  (DatabaseConnector for PostgreSQL)
//! ```
//!
//! # Example
//!
//! ```rust
//! use datafill_core::{CustomSchema, CustomizedSchema, Schema};
//!
//! let schema = Schema::from_yaml(r#"
//! tables:
//!   - name: users
//!     columns:
//!       - name: name
//!         generator: string
//!         max: 40
//! "#).unwrap();
//! let custom = CustomSchema::from_yaml("tables: [{name: users, maxLines: 10}]").unwrap();
//!
//! let customized = CustomizedSchema::create(&schema, &custom).unwrap();
//! assert_eq!(customized.tables[0].target_rows(0), 10);
//! ```

pub mod connector;
pub mod custom;
pub mod customized;
pub mod error;
pub mod merge;
pub mod order;
pub mod schema;
pub mod validate;
pub mod values;

pub use connector::{DatabaseConnector, ForeignKeyRequest};
pub use custom::{
    ColumnOverrides, CustomColumn, CustomSchema, CustomSettings, CustomTable, GeneratorOptions,
    DEFAULT_MAX_ROWS_PER_BATCH,
};
pub use customized::{
    CustomizedColumn, CustomizedForeignKey, CustomizedSchema, CustomizedTable, GeneratorSpec,
    DEFAULT_MAX_LINES,
};
pub use error::{CoreError, Violation};
pub use order::order_tables;
pub use schema::{Column, ForeignKey, GeneratorKind, Monotonic, Schema, Table, ValuesSpec};
pub use validate::parse_datetime;
pub use values::{json_to_fill_value, FillValue, Row, DATETIME_FORMAT};
