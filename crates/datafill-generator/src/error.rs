//! Error type for generator initialization and generation.

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Every foreign key candidate of a unique, non-nullable column is used
    #[error("No more foreign key values available for {table}.{column}")]
    ForeignKeyExhausted { table: String, column: String },

    /// A function column names a function that is not registered
    #[error("Unknown function '{name}' for {table}.{column}")]
    UnknownFunction {
        table: String,
        column: String,
        name: String,
    },

    /// A faker template uses a placeholder that is not supported
    #[error("Unknown faker placeholder '{key}' for {table}.{column}")]
    UnknownFakerKey {
        table: String,
        column: String,
        key: String,
    },

    /// Fetching foreign key candidates failed
    #[error("Failed to fetch foreign key values for {table}.{column}: {source:#}")]
    Fetch {
        table: String,
        column: String,
        #[source]
        source: anyhow::Error,
    },
}

impl GeneratorError {
    /// Whether this error only ends the current table rather than the run.
    pub fn is_table_local(&self) -> bool {
        matches!(self, Self::ForeignKeyExhausted { .. })
    }
}
