//! Error types for the fill engine.

use datafill_core::CoreError;
use datafill_generator::GeneratorError;
use thiserror::Error;

/// Errors that abort a fill run.
#[derive(Error, Debug)]
pub enum FillError {
    /// Customization or ordering error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Generator initialization error.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// A before/after hook statement failed.
    #[error("Hook failed for {scope}: {query}: {source:#}")]
    Hook {
        scope: String,
        query: String,
        #[source]
        source: anyhow::Error,
    },

    /// A connector call failed.
    #[error("Failed to {operation} '{table}': {source:#}")]
    Connector {
        table: String,
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl FillError {
    pub(crate) fn connector<'a>(table: &'a str, operation: &'static str) -> impl FnOnce(anyhow::Error) -> Self + 'a {
        move |source| Self::Connector {
            table: table.to_string(),
            operation,
            source,
        }
    }
}
