//! Host-registered functions for `function` columns.
//!
//! A function column names an entry of the [`FunctionRegistry`]; nothing is
//! ever evaluated from the customization document itself.

use datafill_core::{FillValue, Row};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A column function: `(row_index, row_so_far) -> value`.
pub type ColumnFunction = Arc<dyn Fn(u64, &Row) -> FillValue + Send + Sync>;

/// Named column functions available to a fill run.
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, ColumnFunction>,
}

impl FunctionRegistry {
    /// A registry with no functions at all.
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Register (or replace) a function.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(u64, &Row) -> FillValue + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    pub fn get(&self, name: &str) -> Option<ColumnFunction> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FunctionRegistry {
    /// Built-ins: `rowIndex` (0-based) and `rowNumber` (1-based).
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("rowIndex", |index, _| FillValue::Int(index as i64))
            .register("rowNumber", |index, _| FillValue::Int(index as i64 + 1));
        registry
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let registry = FunctionRegistry::default();
        assert_eq!(registry.names(), vec!["rowIndex", "rowNumber"]);
        let row_number = registry.get("rowNumber").unwrap();
        assert_eq!(row_number(4, &Row::new()), FillValue::Int(5));
    }

    #[test]
    fn test_function_reads_previous_columns() {
        let mut registry = FunctionRegistry::empty();
        registry.register("slug", |_, row| match row.get("title") {
            Some(FillValue::Text(title)) => FillValue::Text(title.to_lowercase().replace(' ', "-")),
            _ => FillValue::Null,
        });

        let mut row = Row::new();
        row.set("title", FillValue::from("Hello World"));
        let slug = registry.get("slug").unwrap();
        assert_eq!(slug(0, &row), FillValue::from("hello-world"));
        assert!(!registry.contains("rowIndex"));
    }
}
