//! Function column generator.

use super::ValueGenerator;
use crate::registry::ColumnFunction;
use crate::GeneratorError;
use datafill_core::{FillValue, Row};
use rand::Rng;
use std::fmt;

/// Calls a registered function with the row index and the row built so far.
#[derive(Clone)]
pub struct FunctionGenerator {
    name: String,
    function: ColumnFunction,
}

impl FunctionGenerator {
    pub fn new(name: impl Into<String>, function: ColumnFunction) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }
}

impl fmt::Debug for FunctionGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionGenerator")
            .field("name", &self.name)
            .finish()
    }
}

impl ValueGenerator for FunctionGenerator {
    fn generate<R: Rng>(&self, _rng: &mut R, index: u64, row: &Row) -> Result<FillValue, GeneratorError> {
        Ok((self.function)(index, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FunctionRegistry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_invokes_registered_function() {
        let mut registry = FunctionRegistry::default();
        registry.register("double", |_, row| {
            row.get("n")
                .and_then(FillValue::as_i64)
                .map(|n| FillValue::Int(n * 2))
                .unwrap_or(FillValue::Null)
        });
        let generator = FunctionGenerator::new("double", registry.get("double").unwrap());

        let mut row = Row::new();
        row.set("n", FillValue::Int(21));
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(generator.generate(&mut rng, 0, &row).unwrap(), FillValue::Int(42));
    }
}
