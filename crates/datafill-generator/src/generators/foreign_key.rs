//! Foreign key generator.

use super::ValueGenerator;
use crate::GeneratorError;
use datafill_core::{FillValue, Row};
use rand::seq::SliceRandom;
use rand::Rng;

/// Picks referenced values fetched when the table starts.
///
/// The candidate pool is shuffled once with the run's PRNG and then indexed
/// by row. Past its end a non-unique column wraps around; a unique column
/// yields NULL when nullable and fails otherwise.
#[derive(Debug, Clone)]
pub struct ForeignKeyGenerator {
    table: String,
    column: String,
    candidates: Vec<FillValue>,
    unique: bool,
    nullable: bool,
}

impl ForeignKeyGenerator {
    pub fn new<R: Rng>(
        table: &str,
        column: &str,
        mut candidates: Vec<FillValue>,
        unique: bool,
        nullable: bool,
        rng: &mut R,
    ) -> Self {
        candidates.shuffle(rng);
        Self {
            table: table.to_string(),
            column: column.to_string(),
            candidates,
            unique,
            nullable,
        }
    }

    pub fn candidates(&self) -> &[FillValue] {
        &self.candidates
    }
}

impl ValueGenerator for ForeignKeyGenerator {
    fn generate<R: Rng>(&self, _rng: &mut R, index: u64, _row: &Row) -> Result<FillValue, GeneratorError> {
        let len = self.candidates.len() as u64;
        if index < len {
            return Ok(self.candidates[index as usize].clone());
        }
        if len > 0 && !self.unique {
            return Ok(self.candidates[(index % len) as usize].clone());
        }
        if self.nullable {
            return Ok(FillValue::Null);
        }
        Err(GeneratorError::ForeignKeyExhausted {
            table: self.table.clone(),
            column: self.column.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> Vec<FillValue> {
        (1..=3).map(FillValue::Int).collect()
    }

    #[test]
    fn test_candidates_are_shuffled_deterministically() {
        let a = ForeignKeyGenerator::new("t", "c", (0..50).map(FillValue::Int).collect(), false, false, &mut StdRng::seed_from_u64(42));
        let b = ForeignKeyGenerator::new("t", "c", (0..50).map(FillValue::Int).collect(), false, false, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.candidates(), b.candidates());
        assert_eq!(a.candidates().len(), 50);
    }

    #[test]
    fn test_non_unique_wraps() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = ForeignKeyGenerator::new("t", "c", pool(), false, false, &mut rng);
        let first = generator.generate(&mut rng, 0, &Row::new()).unwrap();
        let wrapped = generator.generate(&mut rng, 3, &Row::new()).unwrap();
        assert_eq!(first, wrapped);
    }

    #[test]
    fn test_unique_exhaustion() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = ForeignKeyGenerator::new("posts", "author", pool(), true, false, &mut rng);
        assert!(generator.generate(&mut rng, 2, &Row::new()).is_ok());
        let err = generator.generate(&mut rng, 3, &Row::new()).unwrap_err();
        assert!(matches!(err, GeneratorError::ForeignKeyExhausted { .. }));
        assert!(err.to_string().contains("posts.author"));

        let nullable = ForeignKeyGenerator::new("posts", "author", pool(), true, true, &mut rng);
        assert_eq!(nullable.generate(&mut rng, 3, &Row::new()).unwrap(), FillValue::Null);
    }

    #[test]
    fn test_empty_pool() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = ForeignKeyGenerator::new("t", "c", Vec::new(), false, false, &mut rng);
        assert!(generator.generate(&mut rng, 0, &Row::new()).is_err());
    }
}
