//! Value pool generator.

use super::ValueGenerator;
use crate::GeneratorError;
use datafill_core::{FillValue, Row};
use rand::seq::SliceRandom;
use rand::Rng;

/// Uniform pick from a flattened candidate list.
///
/// Ratio pools are already flattened, so the uniform pick honours weights.
#[derive(Debug, Clone)]
pub struct ValuesGenerator {
    candidates: Vec<FillValue>,
}

impl ValuesGenerator {
    pub fn new(candidates: Vec<FillValue>) -> Self {
        Self { candidates }
    }
}

impl ValueGenerator for ValuesGenerator {
    fn generate<R: Rng>(&self, rng: &mut R, _index: u64, _row: &Row) -> Result<FillValue, GeneratorError> {
        Ok(self.candidates.choose(rng).cloned().unwrap_or(FillValue::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_weighted_pool() {
        let mut candidates = vec![FillValue::from("val1"); 10];
        candidates.extend(vec![FillValue::from("val2"); 90]);
        let generator = ValuesGenerator::new(candidates);

        let mut rng = StdRng::seed_from_u64(42);
        let picks: Vec<FillValue> = (0..1000)
            .map(|i| generator.generate(&mut rng, i, &Row::new()).unwrap())
            .collect();
        let val1 = picks.iter().filter(|v| v.as_str() == Some("val1")).count();
        assert!(val1 > 40 && val1 < 170, "val1 picked {val1} times");
    }

    #[test]
    fn test_single_candidate() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = ValuesGenerator::new(vec![FillValue::Int(7)]);
        assert_eq!(generator.generate(&mut rng, 0, &Row::new()).unwrap(), FillValue::Int(7));
    }
}
