//! Numeric value generators.

use super::ValueGenerator;
use crate::GeneratorError;
use datafill_core::{FillValue, Row};
use rand::Rng;

/// Integer in `[min, 2^width]`.
#[derive(Debug, Clone)]
pub struct BitGenerator {
    min: i64,
    max: i64,
}

impl BitGenerator {
    pub fn new(min: i64, width: u32) -> Self {
        let max = 1i64 << width.min(62);
        Self {
            min: min.min(max),
            max,
        }
    }
}

impl ValueGenerator for BitGenerator {
    fn generate<R: Rng>(&self, rng: &mut R, _index: u64, _row: &Row) -> Result<FillValue, GeneratorError> {
        Ok(FillValue::Int(rng.gen_range(self.min..=self.max)))
    }
}

#[derive(Debug, Clone)]
pub struct BooleanGenerator;

impl ValueGenerator for BooleanGenerator {
    fn generate<R: Rng>(&self, rng: &mut R, _index: u64, _row: &Row) -> Result<FillValue, GeneratorError> {
        Ok(FillValue::Bool(rng.gen::<bool>()))
    }
}

/// Integer in `[min, max]`.
#[derive(Debug, Clone)]
pub struct IntegerGenerator {
    min: i64,
    max: i64,
}

impl IntegerGenerator {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl ValueGenerator for IntegerGenerator {
    fn generate<R: Rng>(&self, rng: &mut R, _index: u64, _row: &Row) -> Result<FillValue, GeneratorError> {
        Ok(FillValue::Int(rng.gen_range(self.min..=self.max)))
    }
}

/// Float in `[min, max]`.
#[derive(Debug, Clone)]
pub struct RealGenerator {
    min: f64,
    max: f64,
}

impl RealGenerator {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl ValueGenerator for RealGenerator {
    fn generate<R: Rng>(&self, rng: &mut R, _index: u64, _row: &Row) -> Result<FillValue, GeneratorError> {
        Ok(FillValue::Float(rng.gen_range(self.min..=self.max)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bit_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = BitGenerator::new(0, 3);
        for i in 0..200 {
            let value = generator.generate(&mut rng, i, &Row::new()).unwrap();
            assert!((0..=8).contains(&value.as_i64().unwrap()));
        }
    }

    #[test]
    fn test_integer_range_inclusive() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = IntegerGenerator::new(10, 12);
        let mut seen = [false; 3];
        for i in 0..200 {
            let v = generator.generate(&mut rng, i, &Row::new()).unwrap().as_i64().unwrap();
            assert!((10..=12).contains(&v));
            seen[(v - 10) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_real_range_and_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = RealGenerator::new(0.0, 100.0);
        for i in 0..100 {
            let v = generator.generate(&mut rng, i, &Row::new()).unwrap().as_f64().unwrap();
            assert!((0.0..=100.0).contains(&v));
        }
        let fixed = RealGenerator::new(2.5, 2.5);
        assert_eq!(
            fixed.generate(&mut rng, 0, &Row::new()).unwrap(),
            FillValue::Float(2.5)
        );
    }

    #[test]
    fn test_boolean_is_deterministic() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for i in 0..20 {
            assert_eq!(
                BooleanGenerator.generate(&mut a, i, &Row::new()).unwrap(),
                BooleanGenerator.generate(&mut b, i, &Row::new()).unwrap()
            );
        }
    }
}
