//! String value generator.

use super::ValueGenerator;
use crate::GeneratorError;
use datafill_core::{FillValue, Row};
use rand::Rng;
use uuid::Uuid;

/// Characters used for random strings.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Length of a hyphenated UUID.
pub const UUID_LENGTH: usize = 36;

/// Random string of uniform length in `[min, max]`.
///
/// Unique columns wide enough for a UUID get a UUID-shaped token instead.
#[derive(Debug, Clone)]
pub struct StringGenerator {
    min: usize,
    max: usize,
    uuid: bool,
}

impl StringGenerator {
    pub fn new(min: usize, max: usize, unique: bool) -> Self {
        Self {
            min: min.min(max),
            max,
            uuid: unique && max >= UUID_LENGTH,
        }
    }
}

impl ValueGenerator for StringGenerator {
    fn generate<R: Rng>(&self, rng: &mut R, _index: u64, _row: &Row) -> Result<FillValue, GeneratorError> {
        if self.uuid {
            return Ok(FillValue::Text(uuid_token(rng)));
        }
        let len = rng.gen_range(self.min..=self.max);
        let text: String = (0..len)
            .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
            .collect();
        Ok(FillValue::Text(text))
    }
}

/// UUID v4 built from the provided RNG so it follows the run's seed.
pub fn uuid_token<R: Rng>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    bytes[6] = (bytes[6] & 0x0f) | 0x40; // Version 4
    bytes[8] = (bytes[8] & 0x3f) | 0x80; // Variant RFC 4122

    Uuid::from_bytes(bytes).hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_length_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = StringGenerator::new(3, 8, false);
        for i in 0..100 {
            let value = generator.generate(&mut rng, i, &Row::new()).unwrap();
            let s = value.as_str().unwrap();
            assert!((3..=8).contains(&s.len()));
            assert!(s.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_fixed_length_is_deterministic() {
        let generator = StringGenerator::new(100, 100, false);
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let first = generator.generate(&mut a, 0, &Row::new()).unwrap();
        let second = generator.generate(&mut b, 0, &Row::new()).unwrap();
        assert_eq!(first.as_str().unwrap().len(), 100);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unique_wide_column_uses_uuid() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = StringGenerator::new(0, 255, true);
        let value = generator.generate(&mut rng, 0, &Row::new()).unwrap();
        let token = value.as_str().unwrap();
        assert_eq!(token.len(), UUID_LENGTH);
        assert_eq!(Uuid::parse_str(token).unwrap().get_version_num(), 4);

        // too narrow for a UUID: plain random string
        let narrow = StringGenerator::new(0, 20, true);
        let value = narrow.generate(&mut rng, 0, &Row::new()).unwrap();
        assert!(value.as_str().unwrap().len() <= 20);
    }
}
