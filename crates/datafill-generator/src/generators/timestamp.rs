//! Date and time value generators.

use super::ValueGenerator;
use crate::GeneratorError;
use chrono::{DateTime, NaiveDateTime};
use datafill_core::{FillValue, Monotonic, Row};
use rand::Rng;

/// Uniform date/time in `[min, max]`, optionally pre-sorted.
#[derive(Debug, Clone)]
pub struct DateGenerator {
    min: NaiveDateTime,
    max: NaiveDateTime,
    /// Pre-generated monotonic sequence indexed by row
    sequence: Vec<NaiveDateTime>,
}

impl DateGenerator {
    pub fn new(min: NaiveDateTime, max: NaiveDateTime) -> Self {
        Self {
            min,
            max,
            sequence: Vec::new(),
        }
    }

    /// Pre-generate `rows` dates sorted in the requested order.
    ///
    /// Rows past the end of the sequence fall back to random dates.
    pub fn with_monotonic<R: Rng>(mut self, rng: &mut R, monotonic: Monotonic, rows: u64) -> Self {
        if monotonic.is_none() {
            return self;
        }
        let mut sequence: Vec<NaiveDateTime> = (0..rows).map(|_| self.random_date(rng)).collect();
        sequence.sort_unstable();
        if monotonic == Monotonic::Descending {
            sequence.reverse();
        }
        self.sequence = sequence;
        self
    }

    fn random_date<R: Rng>(&self, rng: &mut R) -> NaiveDateTime {
        let start_ts = self.min.and_utc().timestamp();
        let end_ts = self.max.and_utc().timestamp();
        if start_ts >= end_ts {
            return self.min;
        }
        let random_ts = rng.gen_range(start_ts..=end_ts);
        DateTime::from_timestamp(random_ts, 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or(self.min)
    }
}

impl ValueGenerator for DateGenerator {
    fn generate<R: Rng>(&self, rng: &mut R, index: u64, _row: &Row) -> Result<FillValue, GeneratorError> {
        let date = usize::try_from(index)
            .ok()
            .and_then(|i| self.sequence.get(i).copied())
            .unwrap_or_else(|| self.random_date(rng));
        Ok(FillValue::DateTime(date))
    }
}

/// MySQL-style `TIME` in `-838:00:00..=838:59:59`, rendered without padding.
#[derive(Debug, Clone)]
pub struct TimeGenerator;

impl ValueGenerator for TimeGenerator {
    fn generate<R: Rng>(&self, rng: &mut R, _index: u64, _row: &Row) -> Result<FillValue, GeneratorError> {
        let hours = rng.gen_range(-838..=838);
        let minutes = rng.gen_range(0..=59);
        let seconds = rng.gen_range(0..=59);
        Ok(FillValue::Text(format!("{hours}:{minutes}:{seconds}")))
    }
}
