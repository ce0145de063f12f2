//! Value generators for datafill.
//!
//! This crate turns the validated [`GeneratorSpec`](datafill_core::GeneratorSpec)
//! of each column into a generator that produces [`FillValue`](datafill_core::FillValue)s.
//! All randomness comes from one seeded `StdRng` per run, created with
//! [`new_rng`] and passed by reference to every generator, so identical seed,
//! schema and connector responses produce identical rows.
//!
//! # Architecture
//!
//! ```text
//! CustomizedTable
//!        │
//!        ▼
//! ┌──────────────────────────┐
//! │  init_table_generators   │  1. foreign key fetches (concurrent)
//! │                          │  2. shuffles / monotonic presort (sequential)
//! └────────────┬─────────────┘
//!              │
//!              ▼
//!       TableGenerator ── generate_row(rng, index) ──▶ Row
//! ```
//!
//! # Example
//!
//! ```rust
//! use datafill_core::{CustomizedColumn, GeneratorSpec};
//! use datafill_generator::{new_rng, ColumnGenerator, FunctionRegistry, ValueGenerator};
//!
//! let column = CustomizedColumn::new("age", GeneratorSpec::Integer { min: 18, max: 99 });
//! let mut rng = new_rng(Some(42));
//! let generator = ColumnGenerator::init("users", &column, 10, None, &mut rng, &FunctionRegistry::default())
//!     .unwrap()
//!     .unwrap();
//! let value = generator.generate(&mut rng, 0, &Default::default()).unwrap();
//! assert!((18..=99).contains(&value.as_i64().unwrap()));
//! ```

pub mod error;
pub mod generators;
pub mod registry;

pub use error::GeneratorError;
pub use generators::{
    init_table_generators, preflight, ColumnGenerator, TableGenerator, ValueGenerator,
};
pub use registry::{ColumnFunction, FunctionRegistry};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Create the run's PRNG; without a seed the run is not reproducible.
pub fn new_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
