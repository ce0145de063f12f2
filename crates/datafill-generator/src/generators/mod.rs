//! Individual value generators, one per generator kind.
//!
//! [`init_table_generators`] builds a [`TableGenerator`] for one table in two
//! phases: connector I/O for all columns runs concurrently, then every
//! RNG-dependent initialization runs sequentially in column order so the
//! same seed always consumes the PRNG in the same way.

pub mod faker;
pub mod foreign_key;
pub mod function;
pub mod numeric;
pub mod string;
pub mod timestamp;
pub mod values;

use crate::{FunctionRegistry, GeneratorError};
use datafill_core::{
    CustomizedColumn, CustomizedSchema, CustomizedTable, DatabaseConnector, FillValue,
    ForeignKeyRequest, GeneratorSpec, Row,
};
use futures::future::try_join_all;
use rand::Rng;
use tracing::debug;

pub use faker::FakerGenerator;
pub use foreign_key::ForeignKeyGenerator;
pub use function::FunctionGenerator;
pub use numeric::{BitGenerator, BooleanGenerator, IntegerGenerator, RealGenerator};
pub use string::StringGenerator;
pub use timestamp::{DateGenerator, TimeGenerator};
pub use values::ValuesGenerator;

/// Trait for generating values.
pub trait ValueGenerator {
    /// Generate a value for row `index` given the columns already built.
    fn generate<R: Rng>(&self, rng: &mut R, index: u64, row: &Row) -> Result<FillValue, GeneratorError>;
}

/// Initialized generator of one column, dispatched by kind.
#[derive(Debug, Clone)]
pub enum ColumnGenerator {
    Bit(BitGenerator),
    Boolean(BooleanGenerator),
    Integer(IntegerGenerator),
    Real(RealGenerator),
    Date(DateGenerator),
    Time(TimeGenerator),
    String(StringGenerator),
    Values(ValuesGenerator),
    ForeignKey(ForeignKeyGenerator),
    Function(FunctionGenerator),
    Faker(FakerGenerator),
}

impl ColumnGenerator {
    /// Build the generator for a column.
    ///
    /// `fetched` carries the foreign key candidates loaded in the I/O phase.
    /// Returns `None` for columns the database fills itself.
    pub fn init<R: Rng>(
        table: &str,
        column: &CustomizedColumn,
        delta_rows: u64,
        fetched: Option<Vec<FillValue>>,
        rng: &mut R,
        registry: &FunctionRegistry,
    ) -> Result<Option<Self>, GeneratorError> {
        if !column.is_generated() {
            return Ok(None);
        }
        let generator = match &column.generator {
            GeneratorSpec::None => return Ok(None),
            GeneratorSpec::Bit { min, width } => Self::Bit(BitGenerator::new(*min, *width)),
            GeneratorSpec::Boolean => Self::Boolean(BooleanGenerator),
            GeneratorSpec::Integer { min, max } => Self::Integer(IntegerGenerator::new(*min, *max)),
            GeneratorSpec::Real { min, max } => Self::Real(RealGenerator::new(*min, *max)),
            GeneratorSpec::Date {
                min,
                max,
                monotonic,
            } => Self::Date(DateGenerator::new(*min, *max).with_monotonic(rng, *monotonic, delta_rows)),
            GeneratorSpec::Time => Self::Time(TimeGenerator),
            GeneratorSpec::String { min, max } => {
                Self::String(StringGenerator::new(*min, *max, column.unique))
            }
            GeneratorSpec::Values { candidates } => {
                Self::Values(ValuesGenerator::new(candidates.clone()))
            }
            GeneratorSpec::ForeignKey(_) => Self::ForeignKey(ForeignKeyGenerator::new(
                table,
                &column.name,
                fetched.unwrap_or_default(),
                column.unique,
                column.nullable > 0.0,
                rng,
            )),
            GeneratorSpec::Function { name } => {
                let function = registry
                    .get(name)
                    .ok_or_else(|| GeneratorError::UnknownFunction {
                        table: table.to_string(),
                        column: column.name.clone(),
                        name: name.clone(),
                    })?;
                Self::Function(FunctionGenerator::new(name.clone(), function))
            }
            GeneratorSpec::Faker { template, locale } => {
                Self::Faker(FakerGenerator::new(table, &column.name, template, locale)?)
            }
        };
        Ok(Some(generator))
    }

    /// Value pools and foreign keys keep their values even on nullable columns.
    pub fn handles_nulls(&self) -> bool {
        matches!(self, Self::Values(_) | Self::ForeignKey(_))
    }
}

impl ValueGenerator for ColumnGenerator {
    fn generate<R: Rng>(&self, rng: &mut R, index: u64, row: &Row) -> Result<FillValue, GeneratorError> {
        match self {
            Self::Bit(g) => g.generate(rng, index, row),
            Self::Boolean(g) => g.generate(rng, index, row),
            Self::Integer(g) => g.generate(rng, index, row),
            Self::Real(g) => g.generate(rng, index, row),
            Self::Date(g) => g.generate(rng, index, row),
            Self::Time(g) => g.generate(rng, index, row),
            Self::String(g) => g.generate(rng, index, row),
            Self::Values(g) => g.generate(rng, index, row),
            Self::ForeignKey(g) => g.generate(rng, index, row),
            Self::Function(g) => g.generate(rng, index, row),
            Self::Faker(g) => g.generate(rng, index, row),
        }
    }
}

#[derive(Debug, Clone)]
struct GeneratedColumn {
    name: String,
    nullable: f64,
    generator: ColumnGenerator,
}

/// Generators for every produced column of one table, in generation order.
#[derive(Debug, Clone)]
pub struct TableGenerator {
    table: String,
    columns: Vec<GeneratedColumn>,
}

impl TableGenerator {
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Names of the columns present in every generated row.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Build row `index`.
    ///
    /// Each generator sees the values of the columns before it. A nullable
    /// column draws once after generation and becomes NULL when the draw is
    /// below its probability.
    pub fn generate_row<R: Rng>(&self, rng: &mut R, index: u64) -> Result<Row, GeneratorError> {
        let mut row = Row::with_capacity(self.columns.len());
        for column in &self.columns {
            let mut value = column.generator.generate(rng, index, &row)?;
            if column.nullable > 0.0
                && !column.generator.handles_nulls()
                && rng.gen::<f64>() < column.nullable
            {
                value = FillValue::Null;
            }
            row.set(column.name.clone(), value);
        }
        Ok(row)
    }
}

/// Initialize the generators of a table that needs `delta_rows` more rows.
pub async fn init_table_generators<R: Rng>(
    connector: &dyn DatabaseConnector,
    table: &CustomizedTable,
    delta_rows: u64,
    rng: &mut R,
    registry: &FunctionRegistry,
) -> Result<TableGenerator, GeneratorError> {
    let produced: Vec<&CustomizedColumn> = table.columns.iter().filter(|c| c.is_generated()).collect();

    let fetches = produced.iter().map(|column| async move {
        let GeneratorSpec::ForeignKey(fk) = &column.generator else {
            return Ok(None);
        };
        let request = ForeignKeyRequest {
            table: &table.name,
            column: &column.name,
            foreign_table: &fk.table,
            foreign_column: &fk.column,
            limit: delta_rows,
            unique: column.unique,
            filter: fk.filter.as_deref(),
        };
        let values = connector
            .values_for_foreign_key(&request)
            .await
            .map_err(|source| GeneratorError::Fetch {
                table: table.name.clone(),
                column: column.name.clone(),
                source,
            })?;
        debug!(
            "Fetched {} candidate(s) for {}.{} from {}.{}",
            values.len(),
            table.name,
            column.name,
            fk.table,
            fk.column
        );
        Ok::<_, GeneratorError>(Some(values))
    });
    let fetched = try_join_all(fetches).await?;

    let mut columns = Vec::with_capacity(produced.len());
    for (column, fetched) in produced.into_iter().zip(fetched) {
        if let Some(generator) =
            ColumnGenerator::init(&table.name, column, delta_rows, fetched, rng, registry)?
        {
            columns.push(GeneratedColumn {
                name: column.name.clone(),
                nullable: column.nullable,
                generator,
            });
        }
    }

    Ok(TableGenerator {
        table: table.name.clone(),
        columns,
    })
}

/// Check every function name and faker template before anything is written.
pub fn preflight(schema: &CustomizedSchema, registry: &FunctionRegistry) -> Result<(), GeneratorError> {
    for table in &schema.tables {
        for column in table.columns.iter().filter(|c| c.is_generated()) {
            match &column.generator {
                GeneratorSpec::Function { name } if !registry.contains(name) => {
                    return Err(GeneratorError::UnknownFunction {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        name: name.clone(),
                    });
                }
                GeneratorSpec::Faker { template, .. } => {
                    faker::check_template(template).map_err(|key| {
                        GeneratorError::UnknownFakerKey {
                            table: table.name.clone(),
                            column: column.name.clone(),
                            key,
                        }
                    })?;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use datafill_core::{CustomizedForeignKey, Schema};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// Connector that only answers foreign key lookups.
    #[derive(Default)]
    struct PoolConnector {
        requests: Mutex<Vec<(String, u64, bool)>>,
    }

    #[async_trait]
    impl DatabaseConnector for PoolConnector {
        async fn count_rows(&self, _table: &str) -> Result<u64> {
            Ok(0)
        }
        async fn empty_table(&self, _table: &str) -> Result<()> {
            Ok(())
        }
        async fn execute_raw_query(&self, _query: &str) -> Result<()> {
            Ok(())
        }
        async fn insert(&self, _table: &str, rows: &[Row]) -> Result<u64> {
            Ok(rows.len() as u64)
        }
        async fn values_for_foreign_key(&self, request: &ForeignKeyRequest<'_>) -> Result<Vec<FillValue>> {
            self.requests.lock().unwrap().push((
                format!("{}.{}", request.foreign_table, request.foreign_column),
                request.limit,
                request.unique,
            ));
            Ok((1..=3).map(FillValue::Int).collect())
        }
        async fn disable_triggers(&self, _table: &str) -> Result<()> {
            Ok(())
        }
        async fn enable_triggers(&self, _table: &str) -> Result<()> {
            Ok(())
        }
        async fn schema(&self) -> Result<Schema> {
            Ok(Schema::default())
        }
    }

    fn posts() -> CustomizedTable {
        let mut id = CustomizedColumn::new("id", GeneratorSpec::Integer { min: 0, max: 10 });
        id.auto_increment = true;
        let mut author = CustomizedColumn::new(
            "author",
            GeneratorSpec::ForeignKey(CustomizedForeignKey {
                table: "users".into(),
                column: "id".into(),
                filter: None,
            }),
        );
        author.unique = true;
        let mut title = CustomizedColumn::new("title", GeneratorSpec::String { min: 5, max: 5 });
        title.nullable = 1.0;
        let slug = CustomizedColumn::new("slug", GeneratorSpec::Function { name: "rowNumber".into() });
        let blob = CustomizedColumn::new("blob", GeneratorSpec::None);
        CustomizedTable::new("posts", vec![id, author, title, slug, blob])
    }

    #[tokio::test]
    async fn test_init_fetches_foreign_keys() {
        let connector = PoolConnector::default();
        let mut rng = StdRng::seed_from_u64(42);
        let generator = init_table_generators(&connector, &posts(), 3, &mut rng, &FunctionRegistry::default())
            .await
            .unwrap();

        assert_eq!(generator.column_names(), vec!["author", "title", "slug"]);
        assert_eq!(
            *connector.requests.lock().unwrap(),
            vec![("users.id".to_string(), 3, true)]
        );

        let row = generator.generate_row(&mut rng, 0).unwrap();
        assert!(row.get("id").is_none());
        assert!(row.get("blob").is_none());
        assert_eq!(row.get("title"), Some(&FillValue::Null));
        assert_eq!(row.get("slug"), Some(&FillValue::Int(1)));
        assert!(matches!(row.get("author"), Some(FillValue::Int(_))));

        let err = generator.generate_row(&mut rng, 3).unwrap_err();
        assert!(err.is_table_local());
    }

    #[tokio::test]
    async fn test_unknown_function_fails_init() {
        let connector = PoolConnector::default();
        let mut rng = StdRng::seed_from_u64(42);
        let table = CustomizedTable::new(
            "t",
            vec![CustomizedColumn::new("c", GeneratorSpec::Function { name: "nope".into() })],
        );
        let err = init_table_generators(&connector, &table, 1, &mut rng, &FunctionRegistry::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::UnknownFunction { .. }));
    }

    #[test]
    fn test_preflight() {
        let schema = CustomizedSchema {
            tables: vec![posts()],
            ..Default::default()
        };
        assert!(preflight(&schema, &FunctionRegistry::default()).is_ok());
        assert!(matches!(
            preflight(&schema, &FunctionRegistry::empty()),
            Err(GeneratorError::UnknownFunction { .. })
        ));

        let faker = CustomizedTable::new(
            "t",
            vec![CustomizedColumn::new(
                "c",
                GeneratorSpec::Faker {
                    template: "{{bad.key}}".into(),
                    locale: "en".into(),
                },
            )],
        );
        let schema = CustomizedSchema {
            tables: vec![faker],
            ..Default::default()
        };
        assert!(matches!(
            preflight(&schema, &FunctionRegistry::default()),
            Err(GeneratorError::UnknownFakerKey { .. })
        ));
    }
}
