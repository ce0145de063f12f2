//! Fill engine.
//!
//! Per table, strictly in dependency order:
//!
//! ```text
//! [empty] → before hooks → generate batches → after hooks → done
//! ```
//!
//! Triggers of a table are disabled for the whole sequence when its policy
//! asks for it and re-enabled on every exit path.

use crate::error::FillError;
use crate::progress::{FillStep, ProgressEvent, ProgressSink, ProgressState, SkipHandle, TracingProgress};
use datafill_core::{CustomizedSchema, CustomizedTable, DatabaseConnector};
use datafill_generator::{init_table_generators, new_rng, preflight, FunctionRegistry};
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Metrics from filling one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableMetrics {
    pub table: String,
    /// Row count before generation
    pub initial_rows: u64,
    /// Row count the table should reach
    pub target_rows: u64,
    /// Number of rows the database accepted.
    pub rows_inserted: u64,
    /// Number of insert batches executed.
    pub batch_count: u64,
    /// The last batch inserted nothing
    pub stalled: bool,
    /// The operator skipped the table
    pub skipped: bool,
    /// A generator error ended the table early
    pub generator_error: Option<String>,
    /// Total time taken.
    pub total_duration: Duration,
    /// Time spent generating data.
    pub generation_duration: Duration,
    /// Time spent inserting data.
    pub insert_duration: Duration,
}

impl TableMetrics {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_inserted as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Metrics from a whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillMetrics {
    pub tables: Vec<TableMetrics>,
    pub total_duration: Duration,
}

impl FillMetrics {
    pub fn rows_inserted(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_inserted).sum()
    }

    pub fn table(&self, name: &str) -> Option<&TableMetrics> {
        self.tables.iter().find(|t| t.table == name)
    }
}

/// Drives generation and insertion for a customized schema.
pub struct Filler {
    connector: Arc<dyn DatabaseConnector>,
    schema: CustomizedSchema,
    registry: FunctionRegistry,
    progress: Box<dyn ProgressSink>,
    skip: SkipHandle,
    rng: StdRng,
}

impl Filler {
    /// Create a filler.
    ///
    /// Function names and faker templates are checked here, before anything
    /// touches the database.
    pub fn new(
        connector: Arc<dyn DatabaseConnector>,
        schema: CustomizedSchema,
        registry: FunctionRegistry,
    ) -> Result<Self, FillError> {
        preflight(&schema, &registry)?;
        if schema.settings.seed.is_none() {
            warn!("No seed configured; generated data will not be reproducible");
        }
        let rng = new_rng(schema.settings.seed);
        Ok(Self {
            connector,
            schema,
            registry,
            progress: Box::new(TracingProgress),
            skip: SkipHandle::new(),
            rng,
        })
    }

    /// Replace the progress sink.
    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Handle that skips the table being generated.
    pub fn skip_handle(&self) -> SkipHandle {
        self.skip.clone()
    }

    pub fn schema(&self) -> &CustomizedSchema {
        &self.schema
    }

    /// Fill every table; with `reset`, tables are emptied first.
    pub async fn fill_tables(&mut self, reset: bool) -> Result<FillMetrics, FillError> {
        let start_time = Instant::now();
        let mut metrics = FillMetrics::default();
        let global_triggers = self.schema.settings.disable_triggers;
        let handled: Vec<String> = self
            .schema
            .tables
            .iter()
            .filter(|t| t.handles_triggers(global_triggers))
            .map(|t| t.name.clone())
            .collect();

        if !handled.is_empty() {
            self.connector
                .backup_triggers(&handled)
                .await
                .map_err(FillError::connector(&handled.join(", "), "back up triggers of"))?;
        }

        let before_all = self.schema.settings.before_all.clone();
        self.run_hooks(None, FillStep::BeforeAll, &before_all).await?;

        let tables = self.schema.tables.clone();
        info!("Filling {} table(s)", tables.len());
        for table in &tables {
            metrics.tables.push(self.fill_table(table, reset).await?);
        }

        let after_all = self.schema.settings.after_all.clone();
        self.run_hooks(None, FillStep::AfterAll, &after_all).await?;

        if !handled.is_empty() {
            self.connector
                .clean_trigger_backup()
                .await
                .map_err(FillError::connector(&handled.join(", "), "clean the trigger backup of"))?;
        }

        metrics.total_duration = start_time.elapsed();
        info!(
            "Fill complete: {} rows in {:?}",
            metrics.rows_inserted(),
            metrics.total_duration
        );
        Ok(metrics)
    }

    /// Fill one table, keeping its triggers disabled meanwhile when required.
    pub async fn fill_table(&mut self, table: &CustomizedTable, reset: bool) -> Result<TableMetrics, FillError> {
        // a skip requested before this table started does not apply to it
        self.skip.take();
        let disable = table.handles_triggers(self.schema.settings.disable_triggers);
        if disable {
            debug!("Disabling triggers of '{}'", table.name);
            self.connector
                .disable_triggers(&table.name)
                .await
                .map_err(FillError::connector(&table.name, "disable triggers of"))?;
        }

        let result = self.fill_table_steps(table, reset).await;

        if disable {
            debug!("Enabling triggers of '{}'", table.name);
            if let Err(e) = self.connector.enable_triggers(&table.name).await {
                if result.is_ok() {
                    return Err(FillError::connector(&table.name, "enable triggers of")(e));
                }
                warn!("Failed to enable triggers of '{}': {e:#}", table.name);
            }
        }
        result
    }

    async fn fill_table_steps(&mut self, table: &CustomizedTable, reset: bool) -> Result<TableMetrics, FillError> {
        if reset {
            self.report(Some(&table.name), FillStep::Empty, 0, 1, ProgressState::Running, None);
            self.connector
                .empty_table(&table.name)
                .await
                .map_err(FillError::connector(&table.name, "empty"))?;
            self.report(Some(&table.name), FillStep::Empty, 1, 1, ProgressState::Done, None);
        }

        self.run_hooks(Some(&table.name), FillStep::Before, &table.before).await?;

        let metrics = self.generate(table).await?;

        if metrics.rows_inserted > 0 {
            self.run_hooks(Some(&table.name), FillStep::After, &table.after).await?;
        } else if !table.after.is_empty() {
            debug!("No rows inserted into '{}', skipping after hooks", table.name);
        }
        Ok(metrics)
    }

    async fn generate(&mut self, table: &CustomizedTable) -> Result<TableMetrics, FillError> {
        let start_time = Instant::now();
        let name = table.name.as_str();
        let mut metrics = TableMetrics {
            table: name.to_string(),
            ..Default::default()
        };

        let current = self
            .connector
            .count_rows(name)
            .await
            .map_err(FillError::connector(name, "count rows of"))?;
        let target = table.target_rows(current);
        let delta = table.delta_rows(current);
        metrics.initial_rows = current;
        metrics.target_rows = target;

        if delta <= 0 {
            info!("Table '{name}' already has {current} row(s) (target {target}), nothing to generate");
            self.report(Some(name), FillStep::GenerateData, current, target, ProgressState::Done, None);
            return Ok(metrics);
        }
        let delta = delta as u64;
        info!("Generating {delta} row(s) for '{name}' ({current} -> {target})");

        let generator =
            init_table_generators(self.connector.as_ref(), table, delta, &mut self.rng, &self.registry).await?;

        let batch_size = self.schema.settings.max_rows_per_batch.max(1) as u64;
        let mut generated = 0u64;
        let mut comment = None;
        let mut generation_time = Duration::ZERO;
        let mut insert_time = Duration::ZERO;

        // `generated` is the row index; progress is measured by accepted rows
        while current + metrics.rows_inserted < target {
            let batch_len = batch_size.min(target - current - metrics.rows_inserted);

            let gen_start = Instant::now();
            let mut rows = Vec::with_capacity(batch_len as usize);
            let mut failed = false;
            for _ in 0..batch_len {
                match generator.generate_row(&mut self.rng, generated) {
                    Ok(row) => {
                        rows.push(row);
                        generated += 1;
                    }
                    Err(e) => {
                        warn!("Stopping '{name}' after {generated} generated row(s): {e}");
                        metrics.generator_error = Some(e.to_string());
                        comment = Some(e.to_string());
                        failed = true;
                        break;
                    }
                }
            }
            generation_time += gen_start.elapsed();

            let inserted = if rows.is_empty() {
                0
            } else {
                let insert_start = Instant::now();
                let inserted = self
                    .connector
                    .insert(name, &rows)
                    .await
                    .map_err(FillError::connector(name, "insert into"))?;
                insert_time += insert_start.elapsed();
                metrics.batch_count += 1;
                inserted
            };
            metrics.rows_inserted += inserted;
            debug!(
                "Batch {} of '{name}': {inserted}/{} row(s) inserted",
                metrics.batch_count,
                rows.len()
            );
            self.report(
                Some(name),
                FillStep::GenerateData,
                current + metrics.rows_inserted,
                target,
                ProgressState::Running,
                None,
            );

            if failed {
                break;
            }
            if inserted == 0 {
                warn!("No row inserted into '{name}' in the last batch, stopping this table");
                metrics.stalled = true;
                comment = Some("stalled: no row inserted in the last batch".to_string());
                break;
            }
            if self.skip.take() {
                info!("Skipping the rest of '{name}'");
                metrics.skipped = true;
                comment = Some("skipped".to_string());
                break;
            }
        }

        metrics.generation_duration = generation_time;
        metrics.insert_duration = insert_time;
        metrics.total_duration = start_time.elapsed();
        self.report(
            Some(name),
            FillStep::GenerateData,
            current + metrics.rows_inserted,
            target,
            ProgressState::Done,
            comment,
        );
        info!(
            "Table '{name}': {} row(s) in {:?} ({:.2} rows/sec)",
            metrics.rows_inserted,
            metrics.total_duration,
            metrics.rows_per_second()
        );
        Ok(metrics)
    }

    async fn run_hooks(&self, table: Option<&str>, step: FillStep, queries: &[String]) -> Result<(), FillError> {
        if queries.is_empty() {
            return Ok(());
        }
        let max = queries.len() as u64;
        for (i, query) in queries.iter().enumerate() {
            self.report(table, step, i as u64, max, ProgressState::Running, None);
            debug!("Running {step} hook: {query}");
            self.connector
                .execute_raw_query(query)
                .await
                .map_err(|source| FillError::Hook {
                    scope: table.map_or_else(|| step.to_string(), |t| format!("{t} ({step})")),
                    query: query.clone(),
                    source,
                })?;
        }
        self.report(table, step, max, max, ProgressState::Done, None);
        Ok(())
    }

    fn report(
        &self,
        table: Option<&str>,
        step: FillStep,
        current: u64,
        max: u64,
        state: ProgressState,
        comment: Option<String>,
    ) {
        self.progress.report(&ProgressEvent {
            table: table.map(str::to_string),
            step,
            current,
            max,
            state,
            comment,
        });
    }
}
