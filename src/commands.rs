//! Handlers for the `datafill` subcommands.

use crate::logging::mask_connection_password;
use crate::settings::{load_customized_schema, write_analysis};
use anyhow::{Context, Result};
use datafill_core::DatabaseConnector;
use datafill_generator::{preflight, FunctionRegistry};
use datafill_populate::{Filler, SkipHandle};
use datafill_postgresql::{PostgreSQLConnector, PostgreSQLFillArgs};
use std::io::{BufRead, IsTerminal};
use std::sync::Arc;
use tracing::{info, warn};

async fn connect(args: &PostgreSQLFillArgs) -> Result<PostgreSQLConnector> {
    info!(
        "Connecting to {}",
        mask_connection_password(&args.postgresql_connection_string)
    );
    PostgreSQLConnector::connect(
        &args.postgresql_connection_string,
        args.postgresql_schema.clone(),
        args.common.triggers_path(),
    )
    .await
}

/// Introspect the database and write the settings files.
pub async fn run_analyze(args: PostgreSQLFillArgs) -> Result<()> {
    let connector = connect(&args).await?;
    let schema = connector
        .schema()
        .await
        .context("Failed to introspect the database")?;
    write_analysis(
        &args.common.settings_dir,
        &args.common.schema_path(),
        &args.common.custom_schema_path(),
        &schema,
    )?;
    info!("Analyzed {} table(s)", schema.tables.len());
    Ok(())
}

/// Fill the database, or only validate the customization with `--dry-run`.
pub async fn run_fill(args: PostgreSQLFillArgs, reset: bool, registry: FunctionRegistry) -> Result<()> {
    let schema = load_customized_schema(&args.common)?;
    let order: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();

    if args.common.dry_run {
        preflight(&schema, &registry)?;
        info!(
            "[DRY-RUN] Connection: {}",
            mask_connection_password(&args.postgresql_connection_string)
        );
        info!("[DRY-RUN] Fill order: {:?}", order);
        info!("[DRY-RUN] Customization validated successfully");
        return Ok(());
    }

    info!("Fill order: {:?}", order);
    let connector = connect(&args).await?;
    let mut filler = Filler::new(Arc::new(connector), schema, registry)?;
    spawn_skip_listener(filler.skip_handle());

    let metrics = filler.fill_tables(reset).await?;
    for table in &metrics.tables {
        info!(
            "Filled {}: {} -> {} rows ({} inserted, {} batches, {:.0} rows/s)",
            table.table,
            table.initial_rows,
            table.initial_rows + table.rows_inserted,
            table.rows_inserted,
            table.batch_count,
            table.rows_per_second()
        );
        if let Some(error) = &table.generator_error {
            warn!("{}: stopped early: {error}", table.table);
        }
    }
    info!(
        "Inserted {} rows in {:?}",
        metrics.rows_inserted(),
        metrics.total_duration
    );
    Ok(())
}

/// Re-enable triggers recorded by an interrupted fill.
pub async fn run_restore_triggers(args: PostgreSQLFillArgs) -> Result<()> {
    let connector = connect(&args).await?;
    connector
        .restore_triggers()
        .await
        .context("Failed to restore triggers")
}

/// Typing `n` + Enter skips the table being generated.
fn spawn_skip_listener(skip: SkipHandle) {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return;
    }
    info!("Type 'n' + Enter to skip the table being filled");
    // Detached OS thread; a blocking tokio stdin read would stall runtime shutdown.
    std::thread::spawn(move || {
        for line in stdin.lock().lines() {
            match line {
                Ok(line) if line.trim().eq_ignore_ascii_case("n") => skip.request_skip(),
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });
}
