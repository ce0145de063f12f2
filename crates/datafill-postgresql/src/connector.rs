//! [`DatabaseConnector`] implementation backed by tokio-postgres.

use crate::error::PostgreSQLConnectorError;
use crate::introspect::{apply_foreign_keys, column_from_info, ColumnInfo, ForeignKeyInfo};
use crate::sql::{self, ForeignKeyQuery};
use crate::triggers::{TriggerRecord, TriggerStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use datafill_core::{
    json_to_fill_value, DatabaseConnector, FillValue, ForeignKeyRequest, Row, Schema, Table,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};

const TABLES_QUERY: &str = "SELECT tablename::text FROM pg_catalog.pg_tables \
    WHERE schemaname = $1 ORDER BY tablename";

const COLUMNS_QUERY: &str = "SELECT column_name::text, data_type::text, \
    character_maximum_length::int4, is_identity::text, is_generated::text, column_default::text \
    FROM information_schema.columns \
    WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position";

const UNIQUE_COLUMNS_QUERY: &str = "SELECT MIN(kcu.column_name::text) \
    FROM information_schema.table_constraints tc \
    JOIN information_schema.key_column_usage kcu \
      ON kcu.constraint_name = tc.constraint_name \
     AND kcu.constraint_schema = tc.constraint_schema \
     AND kcu.table_name = tc.table_name \
    WHERE tc.table_schema = $1 AND tc.table_name = $2 \
      AND tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE') \
    GROUP BY tc.constraint_name HAVING COUNT(*) = 1";

const FOREIGN_KEYS_QUERY: &str = "SELECT kcu.column_name::text, ccu.table_name::text, ccu.column_name::text \
    FROM information_schema.table_constraints tc \
    JOIN information_schema.key_column_usage kcu \
      ON kcu.constraint_name = tc.constraint_name \
     AND kcu.constraint_schema = tc.constraint_schema \
    JOIN information_schema.constraint_column_usage ccu \
      ON ccu.constraint_name = tc.constraint_name \
     AND ccu.constraint_schema = tc.constraint_schema \
    WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = $1 AND tc.table_name = $2";

const TRIGGERS_QUERY: &str = "SELECT DISTINCT event_object_table::text, trigger_name::text \
    FROM information_schema.triggers \
    WHERE event_object_schema = $1 AND event_object_table::text = ANY($2) \
    ORDER BY 1, 2";

/// Create a new PostgreSQL client with connection handling
pub async fn new_postgresql_client(connection_string: &str) -> Result<Arc<Mutex<Client>>> {
    let (client, connection) = tokio_postgres::connect(connection_string, NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("PostgreSQL connection error: {e}");
        }
    });

    Ok(Arc::new(Mutex::new(client)))
}

/// Fills tables of one PostgreSQL schema.
pub struct PostgreSQLConnector {
    client: Arc<Mutex<Client>>,
    schema_name: String,
    triggers: TriggerStore,
}

impl PostgreSQLConnector {
    pub fn new(client: Arc<Mutex<Client>>, schema_name: impl Into<String>, triggers_path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            schema_name: schema_name.into(),
            triggers: TriggerStore::new(triggers_path),
        }
    }

    /// Connect and verify the server answers.
    pub async fn connect(
        connection_string: &str,
        schema_name: impl Into<String>,
        triggers_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let client = new_postgresql_client(connection_string)
            .await
            .context("Failed to connect to PostgreSQL")?;
        client
            .lock()
            .await
            .simple_query("SELECT 1")
            .await
            .map_err(PostgreSQLConnectorError::PostgreSQL)?;
        let connector = Self::new(client, schema_name, triggers_path);
        info!("Connected to PostgreSQL schema '{}'", connector.schema_name);
        Ok(connector)
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    async fn set_triggers(&self, schema: &str, table: &str, enable: bool) -> Result<()> {
        let query = sql::triggers_sql(schema, table, enable);
        debug!("{query}");
        self.client
            .lock()
            .await
            .batch_execute(&query)
            .await
            .with_context(|| format!("Failed to alter triggers of table '{table}'"))
    }

    async fn introspect_table(&self, client: &Client, name: &str) -> Result<Table> {
        let schema = self.schema_name.as_str();
        let now = chrono::Local::now().naive_local();

        let infos = client
            .query(COLUMNS_QUERY, &[&schema, &name])
            .await?
            .into_iter()
            .map(|row| -> Result<ColumnInfo, tokio_postgres::Error> {
                Ok(ColumnInfo {
                    column_name: row.try_get(0)?,
                    data_type: row.try_get(1)?,
                    character_maximum_length: row.try_get(2)?,
                    is_identity: row.try_get::<_, Option<String>>(3)?.as_deref() == Some("YES"),
                    is_generated: row
                        .try_get::<_, Option<String>>(4)?
                        .is_some_and(|g| g != "NEVER"),
                    column_default: row.try_get(5)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let unique = client
            .query(UNIQUE_COLUMNS_QUERY, &[&schema, &name])
            .await?
            .into_iter()
            .map(|row| row.try_get::<_, String>(0))
            .collect::<Result<Vec<_>, _>>()?;

        let foreign_keys = client
            .query(FOREIGN_KEYS_QUERY, &[&schema, &name])
            .await?
            .into_iter()
            .map(|row| -> Result<ForeignKeyInfo, tokio_postgres::Error> {
                Ok(ForeignKeyInfo {
                    column: row.try_get(0)?,
                    foreign_table: row.try_get(1)?,
                    foreign_column: row.try_get(2)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut columns = infos
            .iter()
            .map(|info| {
                let mut column = column_from_info(info, now);
                column.unique = unique.contains(&info.column_name);
                column
            })
            .collect::<Vec<_>>();
        let referenced = apply_foreign_keys(&mut columns, &foreign_keys);

        let mut table = Table::new(name, columns);
        table.referenced_tables = referenced;
        Ok(table)
    }
}

#[async_trait]
impl DatabaseConnector for PostgreSQLConnector {
    async fn count_rows(&self, table: &str) -> Result<u64> {
        let query = sql::count_rows_sql(&self.schema_name, table);
        let row = self.client.lock().await.query_one(&query, &[]).await?;
        let count: i64 = row.try_get(0)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn empty_table(&self, table: &str) -> Result<()> {
        let query = sql::empty_table_sql(&self.schema_name, table);
        debug!("{query}");
        self.client.lock().await.batch_execute(&query).await?;
        Ok(())
    }

    async fn execute_raw_query(&self, query: &str) -> Result<()> {
        debug!("{query}");
        self.client.lock().await.batch_execute(query).await?;
        Ok(())
    }

    async fn insert(&self, table: &str, rows: &[Row]) -> Result<u64> {
        let Some(first) = rows.first() else {
            return Ok(0);
        };
        let columns: Vec<&str> = first.columns().collect();
        if columns.is_empty() {
            // every column is server generated
            let query = sql::insert_default_values_sql(&self.schema_name, table);
            let client = self.client.lock().await;
            let statement = client.prepare(&query).await?;
            let mut inserted = 0;
            for _ in rows {
                inserted += client.execute(&statement, &[]).await?;
            }
            debug!("Inserted {inserted}/{} default rows into '{table}'", rows.len());
            return Ok(inserted);
        }
        let query = sql::insert_sql(&self.schema_name, table, &columns);
        let payload = serde_json::to_value(rows).map_err(PostgreSQLConnectorError::Encode)?;
        let inserted = self
            .client
            .lock()
            .await
            .execute(&query, &[&payload])
            .await?;
        debug!("Inserted {inserted}/{} rows into '{table}'", rows.len());
        Ok(inserted)
    }

    async fn values_for_foreign_key(&self, request: &ForeignKeyRequest<'_>) -> Result<Vec<FillValue>> {
        let query = sql::foreign_key_sql(&ForeignKeyQuery {
            schema: &self.schema_name,
            table: request.table,
            column: request.column,
            foreign_table: request.foreign_table,
            foreign_column: request.foreign_column,
            unique: request.unique,
            filter: request.filter,
        });
        let limit = i64::try_from(request.limit).unwrap_or(i64::MAX);
        debug!("{query} [limit {limit}]");
        let rows = self.client.lock().await.query(&query, &[&limit]).await?;
        rows.iter()
            .map(|row| -> Result<FillValue> {
                let value: serde_json::Value = row.try_get(0)?;
                Ok(json_to_fill_value(&value))
            })
            .collect()
    }

    async fn disable_triggers(&self, table: &str) -> Result<()> {
        self.set_triggers(&self.schema_name, table, false).await
    }

    async fn enable_triggers(&self, table: &str) -> Result<()> {
        self.set_triggers(&self.schema_name, table, true).await
    }

    async fn schema(&self) -> Result<Schema> {
        let client = self.client.lock().await;
        let names = client
            .query(TABLES_QUERY, &[&self.schema_name])
            .await?
            .into_iter()
            .map(|row| row.try_get::<_, String>(0))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tables = Vec::with_capacity(names.len());
        for name in &names {
            let table = self
                .introspect_table(&client, name)
                .await
                .with_context(|| format!("Failed to introspect table '{name}'"))?;
            tables.push(table);
        }
        info!(
            "Introspected {} tables in schema '{}'",
            tables.len(),
            self.schema_name
        );
        Ok(Schema::new(tables))
    }

    async fn backup_triggers(&self, tables: &[String]) -> Result<()> {
        let rows = self
            .client
            .lock()
            .await
            .query(TRIGGERS_QUERY, &[&self.schema_name, &tables])
            .await?;
        let records = rows
            .iter()
            .map(|row| -> Result<TriggerRecord, tokio_postgres::Error> {
                Ok(TriggerRecord {
                    schema: self.schema_name.clone(),
                    table: row.try_get(0)?,
                    name: row.try_get(1)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if records.is_empty() {
            return Ok(());
        }

        let mut backup = self.triggers.load()?;
        backup.merge(records);
        self.triggers.save(&backup)?;
        info!(
            "Recorded {} triggers in {}",
            backup.triggers.len(),
            self.triggers.path().display()
        );
        Ok(())
    }

    async fn restore_triggers(&self) -> Result<()> {
        let backup = self.triggers.load()?;
        let tables = backup.tables();
        if tables.is_empty() {
            info!("No trigger backup to restore");
            return Ok(());
        }
        for (schema, table) in &tables {
            self.set_triggers(schema, table, true).await?;
            info!("Re-enabled triggers of {schema}.{table}");
        }
        self.triggers.clean()?;
        Ok(())
    }

    async fn clean_trigger_backup(&self) -> Result<()> {
        self.triggers.clean()?;
        Ok(())
    }
}
