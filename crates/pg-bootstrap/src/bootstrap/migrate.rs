//! Structural migration per table descriptor — stage two of the pipeline.

use crate::descriptor::TableDescriptor;
use crate::error::{MigrationError, Result};
use crate::pool::StorePool;
use crate::{ddl, exists};
use tracing::{debug, warn};

/// Catalog reads and DDL writes the migrator needs from the store.
///
/// `StorePool` is the production implementation; the trait exists so the
/// per-table loop can run against an in-memory store in tests.
pub(crate) trait MigrationStore {
    async fn table_exists(&self, schema: &str, table: &str) -> Result<bool>;
    async fn existing_columns(&self, schema: &str, table: &str) -> Result<Vec<String>>;
    /// Execute one DDL statement, swallowing duplicate-object errors.
    async fn apply_ddl(&self, sql: &str) -> Result<()>;
}

impl MigrationStore for StorePool {
    async fn table_exists(&self, schema: &str, table: &str) -> Result<bool> {
        StorePool::table_exists(self, schema, table).await
    }

    async fn existing_columns(&self, schema: &str, table: &str) -> Result<Vec<String>> {
        StorePool::existing_columns(self, schema, table).await
    }

    async fn apply_ddl(&self, sql: &str) -> Result<()> {
        let client = self.client().await?;
        exists::ignore_exists(client.execute(sql, &[]).await)?;
        Ok(())
    }
}

/// Migrate every descriptor independently, collecting per-table failures.
///
/// A failure on one descriptor never stops processing of the rest; the
/// returned list is empty on success.
pub(crate) async fn migrate_all<S: MigrationStore>(
    store: &S,
    tables: &[TableDescriptor],
) -> Result<Vec<MigrationError>> {
    let mut failures = Vec::new();

    for table in tables {
        match migrate_table(store, table).await {
            Ok(()) => debug!("migrated {}", table.qualified_name()),
            Err(e) => {
                warn!("{}", e);
                failures.push(e);
            }
        }
    }

    Ok(failures)
}

/// Create the table if absent, otherwise reconcile missing columns; then
/// ensure secondary indexes.
async fn migrate_table<S: MigrationStore>(
    store: &S,
    table: &TableDescriptor,
) -> std::result::Result<(), MigrationError> {
    let tag = |message: String| MigrationError::new(table.qualified_name(), message);

    let schema = table.schema.as_str();

    let existed = store
        .table_exists(schema, &table.name)
        .await
        .map_err(|e| tag(e.to_string()))?;

    if !existed {
        // A concurrent bootstrap may win the create race; the duplicate is
        // swallowed and reconciliation below covers the rest.
        store
            .apply_ddl(&ddl::create_table_sql(table))
            .await
            .map_err(|e| tag(e.to_string()))?;
    }

    let existing = store
        .existing_columns(schema, &table.name)
        .await
        .map_err(|e| tag(e.to_string()))?;

    for col in &table.columns {
        if existing.iter().any(|name| name == &col.name) {
            continue;
        }
        store
            .apply_ddl(&ddl::add_column_sql(table, col))
            .await
            .map_err(|e| tag(format!("adding column {}: {}", col.name, e)))?;
    }

    for idx in &table.indexes {
        store
            .apply_ddl(&ddl::create_index_sql(table, idx))
            .await
            .map_err(|e| tag(format!("creating index: {}", e)))?;
    }

    Ok(())
}
