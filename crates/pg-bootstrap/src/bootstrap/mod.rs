//! Bootstrap pipeline — main workflow coordinator.
//!
//! Stages run strictly in sequence: connect and tune the pool, provision
//! schemas, migrate table descriptors, set replica identity. Each DDL stage
//! carries a deadline so a wedged database cannot block startup indefinitely.

mod migrate;
mod replica;
mod schemas;

use crate::config::Config;
use crate::descriptor::{SchemaName, TableDescriptor};
use crate::error::{AggregateMigrationError, BootstrapError, Result};
use crate::pool::StorePool;
use crate::ddl;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

/// Bootstrap pipeline over an opened store handle.
pub struct Bootstrap {
    config: Config,
    store: Arc<StorePool>,
}

/// Result of a bootstrap run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapReport {
    /// Unique run identifier.
    pub run_id: Uuid,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Namespaces provisioned, in order.
    pub schemas: Vec<String>,

    /// Descriptors processed.
    pub tables_total: usize,

    /// Descriptors migrated successfully.
    pub tables_migrated: usize,

    /// Qualified names of descriptors that failed migration. Always empty in
    /// a returned report; a non-empty aggregate aborts the run instead.
    pub failed_tables: Vec<String>,
}

impl BootstrapReport {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Bootstrap {
    /// Validate the configuration and open the pool. Connection failure is
    /// fatal: no DDL is attempted.
    pub async fn connect(config: Config) -> Result<Self> {
        config.validate()?;
        let store = StorePool::connect(&config.database, &config.pool).await?;
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    /// The opened, pool-tuned store handle, for request handlers to share.
    pub fn store(&self) -> Arc<StorePool> {
        self.store.clone()
    }

    /// Run the full provisioning pipeline for the given descriptors.
    ///
    /// Idempotent: re-running against an already provisioned database is a
    /// no-op. Any non-empty migration aggregate is returned as a fatal error
    /// naming every failing table.
    pub async fn run(&self, tables: &[TableDescriptor]) -> Result<BootstrapReport> {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();
        info!("Starting bootstrap run {}", run_id);

        let schemas = schema_set(&self.config.bootstrap.schemas, tables);

        // Stage 1: namespaces. Schema creation completes before any table
        // in that schema is migrated.
        self.stage("schemas", schemas::provision(&self.store, &schemas))
            .await?;
        info!("Provisioned {} schema(s)", schemas.len());

        // Stage 2: structural migration, aggregating per-table failures.
        let failures = self
            .stage("migrate", migrate::migrate_all(self.store.as_ref(), tables))
            .await?;
        if !failures.is_empty() {
            let aggregate = AggregateMigrationError::new(failures);
            error!("{}", aggregate);
            return Err(aggregate.into());
        }
        info!("Migrated {} table(s)", tables.len());

        // Stage 3: full-row change capture, after all migrations so newly
        // created tables are included.
        self.stage("replica-identity", replica::set_full(&self.store))
            .await?;

        let completed_at = Utc::now();
        let report = BootstrapReport {
            run_id,
            started_at,
            completed_at,
            duration_seconds: (completed_at - started_at).num_milliseconds() as f64 / 1000.0,
            schemas: schemas.iter().map(|s| s.to_string()).collect(),
            tables_total: tables.len(),
            tables_migrated: tables.len(),
            failed_tables: Vec::new(),
        };

        info!(
            "Bootstrap {} completed: {} schemas, {} tables in {:.2}s",
            report.run_id, report.schemas.len(), report.tables_total, report.duration_seconds
        );

        Ok(report)
    }

    /// Run one stage under the configured deadline.
    async fn stage<T>(&self, name: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let seconds = self.config.bootstrap.stage_timeout_secs;
        match tokio::time::timeout(Duration::from_secs(seconds), fut).await {
            Ok(result) => result,
            Err(_) => Err(BootstrapError::Timeout {
                stage: name.to_string(),
                seconds,
            }),
        }
    }
}

/// Ordered union of the configured namespaces and every namespace referenced
/// by a descriptor, first occurrence wins.
fn schema_set(configured: &[SchemaName], tables: &[TableDescriptor]) -> Vec<SchemaName> {
    let mut out: Vec<SchemaName> = Vec::with_capacity(configured.len());
    for schema in configured.iter().chain(tables.iter().map(|t| &t.schema)) {
        if !out.contains(schema) {
            out.push(schema.clone());
        }
    }
    out
}

/// Every statement the pipeline would issue against an empty database, in
/// order: schemas, tables, indexes, then the replica-identity script.
pub fn plan(config: &Config) -> Vec<String> {
    let tables = &config.bootstrap.tables;
    let mut statements = Vec::new();

    for schema in schema_set(&config.bootstrap.schemas, tables) {
        statements.push(ddl::create_schema_sql(schema.as_str()));
    }
    for table in tables {
        statements.push(ddl::create_table_sql(table));
        for idx in &table.indexes {
            statements.push(ddl::create_index_sql(table, idx));
        }
    }
    statements.push(ddl::replica_identity_script());

    statements
}
