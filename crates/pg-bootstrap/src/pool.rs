//! PostgreSQL connection pool manager.
//!
//! Opens the store handle from a connection string, applies the configured
//! pool bounds, and exposes the small set of catalog operations the pipeline
//! and post-bootstrap validation need. The handle is safe for concurrent use;
//! request-handling code shares it for the lifetime of the process.

use crate::config::{DatabaseConfig, PoolConfig};
use crate::ddl::RESERVED_SCHEMAS;
use crate::error::{BootstrapError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use std::time::Duration;
use tokio_postgres::{Config as PgConfig, NoTls};
use tracing::{debug, info, warn};

/// How often the reaper checks for connections past their lifetime.
const REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Pooled handle to the store.
pub struct StorePool {
    pool: Pool,
}

impl StorePool {
    /// Open a handle to the store and apply pool bounds.
    ///
    /// Failure here is fatal to startup; there is no retry.
    pub async fn connect(db: &DatabaseConfig, tuning: &PoolConfig) -> Result<Self> {
        let pg_config: PgConfig = db.connection_string().parse().map_err(
            |e: tokio_postgres::Error| {
                BootstrapError::Connection(format!("invalid connection string: {}", e))
            },
        )?;

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);
        let pool = Pool::builder(mgr)
            .max_size(tuning.max_open)
            .build()
            .map_err(|e| BootstrapError::pool(e.to_string(), "building connection pool"))?;

        // Probe before anything else runs: no DDL is attempted against a
        // store we cannot reach.
        let client = pool.get().await.map_err(|e| {
            BootstrapError::Connection(format!("failed to connect to {}: {}", db.endpoint(), e))
        })?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| BootstrapError::Connection(e.to_string()))?;
        drop(client);

        let store = Self { pool };
        store.warm(tuning.min_idle).await;
        store.spawn_reaper(Duration::from_secs(tuning.max_lifetime_secs));

        info!(
            "Connected to PostgreSQL {} (max_open={}, min_idle={}, max_lifetime={}s)",
            db.endpoint(),
            tuning.max_open,
            tuning.min_idle,
            tuning.max_lifetime_secs
        );

        Ok(store)
    }

    /// Pre-open `min_idle` connections so the floor of ready connections is
    /// met before traffic arrives. Best effort.
    async fn warm(&self, min_idle: usize) {
        let mut held = Vec::with_capacity(min_idle);
        for _ in 0..min_idle {
            match self.pool.get().await {
                Ok(client) => held.push(client),
                Err(e) => {
                    warn!("pool warm-up stopped early: {}", e);
                    break;
                }
            }
        }
        debug!("warmed {} idle connection(s)", held.len());
        // Dropping the guards returns the connections to the idle set.
    }

    /// Background task recycling connections older than `max_lifetime`.
    fn spawn_reaper(&self, max_lifetime: Duration) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(REAP_INTERVAL);
            loop {
                tick.tick().await;
                if pool.is_closed() {
                    break;
                }
                let reaped = pool.retain(|_, metrics| metrics.age() <= max_lifetime);
                if !reaped.removed.is_empty() {
                    debug!("reaped {} aged connection(s)", reaped.removed.len());
                }
            }
        });
    }

    /// Acquire a pooled connection.
    pub async fn client(&self) -> Result<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| BootstrapError::pool(e.to_string(), "acquiring pooled connection"))
    }

    /// Execute a multi-statement administrative script.
    pub async fn batch_execute(&self, sql: &str) -> Result<()> {
        let client = self.client().await?;
        client.batch_execute(sql).await?;
        Ok(())
    }

    /// Whether a table exists in the given namespace.
    pub async fn table_exists(&self, schema: &str, table: &str) -> Result<bool> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "SELECT EXISTS (
                    SELECT 1 FROM information_schema.tables
                    WHERE table_schema = $1 AND table_name = $2
                )",
                &[&schema, &table],
            )
            .await?;
        Ok(row.get(0))
    }

    /// Column names currently present on a table.
    pub async fn existing_columns(&self, schema: &str, table: &str) -> Result<Vec<String>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT column_name FROM information_schema.columns
                 WHERE table_schema = $1 AND table_name = $2
                 ORDER BY ordinal_position",
                &[&schema, &table],
            )
            .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    /// The replica identity flag for a table: 'd' default, 'f' full,
    /// 'n' nothing, 'i' index. None if the table is not in the catalog.
    pub async fn replica_identity(&self, schema: &str, table: &str) -> Result<Option<char>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT c.relreplident FROM pg_class c
                 JOIN pg_namespace n ON n.oid = c.relnamespace
                 WHERE n.nspname = $1 AND c.relname = $2 AND c.relkind = 'r'",
                &[&schema, &table],
            )
            .await?;
        Ok(rows.first().map(|r| r.get::<_, i8>(0) as u8 as char))
    }

    /// Every (schema, table) pair outside the reserved system namespaces.
    pub async fn user_tables(&self) -> Result<Vec<(String, String)>> {
        let client = self.client().await?;
        let reserved: Vec<String> = RESERVED_SCHEMAS.iter().map(|s| s.to_string()).collect();
        let rows = client
            .query(
                "SELECT schemaname, tablename FROM pg_tables
                 WHERE schemaname <> ALL($1)
                 ORDER BY schemaname, tablename",
                &[&reserved],
            )
            .await?;
        Ok(rows.iter().map(|r| (r.get(0), r.get(1))).collect())
    }

    /// Close the pool, releasing all connections.
    pub fn close(&self) {
        self.pool.close();
    }

    /// Whether the pool has been closed.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
