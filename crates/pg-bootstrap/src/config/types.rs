//! Configuration type definitions.

use crate::descriptor::{SchemaName, TableDescriptor};
use serde::{Deserialize, Serialize};

/// The fixed set of module namespaces provisioned when none are configured.
pub const DEFAULT_SCHEMAS: [&str; 10] = [
    "stl", "master", "pao", "bank", "spc", "session", "sub", "sec", "acc", "icra",
];

/// Root configuration structure. Created once at process start; immutable
/// thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store connection settings.
    pub database: DatabaseConfig,

    /// Pool tuning.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Provisioning pipeline settings.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// PostgreSQL connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// SSL mode (default: "disable").
    #[serde(default = "default_disable")]
    pub ssl_mode: String,
}

/// Pool bounds applied after the handle opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum simultaneously open connections (default: 100).
    #[serde(default = "default_max_open")]
    pub max_open: usize,

    /// Idle connections kept warm and ready (default: 10).
    #[serde(default = "default_min_idle")]
    pub min_idle: usize,

    /// Connections older than this are recycled to avoid staleness
    /// (default: 3600 seconds).
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_open: default_max_open(),
            min_idle: default_min_idle(),
            max_lifetime_secs: default_max_lifetime(),
        }
    }
}

/// Provisioning pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Ordered set of namespaces to provision. Schemas referenced by table
    /// descriptors are always included on top of this list.
    #[serde(default = "default_schemas")]
    pub schemas: Vec<SchemaName>,

    /// Deadline for each DDL stage, so a wedged database cannot block
    /// startup indefinitely (default: 300 seconds).
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_secs: u64,

    /// Entities to migrate.
    #[serde(default)]
    pub tables: Vec<TableDescriptor>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            schemas: default_schemas(),
            stage_timeout_secs: default_stage_timeout(),
            tables: Vec::new(),
        }
    }
}

fn default_pg_port() -> u16 {
    5432
}

fn default_disable() -> String {
    "disable".to_string()
}

fn default_max_open() -> usize {
    100
}

fn default_min_idle() -> usize {
    10
}

fn default_max_lifetime() -> u64 {
    3600
}

fn default_stage_timeout() -> u64 {
    300
}

fn default_schemas() -> Vec<SchemaName> {
    DEFAULT_SCHEMAS.iter().map(|s| SchemaName::new(*s)).collect()
}
