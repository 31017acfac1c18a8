//! # pg-bootstrap
//!
//! PostgreSQL provisioning pipeline for multi-module backends.
//!
//! Before a service accepts traffic, this library:
//!
//! - **Opens and tunes** a connection pool from a connection string
//! - **Provisions** every module's schema (`CREATE SCHEMA IF NOT EXISTS`)
//! - **Migrates** declared table descriptors (create-or-reconcile),
//!   aggregating per-table failures instead of aborting on the first
//! - **Configures** every user table for full-row change capture
//!   (`REPLICA IDENTITY FULL`) so log consumers can reconstruct complete
//!   row state
//!
//! The pipeline is idempotent across repeated and concurrent invocations:
//! every statement is `IF NOT EXISTS` and duplicate-object races between
//! simultaneously starting instances are classified by SQLSTATE and ignored.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pg_bootstrap::{Bootstrap, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pg_bootstrap::BootstrapError> {
//!     let config = Config::load("bootstrap.yaml")?;
//!     let tables = config.bootstrap.tables.clone();
//!     let bootstrap = Bootstrap::connect(config).await?;
//!     let report = bootstrap.run(&tables).await?;
//!     println!("provisioned {} tables", report.tables_total);
//!     let store = bootstrap.store(); // share with request handlers
//!     # drop(store);
//!     Ok(())
//! }
//! ```
//!
//! Code that prefers a process-wide handle can use [`container::init`], which
//! runs the pipeline at most once per process and never exposes a handle that
//! failed to open.

pub mod bootstrap;
pub mod config;
pub mod container;
pub mod ddl;
pub mod descriptor;
pub mod error;
pub mod exists;
pub mod pool;

// Re-exports for convenient access
pub use bootstrap::{plan, Bootstrap, BootstrapReport};
pub use config::{BootstrapConfig, Config, DatabaseConfig, PoolConfig};
pub use descriptor::{ColumnSpec, ColumnType, IndexSpec, SchemaName, TableDescriptor};
pub use error::{AggregateMigrationError, BootstrapError, MigrationError, Result};
pub use pool::StorePool;
