//! Replica identity setter — stage three of the pipeline.
//!
//! Marks every user table for full-row change capture so downstream log
//! consumers can reconstruct a row's complete prior state without an
//! auxiliary lookup. The higher write-ahead log volume is an accepted
//! correctness tradeoff. Must run after table migration so newly created
//! tables are included; a table created later is not covered until the
//! next bootstrap.

use crate::ddl;
use crate::error::{BootstrapError, Result};
use crate::pool::StorePool;
use tracing::info;

/// Set `REPLICA IDENTITY FULL` on every table outside the reserved system
/// namespaces, as one administrative block.
///
/// Failure is fatal: continuing would leave tables invisible to change-capture
/// consumers.
pub(crate) async fn set_full(store: &StorePool) -> Result<()> {
    store
        .batch_execute(&ddl::replica_identity_script())
        .await
        .map_err(|e| BootstrapError::ReplicaIdentity(e.to_string()))?;
    info!("replica identity set to FULL for all user tables");
    Ok(())
}
