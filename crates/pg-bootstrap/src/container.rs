//! Process-wide dependency container.
//!
//! The primary API is explicit: `Bootstrap::store()` hands back an
//! `Arc<StorePool>` that callers thread through their call chain. For code
//! that still wants a process-wide handle, this module offers a guarded
//! accessor: initialization runs the full pipeline at most once even under
//! concurrent callers, and a handle that failed to open is never stored.

use crate::bootstrap::Bootstrap;
use crate::config::Config;
use crate::descriptor::TableDescriptor;
use crate::error::Result;
use crate::pool::StorePool;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

static STORE: OnceCell<Arc<StorePool>> = OnceCell::const_new();

/// Run the bootstrap pipeline and cache the opened handle.
///
/// The first successful call initializes the container; later calls (and
/// concurrent ones — the cell serializes initializers) reuse the cached
/// handle without re-running provisioning. On failure nothing is cached and
/// the next call retries.
pub async fn init(config: Config, tables: &[TableDescriptor]) -> Result<Arc<StorePool>> {
    STORE
        .get_or_try_init(|| async {
            let bootstrap = Bootstrap::connect(config).await?;
            let report = bootstrap.run(tables).await?;
            info!(
                "dependency container initialized (run {})",
                report.run_id
            );
            Ok(bootstrap.store())
        })
        .await
        .cloned()
}

/// The cached handle, if the container has been initialized.
pub fn get() -> Option<Arc<StorePool>> {
    STORE.get().cloned()
}

/// Close the pool on process termination. Safe to call before init or twice.
pub fn shutdown() {
    if let Some(store) = STORE.get() {
        if !store.is_closed() {
            store.close();
            info!("store pool closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // init() needs a live database; what is testable here is the empty-cell
    // behavior and that shutdown is a safe no-op before initialization.
    #[test]
    fn test_get_before_init_is_none() {
        assert!(get().is_none());
        shutdown();
        assert!(get().is_none());
    }
}
