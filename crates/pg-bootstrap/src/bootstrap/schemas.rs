//! Schema provisioning — stage one of the pipeline.

use crate::descriptor::SchemaName;
use crate::error::{BootstrapError, Result};
use crate::pool::StorePool;
use crate::{ddl, exists};
use tracing::debug;

/// Idempotently create every namespace, in order.
///
/// Namespace creation is cheap and independent, so the first non-duplicate
/// failure aborts the remaining pipeline: a permission failure on one implies
/// likely failure on all.
pub(crate) async fn provision(store: &StorePool, schemas: &[SchemaName]) -> Result<()> {
    for schema in schemas {
        let client = store.client().await?;
        let sql = ddl::create_schema_sql(schema.as_str());
        exists::ignore_exists(client.execute(&sql, &[]).await)
            .map_err(|e| BootstrapError::ddl(format!("schema {}", schema), e.to_string()))?;
        debug!("schema '{}' present", schema);
    }
    Ok(())
}
