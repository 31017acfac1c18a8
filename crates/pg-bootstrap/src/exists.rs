//! Duplicate-object classification — the idempotency policy for the pipeline.
//!
//! Races between concurrently bootstrapping instances (two processes both
//! issuing `CREATE SCHEMA` for the same name) must not fail either process.
//! Classification is keyed on the driver's SQLSTATE; the substring match on
//! the error message is only a fallback for errors that carry no code, since
//! message text is locale- and version-dependent.

use tokio_postgres::error::SqlState;
use tracing::debug;

/// SQLSTATEs in the duplicate-object class that DDL retries may surface.
const DUPLICATE_STATES: [SqlState; 5] = [
    SqlState::DUPLICATE_SCHEMA,
    SqlState::DUPLICATE_TABLE,
    SqlState::DUPLICATE_COLUMN,
    SqlState::DUPLICATE_OBJECT,
    SqlState::DUPLICATE_DATABASE,
];

/// Whether an error indicates the target object already exists.
pub fn already_exists(code: Option<&SqlState>, message: &str) -> bool {
    if let Some(code) = code {
        return DUPLICATE_STATES.contains(code);
    }
    message.contains("already exists")
}

/// Swallow duplicate-object errors, returning every other error unchanged.
///
/// Applied after every DDL-class operation.
pub fn ignore_exists(
    result: std::result::Result<u64, tokio_postgres::Error>,
) -> std::result::Result<(), tokio_postgres::Error> {
    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            let message = e
                .as_db_error()
                .map(|db| db.message().to_string())
                .unwrap_or_else(|| e.to_string());
            if already_exists(e.code(), &message) {
                debug!("ignored duplicate-object error: {}", message);
                Ok(())
            } else {
                Err(e)
            }
        }
    }
}
