//! Error types for the bootstrap library.

use thiserror::Error;

/// Main error type for bootstrap operations.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store unreachable; fatal before any DDL runs.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Connection pool error with context.
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Database error surfaced by the driver.
    #[error("Database error: {0}")]
    Db(#[from] tokio_postgres::Error),

    /// Schema-level DDL failed for a reason other than "already exists".
    #[error("DDL failed for {object}: {message}")]
    Ddl { object: String, message: String },

    /// One or more tables failed structural migration.
    #[error(transparent)]
    Migration(#[from] AggregateMigrationError),

    /// The replica-identity administrative script failed.
    #[error("Replica identity script failed: {0}")]
    ReplicaIdentity(String),

    /// A DDL stage exceeded its deadline.
    #[error("Stage '{stage}' timed out after {seconds}s")]
    Timeout { stage: String, seconds: u64 },

    /// Post-bootstrap validation found drift.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The run was cut short by a termination signal.
    #[error("Interrupted: {0}")]
    Interrupted(String),

    /// IO error (file operations).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BootstrapError {
    /// Create a Pool error with context about where it occurred.
    pub fn pool(message: impl Into<String>, context: impl Into<String>) -> Self {
        BootstrapError::Pool {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Create a Ddl error naming the offending object.
    pub fn ddl(object: impl Into<String>, message: impl Into<String>) -> Self {
        BootstrapError::Ddl {
            object: object.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            BootstrapError::Config(_) => 2,
            BootstrapError::Connection(_) | BootstrapError::Pool { .. } => 3,
            BootstrapError::Ddl { .. } => 4,
            BootstrapError::Migration(_) => 5,
            BootstrapError::ReplicaIdentity(_) => 6,
            BootstrapError::Timeout { .. } => 7,
            BootstrapError::Validation(_) => 8,
            // Conventional code for termination by SIGINT.
            BootstrapError::Interrupted(_) => 130,
            _ => 1,
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Failure of one table's structural migration, tagged with the table name.
#[derive(Error, Debug)]
#[error("table {table}: {message}")]
pub struct MigrationError {
    pub table: String,
    pub message: String,
}

impl MigrationError {
    pub fn new(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            message: message.into(),
        }
    }
}

/// Aggregate of independent per-table migration failures.
///
/// Empty means success; callers treat any non-empty aggregate as fatal, but
/// the aggregate names every failing table so they can see what did succeed.
#[derive(Error, Debug)]
pub struct AggregateMigrationError {
    pub errors: Vec<MigrationError>,
}

impl AggregateMigrationError {
    pub fn new(errors: Vec<MigrationError>) -> Self {
        Self { errors }
    }

    /// Names of the tables that failed, in processing order.
    pub fn failed_tables(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.table.as_str()).collect()
    }
}

impl std::fmt::Display for AggregateMigrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "structural migration failed for {} table(s): ",
            self.errors.len()
        )?;
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

/// Result type alias for bootstrap operations.
pub type Result<T> = std::result::Result<T, BootstrapError>;
