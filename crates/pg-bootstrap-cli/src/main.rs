//! pg-bootstrap CLI - PostgreSQL provisioning for multi-module backends.

use clap::{Parser, Subcommand};
use pg_bootstrap::{plan, Bootstrap, BootstrapError, Config, StorePool};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "pg-bootstrap")]
#[command(about = "Provision PostgreSQL schemas, tables and change capture for a service")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "bootstrap.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full provisioning pipeline
    Run {
        /// Print the DDL plan without connecting to the database
        #[arg(long)]
        dry_run: bool,
    },

    /// Print every statement the pipeline would issue, without connecting
    Plan,

    /// Verify the provisioned state: tables, columns, replica identity
    Validate,

    /// Test the database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), BootstrapError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(BootstrapError::Config)?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Run { dry_run: true } | Commands::Plan => {
            print_plan(&config);
        }

        Commands::Run { dry_run: false } => {
            let tables = config.bootstrap.tables.clone();
            let bootstrap = Bootstrap::connect(config).await?;
            // Close the pool on Ctrl-C instead of leaving connections to the
            // server's timeout; the run itself is idempotent and can be rerun.
            let result = tokio::select! {
                result = bootstrap.run(&tables) => result,
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupt received, closing pool");
                    Err(BootstrapError::Interrupted(
                        "bootstrap aborted by signal".into(),
                    ))
                }
            };
            bootstrap.store().close();
            let report = result?;

            if cli.output_json {
                println!("{}", report.to_json()?);
            } else {
                println!("\nBootstrap completed!");
                println!("  Run ID: {}", report.run_id);
                println!("  Duration: {:.2}s", report.duration_seconds);
                println!("  Schemas: {}", report.schemas.join(", "));
                println!(
                    "  Tables: {}/{}",
                    report.tables_migrated, report.tables_total
                );
            }
        }

        Commands::Validate => {
            let store = StorePool::connect(&config.database, &config.pool).await?;
            let result = validate(&store, &config).await;
            store.close();
            result?;
            println!("Validation passed");
        }

        Commands::HealthCheck => {
            let store = StorePool::connect(&config.database, &config.pool).await?;
            store.close();
            println!("Connection OK: {}", config.database.endpoint());
        }
    }

    Ok(())
}

/// Print the DDL plan, one statement per block.
fn print_plan(config: &Config) {
    for statement in plan(config) {
        println!("{};\n", statement);
    }
}

/// Check that every descriptor's table exists with its declared NOT NULL
/// columns, and that every user table carries full-row replica identity.
async fn validate(store: &StorePool, config: &Config) -> Result<(), BootstrapError> {
    let mut problems = Vec::new();

    for table in &config.bootstrap.tables {
        let schema = table.schema.as_str();
        if !store.table_exists(schema, &table.name).await? {
            problems.push(format!("missing table {}", table.qualified_name()));
            continue;
        }
        let columns = store.existing_columns(schema, &table.name).await?;
        for col in table.columns.iter().filter(|c| !c.nullable) {
            if !columns.iter().any(|name| name == &col.name) {
                problems.push(format!(
                    "table {} missing column {}",
                    table.qualified_name(),
                    col.name
                ));
            }
        }
    }

    for (schema, table) in store.user_tables().await? {
        match store.replica_identity(&schema, &table).await? {
            Some('f') => {}
            other => problems.push(format!(
                "table \"{}\".\"{}\" replica identity is {:?}, expected full",
                schema, table, other
            )),
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(BootstrapError::Validation(problems.join("; ")))
    }
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
