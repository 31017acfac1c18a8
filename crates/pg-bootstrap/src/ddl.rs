//! DDL statement generation.
//!
//! Pure string builders; every statement is idempotent (`IF NOT EXISTS`) so
//! that repeated and concurrent bootstraps converge on the same catalog state.

use crate::descriptor::{ColumnSpec, IndexSpec, TableDescriptor};

/// Namespaces owned by PostgreSQL itself; never touched by provisioning.
pub const RESERVED_SCHEMAS: [&str; 2] = ["pg_catalog", "information_schema"];

/// PostgreSQL identifier length limit.
const MAX_IDENT_LEN: usize = 63;

/// Quote a PostgreSQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Fully qualify a table name.
pub fn qualify_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// `CREATE SCHEMA IF NOT EXISTS` for one namespace.
pub fn create_schema_sql(schema: &str) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema))
}

/// Generate `CREATE TABLE` DDL for a descriptor.
pub fn create_table_sql(table: &TableDescriptor) -> String {
    let mut ddl = format!("CREATE TABLE IF NOT EXISTS {} (\n", table.qualified_name());

    let mut lines: Vec<String> = table.columns.iter().map(column_def).collect();

    let pk_cols = table.primary_key_columns();
    if !pk_cols.is_empty() {
        let quoted: Vec<String> = pk_cols.iter().map(|c| quote_ident(c)).collect();
        lines.push(format!("PRIMARY KEY ({})", quoted.join(", ")));
    }

    for (i, line) in lines.iter().enumerate() {
        ddl.push_str("    ");
        ddl.push_str(line);
        if i < lines.len() - 1 {
            ddl.push(',');
        }
        ddl.push('\n');
    }

    ddl.push(')');
    ddl
}

/// Column definition fragment shared by CREATE TABLE and ADD COLUMN.
fn column_def(col: &ColumnSpec) -> String {
    let mut def = format!("{} {}", quote_ident(&col.name), col.ty.pg_type());

    if !col.nullable {
        def.push_str(" NOT NULL");
    }
    if col.identity {
        def.push_str(" GENERATED BY DEFAULT AS IDENTITY");
    }
    if col.unique {
        def.push_str(" UNIQUE");
    }
    if let Some(ref expr) = col.default {
        def.push_str(" DEFAULT ");
        def.push_str(expr);
    }

    def
}

/// `ALTER TABLE ... ADD COLUMN IF NOT EXISTS` for a missing column.
pub fn add_column_sql(table: &TableDescriptor, col: &ColumnSpec) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {}",
        table.qualified_name(),
        column_def(col)
    )
}

/// `CREATE INDEX IF NOT EXISTS` for a secondary index.
pub fn create_index_sql(table: &TableDescriptor, idx: &IndexSpec) -> String {
    let unique = if idx.unique { "UNIQUE " } else { "" };

    let suffix = idx
        .name
        .clone()
        .unwrap_or_else(|| idx.columns.join("_"));
    let mut idx_name = format!("idx_{}_{}", table.name, suffix);
    if idx_name.len() > MAX_IDENT_LEN {
        idx_name.truncate(MAX_IDENT_LEN);
    }

    let cols: Vec<String> = idx.columns.iter().map(|c| quote_ident(c)).collect();

    format!(
        "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
        unique,
        quote_ident(&idx_name),
        table.qualified_name(),
        cols.join(", ")
    )
}

/// Administrative script that marks every user table for full-row change
/// capture. Runs as one `DO` block so the enumerate-and-alter sequence is
/// atomic with respect to the catalog view at invocation time.
pub fn replica_identity_script() -> String {
    let reserved: Vec<String> = RESERVED_SCHEMAS
        .iter()
        .map(|s| format!("'{}'", s))
        .collect();

    format!(
        r#"DO $$
DECLARE
    r RECORD;
BEGIN
    FOR r IN
        SELECT schemaname, tablename
        FROM pg_tables
        WHERE schemaname NOT IN ({})
    LOOP
        EXECUTE format('ALTER TABLE %I.%I REPLICA IDENTITY FULL;', r.schemaname, r.tablename);
    END LOOP;
END
$$;"#,
        reserved.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ColumnSpec, ColumnType, IndexSpec, TableDescriptor};

    fn prao_mst() -> TableDescriptor {
        TableDescriptor::new("master", "prao_mst")
            .column(
                ColumnSpec::new("prao_id_pk", ColumnType::Integer)
                    .primary_key()
                    .identity(),
            )
            .column(ColumnSpec::new("prao_ain", ColumnType::Integer).not_null().unique())
            .column(ColumnSpec::new("prao_code", ColumnType::Varchar(6)).not_null())
            .column(ColumnSpec::new("prao_name", ColumnType::Varchar(75)))
            .column(
                ColumnSpec::new("prao_crtd_tmstmp", ColumnType::Timestamp)
                    .not_null()
                    .default_expr("CURRENT_TIMESTAMP"),
            )
    }

    #[test]
    fn test_quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(qualify_table("bank", "branch_mst"), "\"bank\".\"branch_mst\"");
    }

    #[test]
    fn test_create_schema_is_idempotent() {
        assert_eq!(
            create_schema_sql("master"),
            "CREATE SCHEMA IF NOT EXISTS \"master\""
        );
    }

    #[test]
    fn test_create_table_declares_all_constraints() {
        let ddl = create_table_sql(&prao_mst());
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"master\".\"prao_mst\" (\n"));
        assert!(ddl.contains("\"prao_id_pk\" integer NOT NULL GENERATED BY DEFAULT AS IDENTITY"));
        assert!(ddl.contains("\"prao_ain\" integer NOT NULL UNIQUE"));
        assert!(ddl.contains("\"prao_code\" varchar(6) NOT NULL"));
        // nullable column carries no NOT NULL
        assert!(ddl.contains("\"prao_name\" varchar(75),"));
        assert!(ddl.contains("\"prao_crtd_tmstmp\" timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP"));
        assert!(ddl.contains("PRIMARY KEY (\"prao_id_pk\")"));
        assert!(ddl.ends_with(')'));
    }

    #[test]
    fn test_create_table_composite_primary_key() {
        let desc = TableDescriptor::new("acc", "entry")
            .column(ColumnSpec::new("ledger_id", ColumnType::Integer).primary_key())
            .column(ColumnSpec::new("seq", ColumnType::BigInt).primary_key());
        let ddl = create_table_sql(&desc);
        assert!(ddl.contains("PRIMARY KEY (\"ledger_id\", \"seq\")"));
    }

    #[test]
    fn test_add_column_is_idempotent() {
        let desc = prao_mst();
        let col = ColumnSpec::new("prao_email", ColumnType::Varchar(80));
        assert_eq!(
            add_column_sql(&desc, &col),
            "ALTER TABLE \"master\".\"prao_mst\" ADD COLUMN IF NOT EXISTS \"prao_email\" varchar(80)"
        );
    }

    #[test]
    fn test_index_name_derived_and_truncated() {
        let desc = prao_mst();
        let idx = IndexSpec {
            name: None,
            columns: vec!["prao_ain".into()],
            unique: true,
        };
        assert_eq!(
            create_index_sql(&desc, &idx),
            "CREATE UNIQUE INDEX IF NOT EXISTS \"idx_prao_mst_prao_ain\" ON \"master\".\"prao_mst\" (\"prao_ain\")"
        );

        let long = IndexSpec {
            name: Some("x".repeat(100)),
            columns: vec!["prao_code".into()],
            unique: false,
        };
        let sql = create_index_sql(&desc, &long);
        let name = sql
            .split("IF NOT EXISTS \"")
            .nth(1)
            .unwrap()
            .split('"')
            .next()
            .unwrap();
        assert_eq!(name.len(), 63);
    }

    #[test]
    fn test_replica_script_excludes_exactly_reserved_schemas() {
        let script = replica_identity_script();
        assert!(script.contains("REPLICA IDENTITY FULL"));
        assert!(script.contains("schemaname NOT IN ('pg_catalog', 'information_schema')"));
        assert!(script.contains("FROM pg_tables"));
        assert!(script.starts_with("DO $$"));
        assert!(script.trim_end().ends_with("$$;"));
    }
}
