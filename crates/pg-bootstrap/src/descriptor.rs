//! Declarative entity descriptors consumed by the migrator.
//!
//! A `TableDescriptor` is the compile-time (or config-time) shape of one
//! entity: table name, columns with semantic types, and secondary indexes.
//! Descriptors are data — adding a module's schema never requires touching
//! the provisioning logic itself.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a logical namespace within the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaName(String);

impl SchemaName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a plain lowercase identifier safe to use unquoted
    /// in log lines and index names. DDL always quotes regardless.
    pub fn is_valid_ident(&self) -> bool {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }
}

impl std::fmt::Display for SchemaName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Semantic column type, rendered to a PostgreSQL type by `pg_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnType {
    #[serde(rename = "smallint")]
    SmallInt,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "bigint")]
    BigInt,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "varchar")]
    Varchar(u32),
    #[serde(rename = "char")]
    Char(u32),
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "timestamp")]
    Timestamp,
    #[serde(rename = "timestamptz")]
    TimestampTz,
    #[serde(rename = "double_precision")]
    DoublePrecision,
    #[serde(rename = "numeric")]
    Numeric(u8, u8),
    #[serde(rename = "uuid")]
    Uuid,
    #[serde(rename = "bytea")]
    Bytea,
    #[serde(rename = "jsonb")]
    Jsonb,
}

impl ColumnType {
    /// PostgreSQL type name for this semantic type.
    pub fn pg_type(&self) -> String {
        match self {
            ColumnType::SmallInt => "smallint".into(),
            ColumnType::Integer => "integer".into(),
            ColumnType::BigInt => "bigint".into(),
            ColumnType::Boolean => "boolean".into(),
            ColumnType::Text => "text".into(),
            ColumnType::Varchar(n) => format!("varchar({})", n),
            ColumnType::Char(n) => format!("char({})", n),
            ColumnType::Date => "date".into(),
            ColumnType::Timestamp => "timestamp".into(),
            ColumnType::TimestampTz => "timestamptz".into(),
            ColumnType::DoublePrecision => "double precision".into(),
            ColumnType::Numeric(p, s) => format!("numeric({}, {})", p, s),
            ColumnType::Uuid => "uuid".into(),
            ColumnType::Bytea => "bytea".into(),
            ColumnType::Jsonb => "jsonb".into(),
        }
    }
}

/// One column of a declared entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,

    /// Semantic type.
    #[serde(rename = "type", with = "serde_yaml::with::singleton_map")]
    pub ty: ColumnType,

    /// Whether NULL is allowed (default: true).
    #[serde(default = "default_true")]
    pub nullable: bool,

    /// Column-level UNIQUE constraint.
    #[serde(default)]
    pub unique: bool,

    /// Part of the primary key.
    #[serde(default)]
    pub primary_key: bool,

    /// Auto-incrementing identity column.
    #[serde(default)]
    pub identity: bool,

    /// Default expression, rendered verbatim into the DDL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ColumnSpec {
    /// A nullable column with no constraints.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: true,
            unique: false,
            primary_key: false,
            identity: false,
            default: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }
}

/// Secondary index on a declared entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Optional name suffix; derived from the column list when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Indexed columns, in order.
    pub columns: Vec<String>,

    /// Whether the index enforces uniqueness.
    #[serde(default)]
    pub unique: bool,
}

/// Declarative shape of one entity. Consumed, never mutated, by the migrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Namespace the table lives in.
    pub schema: SchemaName,

    /// Table name.
    pub name: String,

    /// Columns, in declaration order.
    pub columns: Vec<ColumnSpec>,

    /// Secondary indexes.
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

impl TableDescriptor {
    pub fn new(schema: impl Into<SchemaName>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, col: ColumnSpec) -> Self {
        self.columns.push(col);
        self
    }

    pub fn index(mut self, idx: IndexSpec) -> Self {
        self.indexes.push(idx);
        self
    }

    /// Fully qualified, quoted table name.
    pub fn qualified_name(&self) -> String {
        crate::ddl::qualify_table(self.schema.as_str(), &self.name)
    }

    /// Columns that make up the primary key, in declaration order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

impl From<String> for SchemaName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

fn default_true() -> bool {
    true
}
