//! Dialect strategies: per-engine introspection queries and type mapping

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::codegen::TsType;
use crate::error::{CodegenError, Result};
use crate::introspect::{ColumnMetadata, DatabaseMetadata, EnumCollection, IntrospectOptions};

/// Identifier of a database engine family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DialectName {
    Postgres,
    Mysql,
    Sqlite,
    Mssql,
    Libsql,
}

impl DialectName {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialectName::Postgres => "postgres",
            DialectName::Mysql => "mysql",
            DialectName::Sqlite => "sqlite",
            DialectName::Mssql => "mssql",
            DialectName::Libsql => "libsql",
        }
    }
}

impl fmt::Display for DialectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectName {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DialectName::Postgres),
            "mysql" => Ok(DialectName::Mysql),
            "sqlite" | "sqlite3" => Ok(DialectName::Sqlite),
            "mssql" => Ok(DialectName::Mssql),
            "libsql" => Ok(DialectName::Libsql),
            _ => Err(CodegenError::UnsupportedDialectError(s.to_string())),
        }
    }
}

impl TryFrom<String> for DialectName {
    type Error = CodegenError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DialectName> for String {
    fn from(name: DialectName) -> Self {
        name.as_str().to_string()
    }
}

/// Strategy bound to one dialect.
///
/// Knows how to query the engine's catalogs and how to map its native
/// column types to TypeScript types.
#[async_trait]
pub trait Dialect: Send + Sync {
    fn name(&self) -> DialectName;

    /// Schema whose tables are emitted without a schema prefix
    fn default_schema(&self) -> Option<&str> {
        None
    }

    /// Query the database catalogs for tables, columns and enums.
    async fn introspect(
        &self,
        connection_string: &str,
        options: &IntrospectOptions,
    ) -> Result<DatabaseMetadata>;

    /// Map a column's native type to a TypeScript type, ignoring
    /// nullability, arrays and defaults.
    fn resolve_type(&self, column: &ColumnMetadata, enums: &EnumCollection) -> TsType;
}

/// Resolves a dialect name to its strategy
pub trait DialectResolver: Send + Sync {
    fn resolve(&self, name: DialectName) -> Result<Box<dyn Dialect>>;
}

/// Registry of the dialects this crate ships strategies for
#[derive(Debug, Clone, Copy, Default)]
pub struct DialectManager;

impl DialectResolver for DialectManager {
    fn resolve(&self, name: DialectName) -> Result<Box<dyn Dialect>> {
        match name {
            DialectName::Postgres => Ok(Box::new(PostgresDialect)),
            DialectName::Mysql => Ok(Box::new(MysqlDialect)),
            DialectName::Sqlite => Ok(Box::new(SqliteDialect)),
            DialectName::Mssql | DialectName::Libsql => {
                Err(CodegenError::UnsupportedDialectError(name.to_string()))
            }
        }
    }
}
