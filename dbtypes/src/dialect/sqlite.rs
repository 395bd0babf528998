//! SQLite dialect

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};

use super::{Dialect, DialectName};
use crate::codegen::TsType;
use crate::error::Result;
use crate::introspect::{
    ColumnMetadata, DatabaseMetadata, EnumCollection, IntrospectOptions, TableMetadata,
};

const TABLES_QUERY: &str = r#"
SELECT name, type
FROM sqlite_master
WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%'
ORDER BY name
"#;

#[derive(Debug, FromRow)]
struct TableRow {
    name: String,
    #[sqlx(rename = "type")]
    kind: String,
}

#[derive(Debug, FromRow)]
struct ColumnRow {
    name: String,
    #[sqlx(rename = "type")]
    data_type: String,
    notnull: i64,
    dflt_value: Option<String>,
    pk: i64,
}

/// SQLite dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Accepts `sqlite:` URLs as well as bare file paths
    fn connect_options(connection_string: &str) -> Result<SqliteConnectOptions> {
        let options = if connection_string.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(connection_string)?
        } else {
            SqliteConnectOptions::new().filename(connection_string)
        };
        Ok(options.read_only(true))
    }

    async fn connect(connection_string: &str) -> Result<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(Self::connect_options(connection_string)?)
            .await?;
        Ok(pool)
    }
}

#[async_trait]
impl Dialect for SqliteDialect {
    fn name(&self) -> DialectName {
        DialectName::Sqlite
    }

    async fn introspect(
        &self,
        connection_string: &str,
        _options: &IntrospectOptions,
    ) -> Result<DatabaseMetadata> {
        let pool = Self::connect(connection_string).await?;
        let tables = read_tables(&pool).await;
        pool.close().await;

        Ok(DatabaseMetadata {
            tables: tables?,
            enums: EnumCollection::default(),
        })
    }

    fn resolve_type(&self, column: &ColumnMetadata, _enums: &EnumCollection) -> TsType {
        affinity(&column.data_type)
    }
}

async fn read_tables(pool: &SqlitePool) -> Result<Vec<TableMetadata>> {
    let table_rows = sqlx::query_as::<_, TableRow>(TABLES_QUERY)
        .fetch_all(pool)
        .await?;

    let mut tables = Vec::with_capacity(table_rows.len());
    for row in table_rows {
        let pragma = format!("PRAGMA table_info(\"{}\")", row.name.replace('"', "\"\""));
        let column_rows = sqlx::query_as::<_, ColumnRow>(&pragma)
            .fetch_all(pool)
            .await?;

        // A single INTEGER PRIMARY KEY aliases the rowid
        let pk_count = column_rows.iter().filter(|c| c.pk > 0).count();

        let mut table = TableMetadata::new(None, row.name);
        table.is_view = row.kind == "view";
        for col in column_rows {
            let is_rowid =
                pk_count == 1 && col.pk > 0 && col.data_type.eq_ignore_ascii_case("integer");
            let mut column = ColumnMetadata::new(col.name, col.data_type);
            column.nullable = col.notnull == 0 && col.pk == 0;
            column.is_auto_increment = is_rowid;
            column.has_default_value = col.dflt_value.is_some();
            table.columns.push(column);
        }
        tables.push(table);
    }
    Ok(tables)
}

/// Map a declared column type using SQLite's type affinity rules
fn affinity(declared: &str) -> TsType {
    let declared = declared.to_uppercase();
    if declared.contains("INT") {
        TsType::Number
    } else if ["CHAR", "CLOB", "TEXT"].iter().any(|t| declared.contains(t)) {
        TsType::String
    } else if declared.is_empty() || declared.contains("BLOB") {
        TsType::Buffer
    } else if ["REAL", "FLOA", "DOUB"].iter().any(|t| declared.contains(t)) {
        TsType::Number
    } else if declared.contains("DATE") || declared.contains("TIME") {
        TsType::String
    } else {
        // NUMERIC affinity, including BOOLEAN
        TsType::Number
    }
}
