//! MySQL dialect

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Pool as MysqlAsyncPool, Row as MySqlAsyncRow};
use tracing::debug;

use super::{Dialect, DialectName};
use crate::codegen::{HelperType, TsType};
use crate::error::{CodegenError, Result};
use crate::introspect::{
    ColumnMetadata, DatabaseMetadata, EnumCollection, IntrospectOptions, TableMetadata,
};

const COLUMNS_QUERY: &str = r#"
SELECT
    c.TABLE_SCHEMA AS table_schema,
    c.TABLE_NAME AS table_name,
    t.TABLE_TYPE AS table_type,
    c.COLUMN_NAME AS column_name,
    c.DATA_TYPE AS data_type,
    c.COLUMN_TYPE AS column_type,
    c.IS_NULLABLE AS is_nullable,
    c.COLUMN_DEFAULT AS column_default,
    c.EXTRA AS extra,
    c.COLUMN_COMMENT AS column_comment
FROM information_schema.COLUMNS c
JOIN information_schema.TABLES t
    ON t.TABLE_SCHEMA = c.TABLE_SCHEMA AND t.TABLE_NAME = c.TABLE_NAME
WHERE c.TABLE_SCHEMA = DATABASE()
ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION
"#;

/// MySQL dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect;

#[async_trait]
impl Dialect for MysqlDialect {
    fn name(&self) -> DialectName {
        DialectName::Mysql
    }

    async fn introspect(
        &self,
        connection_string: &str,
        _options: &IntrospectOptions,
    ) -> Result<DatabaseMetadata> {
        let opts = mysql_async::Opts::from_url(connection_string)
            .map_err(|e| CodegenError::IntrospectionError(e.to_string()))?;
        let pool = MysqlAsyncPool::new(opts);

        let rows = fetch_column_rows(&pool).await;
        pool.disconnect().await?;
        let rows = rows?;
        debug!("Read {} columns from information_schema", rows.len());

        let mut tables: Vec<TableMetadata> = Vec::new();
        for row in &rows {
            let table_name = get_string(row, "table_name")?.unwrap_or_default();
            if tables.last().map(|t| t.name.as_str()) != Some(table_name.as_str()) {
                let mut table = TableMetadata::new(None, table_name);
                table.is_view = get_string(row, "table_type")?.as_deref() == Some("VIEW");
                tables.push(table);
            }

            let column = column_from_row(row)?;
            if let Some(table) = tables.last_mut() {
                table.columns.push(column);
            }
        }

        Ok(DatabaseMetadata {
            tables,
            enums: EnumCollection::default(),
        })
    }

    fn resolve_type(&self, column: &ColumnMetadata, _enums: &EnumCollection) -> TsType {
        if let Some(values) = &column.enum_values {
            return TsType::Literals(values.clone());
        }

        let data_type = column.data_type.to_lowercase();
        match data_type.as_str() {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "float"
            | "double" | "real" | "year" => TsType::Number,
            "decimal" | "numeric" => TsType::Helper(HelperType::Decimal),
            "date" | "datetime" | "timestamp" => TsType::Date,
            "json" => TsType::Helper(HelperType::Json),
            "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "time"
            | "set" => TsType::String,
            "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" | "bit" => {
                TsType::Buffer
            }
            _ => TsType::Unknown,
        }
    }
}

async fn fetch_column_rows(pool: &MysqlAsyncPool) -> Result<Vec<MySqlAsyncRow>> {
    let mut conn = pool.get_conn().await?;
    let rows: Vec<MySqlAsyncRow> = conn.query(COLUMNS_QUERY).await?;
    Ok(rows)
}

/// Read a nullable string column; information_schema returns some
/// columns as binary strings depending on the server version
fn get_string(row: &MySqlAsyncRow, column: &str) -> Result<Option<String>> {
    match row.get_opt::<Option<String>, _>(column) {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(CodegenError::IntrospectionError(format!(
            "Failed to read column {}: {}",
            column, e
        ))),
        None => Err(CodegenError::IntrospectionError(format!(
            "Column not found: {}",
            column
        ))),
    }
}

fn column_from_row(row: &MySqlAsyncRow) -> Result<ColumnMetadata> {
    let name = get_string(row, "column_name")?.unwrap_or_default();
    let data_type = get_string(row, "data_type")?.unwrap_or_default();
    let column_type = get_string(row, "column_type")?.unwrap_or_default();
    let extra = get_string(row, "extra")?.unwrap_or_default().to_lowercase();
    let default = get_string(row, "column_default")?;

    let mut column = ColumnMetadata::new(name, data_type);
    column.nullable = get_string(row, "is_nullable")?.as_deref() == Some("YES");
    column.is_auto_increment = extra.contains("auto_increment");
    column.has_default_value = default.is_some() || extra.contains("default_generated");
    column.enum_values = parse_enum_values(&column_type);
    column.comment = get_string(row, "column_comment")?.filter(|c| !c.is_empty());
    Ok(column)
}

/// Extract the values of an `enum('a','b')` column type
fn parse_enum_values(column_type: &str) -> Option<Vec<String>> {
    let lower = column_type.to_ascii_lowercase();
    if !lower.starts_with("enum(") || !column_type.ends_with(')') {
        return None;
    }
    let body = &column_type[5..column_type.len() - 1];

    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            // Quotes inside values are escaped by doubling
            '\'' if in_quotes && chars.peek() == Some(&'\'') => {
                current.push('\'');
                chars.next();
            }
            '\'' => {
                if in_quotes {
                    values.push(std::mem::take(&mut current));
                }
                in_quotes = !in_quotes;
            }
            _ if in_quotes => current.push(c),
            _ => {}
        }
    }
    Some(values)
}
