//! PostgreSQL dialect

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use super::{Dialect, DialectName};
use crate::codegen::{HelperType, TsType};
use crate::error::Result;
use crate::introspect::{
    ColumnMetadata, DatabaseMetadata, EnumCollection, IntrospectOptions, TableMetadata,
};

const COLUMNS_QUERY: &str = r#"
SELECT
    c.table_schema::text AS table_schema,
    c.table_name::text AS table_name,
    (t.table_type = 'VIEW') AS is_view,
    c.column_name::text AS column_name,
    c.data_type::text AS data_type,
    c.udt_schema::text AS udt_schema,
    c.udt_name::text AS udt_name,
    (c.is_nullable = 'YES') AS is_nullable,
    c.column_default::text AS column_default,
    (c.is_identity = 'YES') AS is_identity,
    col_description(
        format('%I.%I', c.table_schema, c.table_name)::regclass::oid,
        c.ordinal_position::int
    ) AS column_comment
FROM information_schema.columns c
JOIN information_schema.tables t
    ON t.table_schema = c.table_schema AND t.table_name = c.table_name
WHERE c.table_schema = ANY($1)
ORDER BY c.table_schema, c.table_name, c.ordinal_position
"#;

const ENUMS_QUERY: &str = r#"
SELECT
    n.nspname::text AS schema_name,
    t.typname::text AS enum_name,
    e.enumlabel::text AS enum_value
FROM pg_type t
JOIN pg_enum e ON t.oid = e.enumtypid
JOIN pg_namespace n ON n.oid = t.typnamespace
ORDER BY n.nspname, t.typname, e.enumsortorder
"#;

#[derive(Debug, FromRow)]
struct ColumnRow {
    table_schema: String,
    table_name: String,
    is_view: Option<bool>,
    column_name: String,
    data_type: String,
    udt_schema: Option<String>,
    udt_name: Option<String>,
    is_nullable: Option<bool>,
    column_default: Option<String>,
    is_identity: Option<bool>,
    column_comment: Option<String>,
}

#[derive(Debug, FromRow)]
struct EnumRow {
    schema_name: String,
    enum_name: String,
    enum_value: String,
}

/// PostgreSQL dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    async fn connect(connection_string: &str) -> Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(connection_string)
            .await?;
        Ok(pool)
    }
}

#[async_trait]
impl Dialect for PostgresDialect {
    fn name(&self) -> DialectName {
        DialectName::Postgres
    }

    fn default_schema(&self) -> Option<&str> {
        Some("public")
    }

    async fn introspect(
        &self,
        connection_string: &str,
        options: &IntrospectOptions,
    ) -> Result<DatabaseMetadata> {
        let pool = Self::connect(connection_string).await?;

        let columns = sqlx::query_as::<_, ColumnRow>(COLUMNS_QUERY)
            .bind(options.schemas.as_slice())
            .fetch_all(&pool)
            .await;
        let enum_rows = sqlx::query_as::<_, EnumRow>(ENUMS_QUERY)
            .fetch_all(&pool)
            .await;
        pool.close().await;

        let columns = columns?;
        debug!("Read {} columns from information_schema", columns.len());

        let mut enums = EnumCollection::default();
        for row in enum_rows? {
            enums.add(Some(&row.schema_name), &row.enum_name, row.enum_value);
        }

        Ok(DatabaseMetadata {
            tables: group_columns(columns),
            enums,
        })
    }

    fn resolve_type(&self, column: &ColumnMetadata, enums: &EnumCollection) -> TsType {
        if enums.contains(column.data_type_schema.as_deref(), &column.data_type) {
            return TsType::Enum {
                schema: column.data_type_schema.clone(),
                name: column.data_type.clone(),
            };
        }

        match column.data_type.as_str() {
            "bool" => TsType::Boolean,
            "int2" | "int4" | "float4" | "float8" | "oid" | "money" => TsType::Number,
            "int8" => TsType::Helper(HelperType::Int8),
            "numeric" => TsType::Helper(HelperType::Numeric),
            "date" | "timestamp" | "timestamptz" => TsType::Helper(HelperType::Timestamp),
            "json" | "jsonb" => TsType::Helper(HelperType::Json),
            "bytea" => TsType::Buffer,
            "text" | "varchar" | "bpchar" | "char" | "name" | "citext" | "uuid" | "time"
            | "timetz" | "interval" | "inet" | "cidr" | "macaddr" | "macaddr8" | "bit"
            | "varbit" | "xml" | "tsvector" | "tsquery" => TsType::String,
            _ => TsType::Unknown,
        }
    }
}

/// Fold ordered column rows into tables
fn group_columns(rows: Vec<ColumnRow>) -> Vec<TableMetadata> {
    let mut tables: Vec<TableMetadata> = Vec::new();

    for row in rows {
        let same_table = tables.last().is_some_and(|t| {
            t.schema.as_deref() == Some(row.table_schema.as_str()) && t.name == row.table_name
        });
        if !same_table {
            let mut table = TableMetadata::new(Some(row.table_schema.clone()), &row.table_name);
            table.is_view = row.is_view.unwrap_or(false);
            tables.push(table);
        }

        let is_array = row.data_type == "ARRAY";
        let udt_name = row.udt_name.unwrap_or_else(|| row.data_type.clone());
        // Array element types are reported with a leading underscore (`_int4`)
        let data_type = if is_array {
            udt_name.strip_prefix('_').unwrap_or(&udt_name).to_string()
        } else {
            udt_name
        };
        let is_serial = row
            .column_default
            .as_deref()
            .is_some_and(|d| d.starts_with("nextval("));

        let mut column = ColumnMetadata::new(row.column_name, data_type);
        column.data_type_schema = row.udt_schema;
        column.is_array = is_array;
        column.nullable = row.is_nullable.unwrap_or(true);
        column.is_auto_increment = row.is_identity.unwrap_or(false) || is_serial;
        column.has_default_value = row.column_default.is_some();
        column.comment = row.column_comment;

        if let Some(table) = tables.last_mut() {
            table.columns.push(column);
        }
    }

    tables
}
