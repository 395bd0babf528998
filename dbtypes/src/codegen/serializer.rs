//! Serializer - renders table metadata as TypeScript declarations

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dialect::Dialect;
use crate::error::{CodegenError, Result};
use crate::introspect::{DatabaseMetadata, TableMetadata};

use super::naming::{
    escape_doc_comment, quote_property, to_declaration_name, to_property_name, to_table_key,
    DeclarationNames,
};
use super::type_resolver::{TsType, TypeResolver};

/// Shape of the generated declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `export interface User { ... }`
    #[default]
    Interface,
    /// `export type User = { ... };`
    Type,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Interface => f.write_str("interface"),
            OutputFormat::Type => f.write_str("type"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interface" => Ok(OutputFormat::Interface),
            "type" => Ok(OutputFormat::Type),
            other => Err(CodegenError::ConfigError(format!(
                "Unknown output format '{}', expected 'interface' or 'type'",
                other
            ))),
        }
    }
}

/// Renders introspected metadata into source text
pub trait Serializer: Send + Sync {
    fn serialize(
        &self,
        dialect: &dyn Dialect,
        format: OutputFormat,
        metadata: &DatabaseMetadata,
    ) -> Result<String>;
}

/// TypeScript declaration serializer
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptSerializer {
    camel_case: bool,
}

impl TypeScriptSerializer {
    pub fn new(camel_case: bool) -> Self {
        Self { camel_case }
    }
}

const HEADER: &str = "/**
 * This file was generated by dbtypes.
 * Please do not edit it manually.
 */
";

/// A table with its columns already resolved to TypeScript types
struct ResolvedTable<'a> {
    table: &'a TableMetadata,
    declaration: String,
    key: String,
    properties: Vec<(String, TsType, Option<&'a str>)>,
}

impl Serializer for TypeScriptSerializer {
    fn serialize(
        &self,
        dialect: &dyn Dialect,
        format: OutputFormat,
        metadata: &DatabaseMetadata,
    ) -> Result<String> {
        let default_schema = dialect.default_schema();
        let mut helpers = BTreeSet::new();
        let mut referenced_enums = BTreeSet::new();
        let mut resolved = Vec::with_capacity(metadata.tables.len());

        for table in &metadata.tables {
            if table.columns.is_empty() {
                return Err(CodegenError::SerializationError(format!(
                    "Table '{}' has no columns",
                    table.qualified_name()
                )));
            }

            let mut properties = Vec::with_capacity(table.columns.len());
            for col in &table.columns {
                let ts_type = TypeResolver::resolve(dialect, col, &metadata.enums);
                ts_type.collect_helpers(&mut helpers);
                ts_type.collect_enums(&mut referenced_enums);
                properties.push((
                    to_property_name(&col.name, self.camel_case),
                    ts_type,
                    col.comment.as_deref().filter(|c| !c.is_empty()),
                ));
            }

            resolved.push(ResolvedTable {
                table,
                declaration: String::new(),
                key: to_table_key(table.schema.as_deref(), &table.name, default_schema),
                properties,
            });
        }

        // Enums claim their names before tables so column types keep
        // pointing at the enum alias
        let mut names = DeclarationNames::default();
        let enum_names: HashMap<(Option<String>, String), String> = referenced_enums
            .iter()
            .map(|(schema, name)| {
                let base = to_declaration_name(schema.as_deref(), name, default_schema);
                ((schema.clone(), name.clone()), names.claim(base))
            })
            .collect();
        for table in &mut resolved {
            let base = to_declaration_name(
                table.table.schema.as_deref(),
                &table.table.name,
                default_schema,
            );
            table.declaration = names.claim(base);
        }

        let enum_name = |schema: Option<&str>, name: &str| {
            enum_names
                .get(&(schema.map(str::to_string), name.to_string()))
                .cloned()
                .unwrap_or_else(|| to_declaration_name(schema, name, default_schema))
        };

        let mut code = String::new();
        code.push_str(HEADER);

        if !helpers.is_empty() {
            code.push('\n');
            code.push_str("import type { ColumnType } from \"kysely\";\n");
        }

        for (schema, name) in &referenced_enums {
            let values = metadata.enums.get(schema.as_deref(), name).ok_or_else(|| {
                CodegenError::SerializationError(format!(
                    "Enum '{}' is referenced but was not introspected",
                    name
                ))
            })?;
            let union = TsType::Literals(values.to_vec()).to_type_string(&enum_name);
            code.push('\n');
            code.push_str(&format!(
                "export type {} = {};\n",
                enum_name(schema.as_deref(), name),
                union
            ));
        }

        for helper in &helpers {
            code.push('\n');
            code.push_str(helper.definition());
        }

        for table in &resolved {
            debug!(
                "Serializing {} -> {}",
                table.table.qualified_name(),
                table.declaration
            );
            code.push('\n');
            code.push_str(&open_declaration(format, &table.declaration));
            for (property, ts_type, comment) in &table.properties {
                if let Some(comment) = comment {
                    code.push_str(&format!("  /** {} */\n", escape_doc_comment(comment)));
                }
                code.push_str(&format!(
                    "  {}: {};\n",
                    quote_property(property),
                    ts_type.to_type_string(&enum_name)
                ));
            }
            code.push_str(close_declaration(format));
        }

        code.push('\n');
        if resolved.is_empty() {
            code.push_str(&empty_declaration(format, "DB"));
        } else {
            code.push_str(&open_declaration(format, "DB"));
            for table in &resolved {
                code.push_str(&format!(
                    "  {}: {};\n",
                    quote_property(&table.key),
                    table.declaration
                ));
            }
            code.push_str(close_declaration(format));
        }

        Ok(code)
    }
}

fn open_declaration(format: OutputFormat, name: &str) -> String {
    match format {
        OutputFormat::Interface => format!("export interface {} {{\n", name),
        OutputFormat::Type => format!("export type {} = {{\n", name),
    }
}

fn close_declaration(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Interface => "}\n",
        OutputFormat::Type => "};\n",
    }
}

fn empty_declaration(format: OutputFormat, name: &str) -> String {
    match format {
        OutputFormat::Interface => format!("export interface {} {{}}\n", name),
        OutputFormat::Type => format!("export type {} = {{}};\n", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MysqlDialect, PostgresDialect};
    use crate::introspect::{ColumnMetadata, EnumCollection};

    fn column(name: &str, data_type: &str) -> ColumnMetadata {
        ColumnMetadata::new(name, data_type)
    }

    fn users_table() -> TableMetadata {
        let mut id = column("id", "int4");
        id.is_auto_increment = true;
        let email = column("email", "varchar");
        let mut bio = column("bio", "text");
        bio.nullable = true;
        bio.comment = Some("Free-form profile text".to_string());
        let mut created_at = column("created_at", "timestamptz");
        created_at.has_default_value = true;

        TableMetadata {
            schema: Some("public".to_string()),
            name: "users".to_string(),
            is_view: false,
            columns: vec![id, email, bio, created_at],
        }
    }

    #[test]
    fn test_serialize_interface() {
        let metadata = DatabaseMetadata {
            tables: vec![users_table()],
            enums: EnumCollection::default(),
        };
        let code = TypeScriptSerializer::default()
            .serialize(&PostgresDialect, OutputFormat::Interface, &metadata)
            .unwrap();

        assert!(code.starts_with("/**\n * This file was generated by dbtypes."));
        assert!(code.contains("import type { ColumnType } from \"kysely\";"));
        assert!(code.contains("export type Generated<T>"));
        assert!(code.contains("export type Timestamp ="));
        assert!(code.contains("export interface Users {\n"));
        assert!(code.contains("  id: Generated<number>;\n"));
        assert!(code.contains("  email: string;\n"));
        assert!(code.contains("  /** Free-form profile text */\n  bio: string | null;\n"));
        assert!(code.contains("  created_at: Generated<Timestamp>;\n"));
        assert!(code.contains("export interface DB {\n  users: Users;\n}\n"));
        assert!(!code.contains("export type Json"));
    }

    #[test]
    fn test_serialize_type_alias_with_camel_case() {
        let metadata = DatabaseMetadata {
            tables: vec![users_table()],
            enums: EnumCollection::default(),
        };
        let code = TypeScriptSerializer::new(true)
            .serialize(&PostgresDialect, OutputFormat::Type, &metadata)
            .unwrap();

        assert!(code.contains("export type Users = {\n"));
        assert!(code.contains("  createdAt: Generated<Timestamp>;\n"));
        assert!(code.contains("export type DB = {\n  users: Users;\n};\n"));
    }

    #[test]
    fn test_serialize_empty_database() {
        let code = TypeScriptSerializer::default()
            .serialize(&MysqlDialect, OutputFormat::Interface, &DatabaseMetadata::default())
            .unwrap();

        assert!(!code.contains("import type"));
        assert!(code.ends_with("export interface DB {}\n"));
    }

    #[test]
    fn test_serialize_postgres_enums_and_schemas() {
        let mut enums = EnumCollection::default();
        enums.add(Some("public"), "mood", "happy");
        enums.add(Some("public"), "mood", "sad");
        enums.add(Some("public"), "unused", "x");

        let mut mood = column("mood", "mood");
        mood.data_type_schema = Some("public".to_string());
        let mut tags = column("tags", "text");
        tags.is_array = true;

        let metadata = DatabaseMetadata {
            tables: vec![TableMetadata {
                schema: Some("auth".to_string()),
                name: "profiles".to_string(),
                is_view: false,
                columns: vec![mood, tags],
            }],
            enums,
        };
        let code = TypeScriptSerializer::default()
            .serialize(&PostgresDialect, OutputFormat::Interface, &metadata)
            .unwrap();

        assert!(code.contains("export type Mood = \"happy\" | \"sad\";\n"));
        assert!(!code.contains("Unused"));
        assert!(code.contains(
            "export interface AuthProfiles {\n  mood: Mood;\n  tags: string[];\n}"
        ));
        assert!(code.contains("  \"auth.profiles\": AuthProfiles;\n"));
    }

    #[test]
    fn test_serialize_rejects_table_without_columns() {
        let metadata = DatabaseMetadata {
            tables: vec![TableMetadata::new(None, "empty")],
            enums: EnumCollection::default(),
        };
        let err = TypeScriptSerializer::default()
            .serialize(&MysqlDialect, OutputFormat::Interface, &metadata)
            .unwrap_err();
        assert!(matches!(err, CodegenError::SerializationError(_)));
    }

    fn single_column_table(schema: Option<&str>, name: &str, column: ColumnMetadata) -> TableMetadata {
        TableMetadata {
            schema: schema.map(str::to_string),
            name: name.to_string(),
            is_view: false,
            columns: vec![column],
        }
    }

    #[test]
    fn test_serialize_disambiguates_colliding_table_names() {
        let metadata = DatabaseMetadata {
            tables: vec![
                single_column_table(None, "UserEmails", column("id", "int")),
                single_column_table(None, "user_emails", column("id", "int")),
            ],
            enums: EnumCollection::default(),
        };
        let code = TypeScriptSerializer::default()
            .serialize(&MysqlDialect, OutputFormat::Interface, &metadata)
            .unwrap();

        assert_eq!(code.matches("export interface UserEmails {").count(), 1);
        assert_eq!(code.matches("export interface UserEmails2 {").count(), 1);
        assert!(code.contains(concat!(
            "export interface DB {\n",
            "  UserEmails: UserEmails;\n",
            "  user_emails: UserEmails2;\n",
            "}\n"
        )));
    }

    #[test]
    fn test_serialize_disambiguates_schema_prefixed_names() {
        let metadata = DatabaseMetadata {
            tables: vec![
                single_column_table(Some("auth"), "users", column("id", "int4")),
                single_column_table(Some("public"), "auth_users", column("id", "int4")),
            ],
            enums: EnumCollection::default(),
        };
        let code = TypeScriptSerializer::default()
            .serialize(&PostgresDialect, OutputFormat::Type, &metadata)
            .unwrap();

        assert_eq!(code.matches("export type AuthUsers = {").count(), 1);
        assert_eq!(code.matches("export type AuthUsers2 = {").count(), 1);
        assert!(code.contains("  \"auth.users\": AuthUsers;\n  auth_users: AuthUsers2;\n"));
    }

    #[test]
    fn test_serialize_keeps_enum_name_when_table_collides() {
        let mut enums = EnumCollection::default();
        enums.add(Some("public"), "status", "on");
        let mut s = column("s", "status");
        s.data_type_schema = Some("public".to_string());

        let metadata = DatabaseMetadata {
            tables: vec![single_column_table(Some("public"), "status", s)],
            enums,
        };
        let code = TypeScriptSerializer::default()
            .serialize(&PostgresDialect, OutputFormat::Interface, &metadata)
            .unwrap();

        assert_eq!(code.matches("export type Status = ").count(), 1);
        assert!(code.contains("export type Status = \"on\";\n"));
        assert!(code.contains("export interface Status2 {\n  s: Status;\n}"));
        assert!(!code.contains("export interface Status {"));
        assert!(code.contains("  status: Status2;\n"));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(
            "interface".parse::<OutputFormat>().unwrap(),
            OutputFormat::Interface
        );
        assert_eq!("TYPE".parse::<OutputFormat>().unwrap(), OutputFormat::Type);
        assert!("class".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Interface);
    }
}
