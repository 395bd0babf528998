//! Column to TypeScript type mapping

use std::collections::BTreeSet;

use crate::dialect::Dialect;
use crate::introspect::{ColumnMetadata, EnumCollection};

use super::naming::escape_string_literal;

/// Helper aliases emitted alongside the table declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HelperType {
    Decimal,
    Generated,
    Int8,
    Json,
    Numeric,
    Timestamp,
}

impl HelperType {
    pub fn name(&self) -> &'static str {
        match self {
            HelperType::Decimal => "Decimal",
            HelperType::Generated => "Generated",
            HelperType::Int8 => "Int8",
            HelperType::Json => "Json",
            HelperType::Numeric => "Numeric",
            HelperType::Timestamp => "Timestamp",
        }
    }

    /// TypeScript source defining the alias
    pub fn definition(&self) -> &'static str {
        match self {
            HelperType::Decimal => {
                "export type Decimal = ColumnType<string, number | string, number | string>;\n"
            }
            HelperType::Generated => concat!(
                "export type Generated<T> = T extends ColumnType<infer S, infer I, infer U>\n",
                "  ? ColumnType<S, I | undefined, U>\n",
                "  : ColumnType<T, T | undefined, T>;\n",
            ),
            HelperType::Int8 => concat!(
                "export type Int8 = ColumnType<string, bigint | number | string, ",
                "bigint | number | string>;\n",
            ),
            HelperType::Json => concat!(
                "export type Json = ColumnType<JsonValue, string, string>;\n",
                "\n",
                "export type JsonArray = JsonValue[];\n",
                "\n",
                "export type JsonObject = {\n",
                "  [x: string]: JsonValue | undefined;\n",
                "};\n",
                "\n",
                "export type JsonPrimitive = boolean | number | string | null;\n",
                "\n",
                "export type JsonValue = JsonArray | JsonObject | JsonPrimitive;\n",
            ),
            HelperType::Numeric => {
                "export type Numeric = ColumnType<string, number | string, number | string>;\n"
            }
            HelperType::Timestamp => {
                "export type Timestamp = ColumnType<Date, Date | string, Date | string>;\n"
            }
        }
    }
}

/// A TypeScript type for code generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
    Boolean,
    Number,
    String,
    Buffer,
    Date,
    Unknown,
    Helper(HelperType),
    /// Inline union of string literals
    Literals(Vec<String>),
    /// Reference to a named enum declared in the database
    Enum {
        schema: Option<String>,
        name: String,
    },
    Array(Box<TsType>),
    Nullable(Box<TsType>),
    Generated(Box<TsType>),
}

impl TsType {
    /// Render the type. `enum_name` maps an enum reference to its alias.
    pub fn to_type_string(&self, enum_name: &dyn Fn(Option<&str>, &str) -> String) -> String {
        match self {
            TsType::Boolean => "boolean".to_string(),
            TsType::Number => "number".to_string(),
            TsType::String => "string".to_string(),
            TsType::Buffer => "Buffer".to_string(),
            TsType::Date => "Date".to_string(),
            TsType::Unknown => "unknown".to_string(),
            TsType::Helper(helper) => helper.name().to_string(),
            TsType::Literals(values) if values.is_empty() => "never".to_string(),
            TsType::Literals(values) => values
                .iter()
                .map(|v| format!("\"{}\"", escape_string_literal(v)))
                .collect::<Vec<_>>()
                .join(" | "),
            TsType::Enum { schema, name } => enum_name(schema.as_deref(), name),
            TsType::Array(inner) => {
                let inner_str = inner.to_type_string(enum_name);
                if inner.is_union() {
                    format!("({})[]", inner_str)
                } else {
                    format!("{}[]", inner_str)
                }
            }
            TsType::Nullable(inner) => format!("{} | null", inner.to_type_string(enum_name)),
            TsType::Generated(inner) => {
                format!("Generated<{}>", inner.to_type_string(enum_name))
            }
        }
    }

    fn is_union(&self) -> bool {
        match self {
            TsType::Literals(values) => values.len() > 1,
            TsType::Nullable(_) => true,
            _ => false,
        }
    }

    /// Collect the helper aliases this type depends on
    pub fn collect_helpers(&self, out: &mut BTreeSet<HelperType>) {
        match self {
            TsType::Helper(helper) => {
                out.insert(*helper);
            }
            TsType::Generated(inner) => {
                out.insert(HelperType::Generated);
                inner.collect_helpers(out);
            }
            TsType::Array(inner) | TsType::Nullable(inner) => inner.collect_helpers(out),
            _ => {}
        }
    }

    /// Collect the named enums this type references
    pub fn collect_enums(&self, out: &mut BTreeSet<(Option<String>, String)>) {
        match self {
            TsType::Enum { schema, name } => {
                out.insert((schema.clone(), name.clone()));
            }
            TsType::Array(inner) | TsType::Nullable(inner) | TsType::Generated(inner) => {
                inner.collect_enums(out)
            }
            _ => {}
        }
    }

    /// Get the innermost type, unwrapping Generated, Nullable and Array
    pub fn base_type(&self) -> &TsType {
        match self {
            TsType::Array(inner) | TsType::Nullable(inner) | TsType::Generated(inner) => {
                inner.base_type()
            }
            _ => self,
        }
    }
}

/// Resolve columns to full TypeScript types through a dialect
pub struct TypeResolver;

impl TypeResolver {
    /// Get the TypeScript type for a column, including array,
    /// nullability and generated wrappers
    pub fn resolve(
        dialect: &dyn Dialect,
        column: &ColumnMetadata,
        enums: &EnumCollection,
    ) -> TsType {
        let mut ts_type = dialect.resolve_type(column, enums);

        if column.is_array {
            ts_type = TsType::Array(Box::new(ts_type));
        }
        if column.nullable {
            ts_type = TsType::Nullable(Box::new(ts_type));
        }
        if column.is_generated() {
            ts_type = TsType::Generated(Box::new(ts_type));
        }
        ts_type
    }
}
