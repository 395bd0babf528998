//! Naming utilities for code generation

use std::collections::HashSet;

use heck::{ToLowerCamelCase, ToPascalCase};

/// Names already taken by the generated file or by TypeScript globals
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Buffer",
    "ColumnType",
    "DB",
    "Date",
    "Decimal",
    "Generated",
    "Int8",
    "Json",
    "JsonArray",
    "JsonObject",
    "JsonPrimitive",
    "JsonValue",
    "Numeric",
    "Timestamp",
];

/// Convert a table name to a declaration name (PascalCase).
///
/// Tables outside the dialect's default schema are prefixed with their schema,
/// e.g. `auth.users` -> `AuthUsers`.
pub fn to_declaration_name(
    schema: Option<&str>,
    name: &str,
    default_schema: Option<&str>,
) -> String {
    let base = match schema {
        Some(schema) if Some(schema) != default_schema => {
            format!("{}{}", schema.to_pascal_case(), name.to_pascal_case())
        }
        _ => name.to_pascal_case(),
    };
    let base = if base.is_empty() { "Table".to_string() } else { base };

    if base.starts_with(|c: char| c.is_ascii_digit())
        || RESERVED_TYPE_NAMES.contains(&base.as_str())
    {
        format!("_{}", base)
    } else {
        base
    }
}

/// Hands out declaration names that are unique within one generated file.
///
/// A name already taken gets the first free numeric suffix, e.g. a table
/// `status` next to an enum `status` becomes `Status2`.
#[derive(Debug, Clone)]
pub struct DeclarationNames {
    used: HashSet<String>,
}

impl Default for DeclarationNames {
    fn default() -> Self {
        Self {
            used: RESERVED_TYPE_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl DeclarationNames {
    pub fn claim(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Key of a table in the `DB` declaration, e.g. `users` or `auth.users`
pub fn to_table_key(schema: Option<&str>, name: &str, default_schema: Option<&str>) -> String {
    match schema {
        Some(schema) if Some(schema) != default_schema => format!("{}.{}", schema, name),
        _ => name.to_string(),
    }
}

/// Convert a column name to a property name
pub fn to_property_name(column_name: &str, camel_case: bool) -> String {
    if camel_case {
        column_name.to_lower_camel_case()
    } else {
        column_name.to_string()
    }
}

/// Quote a property or key if it is not a valid identifier
pub fn quote_property(name: &str) -> String {
    if is_valid_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", escape_string_literal(name))
    }
}

/// Check whether a name can be used bare as a TypeScript property
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a value for use inside a double-quoted TypeScript string
pub fn escape_string_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Sanitize a comment for a `/** ... */` block
pub fn escape_doc_comment(comment: &str) -> String {
    comment.replace("*/", "*\\/")
}
