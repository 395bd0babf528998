//! Metadata structures for an introspected database

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Everything one introspection pass discovers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    /// Tables and views, in the order the serializer should emit them
    pub tables: Vec<TableMetadata>,

    /// Named enum types (PostgreSQL `CREATE TYPE ... AS ENUM`)
    pub enums: EnumCollection,
}

/// Metadata for a database table or view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Schema the table lives in (None for engines without schemas)
    pub schema: Option<String>,

    /// Table name
    pub name: String,

    /// Whether this is a view rather than a base table
    pub is_view: bool,

    /// Columns in ordinal order
    pub columns: Vec<ColumnMetadata>,
}

/// Metadata for a column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,

    /// Native data type as reported by the catalog (e.g. "int4", "varchar")
    pub data_type: String,

    /// Schema of the data type, for user-defined types
    pub data_type_schema: Option<String>,

    /// Whether the column holds an array of `data_type`
    pub is_array: bool,

    /// Whether the column is nullable
    pub nullable: bool,

    /// Whether the database assigns the value (auto-increment, serial, identity)
    pub is_auto_increment: bool,

    /// Whether the column has a default value expression
    pub has_default_value: bool,

    /// Inline enum values (MySQL `ENUM(...)` columns)
    pub enum_values: Option<Vec<String>>,

    /// Column comment (if any)
    pub comment: Option<String>,
}

impl TableMetadata {
    pub fn new(schema: Option<String>, name: impl Into<String>) -> Self {
        Self {
            schema,
            name: name.into(),
            is_view: false,
            columns: Vec::new(),
        }
    }

    /// `schema.name`, or just `name` when the table has no schema
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    /// Get a column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            data_type_schema: None,
            is_array: false,
            nullable: false,
            is_auto_increment: false,
            has_default_value: false,
            enum_values: None,
            comment: None,
        }
    }

    /// Check if this column has an inline enum type
    pub fn is_enum(&self) -> bool {
        self.enum_values.is_some()
    }

    /// Whether the column may be omitted on insert
    pub fn is_generated(&self) -> bool {
        self.is_auto_increment || self.has_default_value
    }
}

/// Named enum types keyed by `schema.name`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumCollection {
    enums: BTreeMap<String, Vec<String>>,
}

impl EnumCollection {
    fn key(schema: Option<&str>, name: &str) -> String {
        match schema {
            Some(schema) => format!("{}.{}", schema, name),
            None => name.to_string(),
        }
    }

    /// Append a value to the enum, creating it on first use
    pub fn add(&mut self, schema: Option<&str>, name: &str, value: impl Into<String>) {
        self.enums
            .entry(Self::key(schema, name))
            .or_default()
            .push(value.into());
    }

    pub fn get(&self, schema: Option<&str>, name: &str) -> Option<&[String]> {
        self.enums.get(&Self::key(schema, name)).map(Vec::as_slice)
    }

    pub fn contains(&self, schema: Option<&str>, name: &str) -> bool {
        self.enums.contains_key(&Self::key(schema, name))
    }

    /// Iterate `(qualified name, values)` in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.enums.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }

    pub fn len(&self) -> usize {
        self.enums.len()
    }
}
