//! Default configuration values - single source of truth

/// Default connection URL (read from the environment)
pub const URL: &str = "env(DATABASE_URL)";

/// Default output file
pub const OUT_FILE: &str = "./generated/db.d.ts";

/// Default include tables pattern (all tables)
pub const INCLUDE_TABLES: &str = "*";

/// Default exclude tables pattern (none)
pub const EXCLUDE_TABLES: &str = "";

/// Default schema to introspect on engines that have schemas
pub const SCHEMA: &str = "public";

/// Whether to print to stdout instead of writing a file by default
pub const PRINT: bool = false;

/// Whether to camelCase property names by default
pub const CAMEL_CASE: bool = false;
