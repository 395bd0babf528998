//! Database introspection: table metadata and table filtering

mod metadata;

pub use metadata::*;

use async_trait::async_trait;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::dialect::Dialect;
use crate::error::Result;

/// Options passed through to a dialect's catalog queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrospectOptions {
    /// Schemas to read (engines without schemas ignore this)
    pub schemas: Vec<String>,
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self {
            schemas: vec![crate::config::defaults::SCHEMA.to_string()],
        }
    }
}

/// Produces table metadata for a connection string
#[async_trait]
pub trait Introspector: Send + Sync {
    async fn introspect(
        &self,
        connection_string: &str,
        dialect: &dyn Dialect,
    ) -> Result<DatabaseMetadata>;
}

/// Introspector backed by the dialect's own catalog queries
#[derive(Debug, Clone, Default)]
pub struct DatabaseIntrospector {
    options: IntrospectOptions,
    filter: TableFilter,
}

impl DatabaseIntrospector {
    pub fn new(options: IntrospectOptions, filter: TableFilter) -> Self {
        Self { options, filter }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            IntrospectOptions {
                schemas: config.schemas.clone(),
            },
            TableFilter::new(&config.include_tables, &config.exclude_tables),
        )
    }
}

#[async_trait]
impl Introspector for DatabaseIntrospector {
    async fn introspect(
        &self,
        connection_string: &str,
        dialect: &dyn Dialect,
    ) -> Result<DatabaseMetadata> {
        let mut metadata = dialect.introspect(connection_string, &self.options).await?;
        let found = metadata.tables.len();

        metadata.tables.retain(|t| self.filter.matches(t));
        metadata
            .tables
            .sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));

        debug!(
            "After filtering: {} of {} tables ({})",
            metadata.tables.len(),
            found,
            self.filter
        );
        Ok(metadata)
    }
}

/// Include/exclude table patterns.
///
/// Patterns are comma-separated and may contain `*`. Each pattern is tried
/// against both `name` and `schema.name`; exclusion wins over inclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl TableFilter {
    pub fn new(include: &str, exclude: &str) -> Self {
        let split = |s: &str| -> Vec<String> {
            s.split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        };
        let include = split(include)
            .into_iter()
            .filter(|p| p != "*")
            .collect();
        Self {
            include,
            exclude: split(exclude),
        }
    }

    pub fn matches(&self, table: &TableMetadata) -> bool {
        let qualified = table.qualified_name();
        let hit = |pattern: &String| {
            wildcard_match(pattern, &table.name) || wildcard_match(pattern, &qualified)
        };
        let included = self.include.is_empty() || self.include.iter().any(hit);
        let excluded = self.exclude.iter().any(hit);
        included && !excluded
    }
}

impl std::fmt::Display for TableFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let include = if self.include.is_empty() {
            "*".to_string()
        } else {
            self.include.join(",")
        };
        write!(f, "include={}, exclude={}", include, self.exclude.join(","))
    }
}

/// Glob match supporting `*` only
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}
