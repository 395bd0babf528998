//! dbtypes: Generate TypeScript table declarations from a live database schema
//!
//! This crate provides both a CLI tool and a library. A run connects to a
//! PostgreSQL, MySQL or SQLite database, reads its catalogs, and renders one
//! declaration per table plus a `DB` type mapping table names to them:
//!
//! - the dialect is inferred from the connection URL unless set explicitly
//! - `env(NAME)` URLs are read from the environment (and `.env`)
//! - output goes to a file, or to stdout in print mode
//!
//! # Library Usage
//!
//! ```rust,ignore
//! use dbtypes::{generate, GenerationConfig};
//!
//! #[tokio::main]
//! async fn main() -> dbtypes::Result<()> {
//!     let config = GenerationConfig {
//!         out_file: "src/db.d.ts".into(),
//!         ..GenerationConfig::default_with_url("postgres://localhost/app")
//!     };
//!     let summary = generate(config).await?;
//!     println!("{} tables", summary.table_count);
//!     Ok(())
//! }
//! ```
//!
//! # Custom collaborators
//!
//! [`Generator::with_collaborators`] accepts any [`ConnectionResolver`],
//! [`DialectResolver`], [`Introspector`] and [`Serializer`], and
//! [`Generator::run`] reports through any [`Diagnostics`] handle.
//!
//! # CLI Usage
//!
//! ```bash
//! dbtypes --url 'env(DATABASE_URL)' --out-file src/db.d.ts
//! dbtypes --url ./app.db --print
//! ```

pub mod codegen;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod diagnostics;
pub mod error;
pub mod generator;
pub mod introspect;
pub mod output;

pub use codegen::{OutputFormat, Serializer, TypeScriptSerializer};
pub use config::GenerationConfig;
pub use connection::{ConnectionResolver, ConnectionStringParser, ResolvedConnection};
pub use diagnostics::{Diagnostics, LogLevel, Severity, TracingDiagnostics};
pub use dialect::{Dialect, DialectManager, DialectName, DialectResolver};
pub use error::{CodegenError, Result};
pub use generator::{Generator, RunSummary};
pub use introspect::{DatabaseIntrospector, Introspector};
pub use output::{Committed, OutputSink};

/// Main entry point: validate `config` and run the production pipeline,
/// reporting through `tracing` at `config.log_level`
pub async fn generate(config: GenerationConfig) -> Result<RunSummary> {
    config.validate()?;
    let diagnostics = TracingDiagnostics::new(config.log_level);
    Generator::new(config).run(&diagnostics).await
}
