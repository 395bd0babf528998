//! CLI entry point for dbtypes

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dbtypes::config::GenerationConfig;
use dbtypes::{DialectName, Generator, LogLevel, OutputFormat, TracingDiagnostics};

#[derive(Parser)]
#[command(name = "dbtypes")]
#[command(about = "Generate TypeScript table declarations from a live database schema")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Connection URL, or env(NAME) to read it from the environment
    #[arg(short, long)]
    url: Option<String>,

    /// Dialect to use instead of the one inferred from the URL
    #[arg(short, long)]
    dialect: Option<DialectName>,

    /// File to write the declarations to
    #[arg(short, long)]
    out_file: Option<PathBuf>,

    /// Print the declarations to stdout instead of writing a file
    #[arg(long)]
    print: bool,

    /// Declaration style: interface or type
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Verbosity: silent, error, warn, info or debug
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Tables to include (comma-separated, supports *)
    #[arg(long)]
    include_tables: Option<String>,

    /// Tables to exclude (comma-separated, supports *)
    #[arg(long)]
    exclude_tables: Option<String>,

    /// Schema to introspect (repeatable)
    #[arg(long = "schema")]
    schemas: Vec<String>,

    /// Emit camelCase property names
    #[arg(long)]
    camel_case: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Variables from .env are visible to env(NAME) connection strings
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = GenerationConfig::load(cli.config.as_deref())?;
    apply_overrides(&mut config, cli);

    // Initialize logging on stderr; stdout only carries printed declarations
    // Priority: RUST_LOG env var > config.log_level
    let env_filter = EnvFilter::try_from_default_env().ok();
    let diagnostics_level = if env_filter.is_some() {
        LogLevel::Debug
    } else {
        config.log_level
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            env_filter.unwrap_or_else(|| EnvFilter::new(config.log_level.as_filter())),
        )
        .init();

    config.validate()?;
    debug!("Configuration: {:?}", config);

    let diagnostics = TracingDiagnostics::new(diagnostics_level);
    Generator::new(config).run(&diagnostics).await?;

    Ok(())
}

fn apply_overrides(config: &mut GenerationConfig, cli: Cli) {
    if let Some(url) = cli.url {
        config.url = url;
    }
    if let Some(dialect) = cli.dialect {
        config.dialect = Some(dialect);
    }
    if let Some(out_file) = cli.out_file {
        config.out_file = out_file;
    }
    if cli.print {
        config.print = true;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }
    if let Some(include) = cli.include_tables {
        config.include_tables = include;
    }
    if let Some(exclude) = cli.exclude_tables {
        config.exclude_tables = exclude;
    }
    if !cli.schemas.is_empty() {
        config.schemas = cli.schemas;
    }
    if cli.camel_case {
        config.camel_case = true;
    }
}
