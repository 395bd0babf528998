//! Configuration settings for dbtypes

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults;
use crate::codegen::OutputFormat;
use crate::dialect::DialectName;
use crate::diagnostics::LogLevel;
use crate::error::{CodegenError, Result};

/// Configuration for one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Connection URL, or `env(NAME)` to read it from the environment
    #[serde(default = "default_url")]
    pub url: String,

    /// Dialect override; inferred from the URL when unset
    #[serde(default)]
    pub dialect: Option<DialectName>,

    /// Shape of the generated declarations
    #[serde(default)]
    pub format: OutputFormat,

    /// Verbosity (silent, error, warn, info, debug)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: LogLevel,

    /// File the declarations are written to
    #[serde(default = "default_out_file")]
    pub out_file: PathBuf,

    /// Print to stdout instead of writing `out_file`
    #[serde(default = "default_print")]
    pub print: bool,

    /// Tables to include (comma-separated, or "*" for all)
    #[serde(default = "default_include_tables")]
    pub include_tables: String,

    /// Tables to exclude (comma-separated)
    #[serde(default = "default_exclude_tables")]
    pub exclude_tables: String,

    /// Schemas to introspect (PostgreSQL)
    #[serde(default = "default_schemas")]
    pub schemas: Vec<String>,

    /// Emit camelCase property names
    #[serde(default = "default_camel_case")]
    pub camel_case: bool,
}

// Default value functions for serde
fn default_url() -> String {
    defaults::URL.to_string()
}
fn default_out_file() -> PathBuf {
    PathBuf::from(defaults::OUT_FILE)
}
fn default_print() -> bool {
    defaults::PRINT
}
fn default_include_tables() -> String {
    defaults::INCLUDE_TABLES.to_string()
}
fn default_exclude_tables() -> String {
    defaults::EXCLUDE_TABLES.to_string()
}
fn default_schemas() -> Vec<String> {
    vec![defaults::SCHEMA.to_string()]
}
fn default_camel_case() -> bool {
    defaults::CAMEL_CASE
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            dialect: None,
            format: OutputFormat::default(),
            log_level: LogLevel::default(),
            out_file: default_out_file(),
            print: default_print(),
            include_tables: default_include_tables(),
            exclude_tables: default_exclude_tables(),
            schemas: default_schemas(),
            camel_case: default_camel_case(),
        }
    }
}

impl GenerationConfig {
    /// Create a default config for the given connection URL
    pub fn default_with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: GenerationConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            builder = builder.add_source(File::with_name("dbtypes").required(false));
        }

        // Override with environment variables (DBTYPES_*)
        builder = builder.add_source(
            Environment::with_prefix("DBTYPES")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("schemas"),
        );

        let config: GenerationConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(CodegenError::ValidationError("url is required".into()));
        }

        if !self.print && self.out_file.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError(
                "out_file is required unless print is enabled".into(),
            ));
        }

        if self.schemas.iter().any(|s| s.trim().is_empty()) {
            return Err(CodegenError::ValidationError(
                "schemas must not contain empty names".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GenerationConfig::default();
        assert_eq!(config.url, "env(DATABASE_URL)");
        assert_eq!(config.out_file, PathBuf::from("./generated/db.d.ts"));
        assert_eq!(config.format, OutputFormat::Interface);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.schemas, vec!["public".to_string()]);
        assert!(config.dialect.is_none());
        assert!(!config.print);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
            url = "mysql://root@localhost/app"
            dialect = "MySQL"
            format = "type"
            log_level = "debug"
            exclude_tables = "migrations"
            camel_case = true
        "#;
        let config: GenerationConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.dialect, Some(DialectName::Mysql));
        assert_eq!(config.format, OutputFormat::Type);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.exclude_tables, "migrations");
        assert_eq!(config.include_tables, "*");
        assert!(config.camel_case);
    }

    #[test]
    fn test_config_rejects_unknown_dialect() {
        let result: std::result::Result<GenerationConfig, _> =
            toml::from_str(r#"dialect = "oracle""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation() {
        let config = GenerationConfig::default_with_url("  ");
        assert!(matches!(
            config.validate(),
            Err(CodegenError::ValidationError(_))
        ));

        let mut config = GenerationConfig::default_with_url("./app.db");
        config.out_file = PathBuf::new();
        assert!(config.validate().is_err());
        config.print = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_and_load() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "url = \"./data/app.db\"").unwrap();
        writeln!(file, "out_file = \"./src/db.ts\"").unwrap();
        writeln!(file, "schemas = [\"public\", \"auth\"]").unwrap();

        let config = GenerationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.url, "./data/app.db");
        assert_eq!(config.out_file, PathBuf::from("./src/db.ts"));

        let loaded = GenerationConfig::load(Some(file.path())).unwrap();
        assert_eq!(loaded.url, config.url);
        assert_eq!(loaded.schemas, vec!["public".to_string(), "auth".to_string()]);
    }

    #[test]
    fn test_load_applies_env_over_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "url = \"./data/app.db\"").unwrap();
        writeln!(file, "camel_case = false").unwrap();

        std::env::set_var("DBTYPES_CAMEL_CASE", "true");
        let loaded = GenerationConfig::load(Some(file.path()));
        std::env::remove_var("DBTYPES_CAMEL_CASE");

        let loaded = loaded.unwrap();
        assert_eq!(loaded.url, "./data/app.db");
        assert!(loaded.camel_case);
    }

    #[test]
    fn test_from_file_missing() {
        let err = GenerationConfig::from_file(Path::new("/nonexistent/dbtypes.toml")).unwrap_err();
        assert!(matches!(err, CodegenError::ConfigError(_)));
    }
}
