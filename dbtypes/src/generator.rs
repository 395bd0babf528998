//! Generation pipeline: resolve, introspect, serialize, commit

use std::time::{Duration, Instant};

use crate::codegen::{Serializer, TypeScriptSerializer};
use crate::config::GenerationConfig;
use crate::connection::{ConnectionResolver, ConnectionStringParser, ResolvedConnection};
use crate::diagnostics::Diagnostics;
use crate::dialect::{DialectManager, DialectName, DialectResolver};
use crate::error::Result;
use crate::introspect::{DatabaseIntrospector, Introspector};
use crate::output::{relative_display, Committed, OutputSink};

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Dialect the run actually used
    pub dialect: DialectName,
    /// Number of tables handed to the serializer
    pub table_count: usize,
    pub committed: Committed,
    /// Only measured when a file was written
    pub elapsed: Option<Duration>,
}

/// One generation run over a set of collaborators.
///
/// The defaults are the production implementations; tests swap any of them
/// through [`Generator::with_collaborators`].
pub struct Generator<
    C = ConnectionStringParser,
    D = DialectManager,
    I = DatabaseIntrospector,
    S = TypeScriptSerializer,
> {
    config: GenerationConfig,
    connection: C,
    dialects: D,
    introspector: I,
    serializer: S,
}

impl Generator {
    pub fn new(config: GenerationConfig) -> Self {
        let introspector = DatabaseIntrospector::from_config(&config);
        let serializer = TypeScriptSerializer::new(config.camel_case);
        Self {
            config,
            connection: ConnectionStringParser::new(),
            dialects: DialectManager,
            introspector,
            serializer,
        }
    }
}

impl<C, D, I, S> Generator<C, D, I, S>
where
    C: ConnectionResolver,
    D: DialectResolver,
    I: Introspector,
    S: Serializer,
{
    pub fn with_collaborators(
        config: GenerationConfig,
        connection: C,
        dialects: D,
        introspector: I,
        serializer: S,
    ) -> Self {
        Self {
            config,
            connection,
            dialects,
            introspector,
            serializer,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Run the pipeline, committing to the sink selected by `config.print`
    pub async fn run(&self, diagnostics: &dyn Diagnostics) -> Result<RunSummary> {
        let sink = OutputSink::from_config(&self.config);
        self.run_with_sink(&sink, diagnostics).await
    }

    /// Run the pipeline, committing to `sink`. Nothing reaches the sink
    /// unless every earlier step succeeded.
    pub async fn run_with_sink(
        &self,
        sink: &OutputSink,
        diagnostics: &dyn Diagnostics,
    ) -> Result<RunSummary> {
        let resolved = self.connection.parse(&self.config.url)?;
        let dialect_name = self.select_dialect(&resolved, diagnostics);
        let dialect = self.dialects.resolve(dialect_name)?;

        let started = Instant::now();

        diagnostics.info("Introspecting database...");
        let metadata = self
            .introspector
            .introspect(&resolved.connection_string, dialect.as_ref())
            .await?;
        let table_count = metadata.tables.len();

        diagnostics.debug(&format!("Found {} tables:", table_count));
        for table in &metadata.tables {
            diagnostics.debug(&format!(" - {}", table.name));
        }

        let text = self
            .serializer
            .serialize(dialect.as_ref(), self.config.format, &metadata)?;

        let committed = sink.commit(&text).await?;
        let elapsed = match &committed {
            Committed::Printed => None,
            Committed::Written(path) => {
                let elapsed = started.elapsed();
                diagnostics.success(&format!(
                    "Introspected {} tables and generated {} in {}ms.",
                    table_count,
                    relative_display(path),
                    elapsed.as_millis()
                ));
                Some(elapsed)
            }
        };

        Ok(RunSummary {
            dialect: dialect_name,
            table_count,
            committed,
            elapsed,
        })
    }

    /// An explicit dialect always wins over the inferred one
    fn select_dialect(
        &self,
        resolved: &ResolvedConnection,
        diagnostics: &dyn Diagnostics,
    ) -> DialectName {
        match self.config.dialect {
            Some(dialect) => {
                diagnostics.info(&format!("Using dialect '{}'.", dialect));
                dialect
            }
            None => {
                diagnostics.info(&format!(
                    "No dialect specified. Assuming '{}'.",
                    resolved.inferred_dialect
                ));
                resolved.inferred_dialect
            }
        }
    }
}
