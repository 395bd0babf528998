//! Helpers shared by the integration test binaries
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dbtypes::{Diagnostics, GenerationConfig, Generator, RunSummary, Severity};

/// Keeps every message so tests can assert on them
#[derive(Default)]
pub struct RecordingDiagnostics(Mutex<Vec<(Severity, String)>>);

impl Diagnostics for RecordingDiagnostics {
    fn log(&self, severity: Severity, message: &str) {
        self.0.lock().unwrap().push((severity, message.to_string()));
    }
}

impl RecordingDiagnostics {
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

/// Config writing to `<dir>/generated/db.d.ts`
pub fn config_for(url: &str, dir: &Path) -> GenerationConfig {
    GenerationConfig {
        out_file: dir.join("generated").join("db.d.ts"),
        ..GenerationConfig::default_with_url(url)
    }
}

/// Run the production pipeline and return the summary plus the written file
pub async fn generate_file(
    config: GenerationConfig,
) -> (RunSummary, String, RecordingDiagnostics) {
    let out_file: PathBuf = config.out_file.clone();
    let diagnostics = RecordingDiagnostics::default();
    config.validate().unwrap();
    let summary = Generator::new(config).run(&diagnostics).await.unwrap();
    let text = std::fs::read_to_string(out_file).unwrap();
    (summary, text, diagnostics)
}
