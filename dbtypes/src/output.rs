//! Output sinks: print to stdout or write a file

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::error::{CodegenError, Result};

/// What a sink did with the generated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Committed {
    Printed,
    Written(PathBuf),
}

/// Destination of a run's generated text, chosen once per run
#[derive(Debug)]
pub enum OutputSink {
    Stdout(StdoutSink),
    File(FileSink),
}

impl OutputSink {
    pub fn from_config(config: &GenerationConfig) -> Self {
        if config.print {
            OutputSink::Stdout(StdoutSink::new())
        } else {
            OutputSink::File(FileSink::new(&config.out_file))
        }
    }

    pub async fn commit(&self, text: &str) -> Result<Committed> {
        match self {
            OutputSink::Stdout(sink) => sink.commit(text),
            OutputSink::File(sink) => sink.commit(text).await,
        }
    }
}

/// Writes generated text to stdout (or any writer, for tests)
pub struct StdoutSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for StdoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdoutSink").finish_non_exhaustive()
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn commit(&self, text: &str) -> Result<Committed> {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let result = writer.write_all(text.as_bytes());
        result
            .and_then(|_| writer.flush())
            .map_err(|source| CodegenError::OutputWriteError {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
        Ok(Committed::Printed)
    }
}

/// Replaces the contents of one file with the generated text
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn commit(&self, text: &str) -> Result<Committed> {
        let path = self.path.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || write_atomic(&path, &text))
            .await
            .map_err(|e| CodegenError::OutputWriteError {
                path: self.path.clone(),
                source: io::Error::other(e),
            })??;
        Ok(Committed::Written(self.path.clone()))
    }
}

/// Write through a temp file in the target directory, then rename it over
/// the destination. The destination is either untouched or complete.
///
/// A symlinked destination is written through to the file it points at, and
/// an existing file keeps its permissions.
fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let target = resolve_target(path);
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_error = |source: io::Error| CodegenError::OutputWriteError {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(|source| CodegenError::OutputWriteError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(text.as_bytes()).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;

    match fs::metadata(&target) {
        Ok(existing) => tmp
            .as_file()
            .set_permissions(existing.permissions())
            .map_err(write_error)?,
        #[cfg(unix)]
        Err(_) => {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .map_err(write_error)?;
        }
        #[cfg(not(unix))]
        Err(_) => {}
    }

    tmp.persist(&target).map_err(|e| write_error(e.error))?;
    debug!("Wrote {} bytes to {}", text.len(), target.display());
    Ok(())
}

/// Follow a symlinked destination to its file. Dangling links are replaced.
fn resolve_target(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Render `path` relative to the working directory, prefixed with `./`
pub fn relative_display(path: &Path) -> String {
    let Ok(cwd) = std::env::current_dir() else {
        return path.display().to_string();
    };
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    match absolute.strip_prefix(&cwd) {
        Ok(relative) => {
            let relative: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            format!("./{}", relative.join("/"))
        }
        Err(_) => path.display().to_string(),
    }
}
