use std::path::{Path, PathBuf};

/// Failure to load shader source text.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read shader source {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader source {path} is empty")]
    Empty { path: PathBuf },
}

/// Reads a shader source file.
///
/// Whitespace-only files are rejected so a truncated asset never reaches the
/// compiler as an "empty but valid" unit.
pub fn load_source(path: impl AsRef<Path>) -> Result<String, SourceError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if text.trim().is_empty() {
        return Err(SourceError::Empty {
            path: path.to_path_buf(),
        });
    }

    log::debug!("loaded shader source {} ({} bytes)", path.display(), text.len());
    Ok(text)
}
