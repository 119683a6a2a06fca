//! Locates generation inputs on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while scanning for model files.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to create models directory '{}': {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to read models directory '{}': {source}", .path.display())]
    ReadDir { path: PathBuf, source: io::Error },
}

/// Find the model to load: the first `.gguf` file, by name, in `models_dir`.
///
/// A missing directory is created so a fresh checkout starts cleanly.
/// Returns `Ok(None)` when no model file is present; the caller decides
/// whether that is fatal.
pub fn find_model_file(models_dir: &Path) -> Result<Option<PathBuf>, DiscoveryError> {
    if !models_dir.exists() {
        fs::create_dir_all(models_dir).map_err(|source| DiscoveryError::CreateDir {
            path: models_dir.to_path_buf(),
            source,
        })?;
        return Ok(None);
    }

    let entries = fs::read_dir(models_dir).map_err(|source| DiscoveryError::ReadDir {
        path: models_dir.to_path_buf(),
        source,
    })?;

    let mut models: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_gguf_extension(path))
        .collect();
    models.sort();

    Ok(models.into_iter().next())
}

fn has_gguf_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gguf"))
}
