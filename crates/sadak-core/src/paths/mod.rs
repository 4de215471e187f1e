//! Data directory resolution.
//!
//! Resolution order for the data root:
//! 1. An explicit override passed by the caller (e.g. `--data-dir`)
//! 2. `SADAK_DATA_DIR` environment variable
//! 3. System data directory (e.g., `~/.local/share/sadak`)

mod error;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use error::PathError;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "SADAK_DATA_DIR";

/// File name of the persisted user settings document.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Get the root directory for application data.
///
/// The directory is created if it does not exist yet.
pub fn data_root(override_dir: Option<&Path>) -> Result<PathBuf, PathError> {
    let root = match override_dir {
        Some(dir) if dir.as_os_str().is_empty() => return Err(PathError::EmptyPath),
        Some(dir) => dir.to_path_buf(),
        None => match env::var(DATA_DIR_ENV) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => dirs::data_local_dir()
                .ok_or(PathError::NoDataDir)?
                .join("sadak"),
        },
    };

    ensure_directory(&root)?;
    Ok(root)
}

/// Location of the settings document inside `data_root`.
pub fn settings_path(override_dir: Option<&Path>) -> Result<PathBuf, PathError> {
    Ok(data_root(override_dir)?.join(SETTINGS_FILE_NAME))
}

fn ensure_directory(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
