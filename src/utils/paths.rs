//! Application data locations

use crate::error::{AppError, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const DB_FILE_NAME: &str = "interview-analyzer.db";

/// Per-user data directory, e.g. `~/.local/share/interview-analyzer` on Linux
pub fn app_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "srprasanna", "interview-analyzer")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| AppError::Config("Could not determine a home directory".to_string()))
}

/// Database path: the explicit override, or the file inside the data directory
pub fn resolve_db_path(explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => app_data_dir()?.join(DB_FILE_NAME),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    Ok(path)
}
