use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "ndplot",
    version,
    about = "A tool to perform n-dimensional plots from a collection of figures.",
    disable_version_flag = true
)]
pub struct LaunchArgs {
    /// Directory containing the figures, the default is the current directory.
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: (),
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Directory `{}` not found.", .0.display())]
    DirectoryNotFound(PathBuf),
}

/// Absolute form of `directory`, which must exist.
pub fn resolve_directory(directory: &Path) -> Result<PathBuf, LaunchError> {
    if !directory.is_dir() {
        return Err(LaunchError::DirectoryNotFound(directory.to_path_buf()));
    }
    fs::canonicalize(directory).map_err(|_| LaunchError::DirectoryNotFound(directory.to_path_buf()))
}
