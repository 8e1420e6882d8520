//! Output directory preparation.

use std::path::{
    Path,
    PathBuf,
};

use crate::error::FilesystemError;
use crate::services::OutputSink;

/// Directory that will contain `file`. `None` for a bare file name.
fn parent_dir(file: &Path) -> Option<&Path> {
    file.parent().filter(|dir| !dir.as_os_str().is_empty())
}

/// Creates the directory that will contain `file`, with all intermediate
/// directories. Announces the creation on `sink` when given.
///
/// Returns the directory, or `None` when `file` has no directory component.
pub(crate) fn ensure_parent_dir(
    file: &Path,
    sink: Option<&dyn OutputSink>,
) -> Result<Option<PathBuf>, FilesystemError> {
    let Some(dir) = parent_dir(file) else {
        return Ok(None);
    };

    if dir.is_dir() {
        return Ok(Some(dir.to_path_buf()));
    }

    if let Some(sink) = sink {
        sink.write_line(&format!("Creating output directory \"{}\"...", dir.display()));
    }
    tracing::debug!(dir = %dir.display(), "Creating directory");
    // A regular file in the way makes this fail, which is what we want.
    std::fs::create_dir_all(dir)
        .map_err(|source| FilesystemError::DirectoryCreation { path: dir.to_path_buf(), source })?;

    Ok(Some(dir.to_path_buf()))
}

/// Fails unless a file can actually be created in `dir`.
pub(crate) fn ensure_writable(dir: &Path) -> Result<(), FilesystemError> {
    tempfile::tempfile_in(dir)
        .map(drop)
        .map_err(|_| FilesystemError::NotWritable { path: dir.to_path_buf() })
}
