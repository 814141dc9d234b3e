//! Filesystem helpers
//!
//! Small wrappers that attach the offending path to IO errors and write
//! files atomically.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::{EndpointError, Result};

/// Read a whole file, reporting the path on failure
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| EndpointError::file_read(path, e))
}

/// Resolve `path` against `base` unless it is already absolute
///
/// Kubeconfig file references are relative to the kubeconfig itself,
/// not to the current working directory.
pub fn resolve_relative(base: Option<&Path>, path: &Path) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

/// Replace the content of `path` in one step
///
/// The data is written next to the target and renamed over it, so readers
/// either see the old or the new content.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| EndpointError::Config(format!("Path has no parent directory: {}", path.display())))?;
    fs::create_dir_all(dir)?;

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = dir.join(tmp_name);

    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
