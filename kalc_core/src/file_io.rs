//! # File I/O Module
//!
//! Atomic writes for generated artifacts and the registry:
//! write to a uniquely named `.<name>.*.tmp` beside the target, fsync, then
//! rename over the target. A reader (or a
//! second maintenance run) sees either the old file or the new one, never a
//! partial write.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kalc_core::file_io::{read_text, write_atomic};
//! use std::path::Path;
//!
//! let path = Path::new("generated/registry.json");
//! write_atomic(path, b"[]")?;
//! assert_eq!(read_text(path)?, "[]");
//! # Ok::<(), kalc_core::errors::CalcError>(())
//! ```

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::Builder;

use crate::errors::{CalcError, CalcResult};

/// Write `bytes` to `path` atomically, creating parent directories.
///
/// Each call stages into its own temp file next to `path`, so concurrent
/// writers never share one. The temp file is removed on every failure path.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> CalcResult<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| {
                CalcError::file_error("create directory", parent.display().to_string(), e.to_string())
            })?;
            parent
        }
        None => Path::new("."),
    };

    let prefix = format!(
        ".{}.",
        path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
    );
    let mut tmp_file = Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| CalcError::file_error("create temp file", dir.display().to_string(), e.to_string()))?;

    tmp_file.write_all(bytes).map_err(|e| {
        CalcError::file_error("write temp file", tmp_file.path().display().to_string(), e.to_string())
    })?;

    tmp_file.as_file().sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_file.path().display().to_string(), e.to_string())
    })?;

    // On failure the temp file comes back inside the error and is deleted on drop.
    tmp_file
        .persist(path)
        .map_err(|e| CalcError::file_error("rename to final", path.display().to_string(), e.error.to_string()))?;

    Ok(())
}

/// Read a UTF-8 file.
pub fn read_text(path: &Path) -> CalcResult<String> {
    fs::read_to_string(path).map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))
}

/// Read a file if it exists. `Ok(None)` when it does not.
pub fn read_optional(path: &Path) -> CalcResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CalcError::file_error("read", path.display().to_string(), e.to_string())),
    }
}
