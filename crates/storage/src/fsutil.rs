// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small filesystem helpers shared by the stores.

use crate::StorageError;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Create a directory (and parents) with owner-only permissions.
pub fn create_dir_private(path: &Path) -> Result<(), StorageError> {
    if path.exists() {
        return Ok(());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(path)
            .map_err(|e| StorageError::io(path, e))
    }
    #[cfg(not(unix))]
    {
        fs::create_dir_all(path).map_err(|e| StorageError::io(path, e))
    }
}

/// Open a file for appending, creating it owner-only if needed.
pub fn open_append_private(path: &Path) -> Result<File, StorageError> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path).map_err(|e| StorageError::io(path, e))
}

/// `store.json` → `store.json.bak` (the extension is appended, not swapped,
/// so sibling files can never collide).
pub fn with_suffix(path: &Path, suffix: &str) -> std::path::PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    std::path::PathBuf::from(os)
}

/// Write `contents` atomically: `.tmp` + fsync + rename, keeping the prior
/// file as `.bak` when one exists.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        create_dir_private(parent)?;
    }

    if path.exists() {
        let bak = with_suffix(path, ".bak");
        fs::copy(path, &bak).map_err(|e| StorageError::io(&bak, e))?;
    }

    let tmp = with_suffix(path, ".tmp");
    {
        let mut options = OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp).map_err(|e| StorageError::io(&tmp, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| StorageError::io(&tmp, e))?;
        file.sync_all().map_err(|e| StorageError::io(&tmp, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| StorageError::io(path, e))
}

#[cfg(test)]
#[path = "fsutil_tests.rs"]
mod tests;
