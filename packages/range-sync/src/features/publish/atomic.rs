//! Copy-then-rename publish of a single file

use crate::error::{Result, SyncError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const HIDDEN_TEMP_SUFFIX: &str = ".rngsyn";

/// `.{file}.rngsyn`; never matches the cluster file pattern
pub fn hidden_temp_name(file_name: &str) -> String {
    format!(".{}{}", file_name, HIDDEN_TEMP_SUFFIX)
}

/// Removes the hidden temp file on every exit path if it is still there
struct HiddenTemp {
    path: PathBuf,
}

impl Drop for HiddenTemp {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %e, "could not remove hidden temp file");
            }
        }
    }
}

/// Publish `src_dir/file_name` as `dest_dir/file_name`.
///
/// The copy lands in a hidden file inside `dest_dir` first, so the final
/// rename never crosses a filesystem boundary and readers see either the old
/// file or the new one.
pub fn atomic_copy(src_dir: &Path, file_name: &str, dest_dir: &Path) -> Result<()> {
    let source = src_dir.join(file_name);
    let dest = dest_dir.join(file_name);
    let temp = HiddenTemp {
        path: dest_dir.join(hidden_temp_name(file_name)),
    };

    fs::copy(&source, &temp.path).map_err(|e| SyncError::publish(&dest, e))?;
    fs::rename(&temp.path, &dest).map_err(|e| SyncError::publish(&dest, e))?;
    Ok(())
}
