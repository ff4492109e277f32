//! Temporary file management utilities.
//!
//! Remuxed videos are written to temporary files that delete themselves when
//! dropped, via the tempfile crate's `TempPath`.

use std::path::Path;

use tempfile::{Builder as TempFileBuilder, TempPath};

use crate::error::CoreResult;

/// Creates an empty temporary file with prefix and extension and returns its
/// self-deleting path. Uses the system temp dir when `dir` is `None`.
pub fn create_temp_file_path(
    dir: Option<&Path>,
    prefix: &str,
    extension: &str,
) -> CoreResult<TempPath> {
    let mut builder = TempFileBuilder::new();
    let prefix = format!("{prefix}_");
    let suffix = format!(".{extension}");
    builder.prefix(&prefix).suffix(&suffix);

    let file = match dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            builder.tempfile_in(dir)?
        }
        None => builder.tempfile()?,
    };

    Ok(file.into_temp_path())
}
