//! Owned video resources.
//!
//! A [`VideoResource`] is either a caller-owned file on disk or a temporary
//! file produced by the remux step. Temporary resources delete their file
//! when dropped, which is how a replaced resource gets released.

use std::path::{Path, PathBuf};

use tempfile::TempPath;

#[derive(Debug)]
pub struct VideoResource {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl VideoResource {
    /// Wraps a file the caller owns. It is never deleted.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temp: None,
        }
    }

    /// Wraps a temporary file; the file is removed when the resource drops.
    pub fn temporary(temp: TempPath) -> Self {
        Self {
            path: temp.to_path_buf(),
            temp: Some(temp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}

impl Drop for VideoResource {
    fn drop(&mut self) {
        if self.temp.is_some() {
            log::debug!("Releasing temporary video resource: {}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_resource_removes_file_on_drop() {
        let temp = tempfile::NamedTempFile::new().unwrap().into_temp_path();
        let path = temp.to_path_buf();
        let resource = VideoResource::temporary(temp);
        assert!(resource.is_temporary());
        assert!(path.exists());

        drop(resource);
        assert!(!path.exists());
    }

    #[test]
    fn caller_owned_resource_is_kept() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let resource = VideoResource::from_path(file.path());
        assert!(!resource.is_temporary());

        drop(resource);
        assert!(file.path().exists());
    }
}
