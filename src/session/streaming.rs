//! Capture-file provenance and the live encoder handle.

use std::path::{Path, PathBuf};
use tempfile::TempPath;

use crate::subprocess::ProcessHandle;

/// The file the encoder reads from. Only a file the session created itself is
/// ever deleted.
#[derive(Debug)]
pub(crate) enum CaptureFile {
    Owned(TempPath),
    External(PathBuf),
}

impl CaptureFile {
    pub fn create_temporary() -> std::io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("shellcast_")
            .suffix(".txt")
            .tempfile()?;
        Ok(CaptureFile::Owned(file.into_temp_path()))
    }

    pub fn path(&self) -> &Path {
        match self {
            CaptureFile::Owned(path) => &**path,
            CaptureFile::External(path) => path.as_path(),
        }
    }

    /// Delete the file if the session owns it.
    pub fn release(self) -> std::io::Result<()> {
        match self {
            CaptureFile::Owned(path) => path.close(),
            CaptureFile::External(_) => Ok(()),
        }
    }
}

/// A running encoder. Present exactly while streaming is active.
pub(crate) struct ActiveStream {
    pub encoder: Box<dyn ProcessHandle>,
    pub capture: CaptureFile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_owned_capture_is_deleted() {
        let capture = CaptureFile::create_temporary().unwrap();
        let path = capture.path().to_path_buf();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("shellcast_"));

        capture.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_external_capture_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mine.txt");
        std::fs::write(&path, "keep me").unwrap();

        CaptureFile::External(path.clone()).release().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
