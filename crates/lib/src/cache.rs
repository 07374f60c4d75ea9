//! # Local Cache Writer

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::IngestError;

/// Writes the resolved payload under the content directory and returns the
/// full path. An existing file at the same path is truncated and rewritten.
/// The file's base name is reused verbatim as the upload's declared name.
pub fn write_cache_file(
    content_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, IngestError> {
    let path = content_dir.join(file_name);
    fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_cache_file(dir.path(), "a.md", b"first").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        let path = write_cache_file(dir.path(), "a.md", b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn missing_directory_is_a_cache_error() {
        let err =
            write_cache_file(Path::new("/nonexistent-feedsync-dir"), "a.md", b"x").unwrap_err();
        assert!(matches!(err, IngestError::CacheWrite(_)));
    }
}
