//! Test helpers for composing CLI inputs on disk.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Write `contents` to `path`, creating parent directories as needed.
pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents).expect("write test file");
}

/// A temporary directory addressed through UTF-8 paths.
pub(super) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}
