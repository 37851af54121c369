//! Capability-based filesystem helpers.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

use crate::CliError;

/// Open a UTF-8 file path using ambient authority.
pub(crate) fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

fn metadata(path: &Utf8Path) -> io::Result<cap_std::fs::Metadata> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?;
    fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?.metadata(name)
}

/// Require `path` to be an existing regular file.
pub(crate) fn require_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Reject an output directory path that already exists as something else.
pub(crate) fn require_directory_or_absent(path: &Utf8Path) -> Result<(), CliError> {
    match metadata(path) {
        Ok(meta) if !meta.is_dir() => Err(CliError::OutputDirectoryNotDirectory {
            path: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}
