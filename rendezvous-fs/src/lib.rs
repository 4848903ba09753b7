//! Capability-based file helpers built on `cap-std` and `camino`.
//!
//! The CLI reads participant requests and writes results through these
//! helpers so every path is resolved against an explicitly opened directory.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Write};

/// Open a UTF-8 file path for reading using ambient authority.
///
/// # Errors
///
/// Returns the underlying IO error when the file cannot be opened.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Open the directory containing `path` and return it with the file name.
///
/// A bare file name resolves against the current directory.
///
/// # Errors
///
/// Fails when `path` has no file name or its directory cannot be opened.
pub fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Return whether `path` exists and is a regular file.
///
/// # Errors
///
/// Returns [`io::ErrorKind::NotFound`] when the path or its directory does
/// not exist, and other IO errors when it cannot be inspected.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent_dir(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Create every missing directory above `path`.
///
/// Directories are created relative to the deepest ancestor that already
/// exists, which is opened as the capability root.
///
/// # Errors
///
/// Returns the underlying IO error when a directory cannot be created.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Ok(());
    };
    let existing = parent
        .ancestors()
        .find(|ancestor| ancestor.as_str().is_empty() || ancestor.is_dir())
        .unwrap_or_else(|| Utf8Path::new(""));
    let missing = parent.strip_prefix(existing).unwrap_or(parent);
    if missing.as_str().is_empty() {
        return Ok(());
    }

    let base = if existing.as_str().is_empty() {
        Utf8Path::new(".")
    } else {
        existing
    };
    fs_utf8::Dir::open_ambient_dir(base, ambient_authority())?.create_dir_all(missing)
}

/// Write `contents` to `path`, creating parent directories and replacing
/// any existing file.
///
/// # Errors
///
/// Returns the underlying IO error when the directory or file cannot be
/// created or written.
pub fn write_utf8_file(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent_dir(path)?;
    let mut file = dir.create(name.as_str())?;
    file.write_all(contents)?;
    file.flush()
}
