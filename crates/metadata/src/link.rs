//! Placeholder link primitives.

use crate::link_codec::{LinkCodecError, decode_target, encode_target};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Kind of entry a placeholder stands in for.
///
/// Unix links are untyped; the kind matters on platforms that distinguish file
/// and directory links.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LinkKind {
    /// Placeholder for a regular file.
    File,
    /// Placeholder for a directory tree.
    Directory,
}

/// Failure while creating or reading a placeholder link.
#[derive(Debug, thiserror::Error)]
pub enum PlaceholderError {
    /// A filesystem call failed.
    #[error("failed to {action} '{}': {source}", .path.display())]
    Io {
        /// Action that was attempted.
        action: &'static str,
        /// Link path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The target could not be encoded or the stored target could not be decoded.
    #[error("malformed link target at '{}': {source}", .path.display())]
    Codec {
        /// Link path.
        path: PathBuf,
        /// Codec failure.
        #[source]
        source: LinkCodecError,
    },
}

impl PlaceholderError {
    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Reports whether the failure was a malformed or unencodable target.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Codec { .. })
    }
}

/// Reports whether `metadata` (from [`fs::symlink_metadata`]) describes a link.
#[must_use]
pub fn is_placeholder(metadata: &fs::Metadata) -> bool {
    metadata.file_type().is_symlink()
}

/// Creates a placeholder link at `link` pointing at `target`.
///
/// The target is passed through [`encode_target`] before being stored. The
/// parent directory of `link` must already exist and `link` itself must not.
pub fn create_placeholder(
    link: &Path,
    target: &Path,
    kind: LinkKind,
) -> Result<(), PlaceholderError> {
    let encoded = encode_target(target).map_err(|source| PlaceholderError::Codec {
        path: link.to_path_buf(),
        source,
    })?;
    symlink(Path::new(&encoded), link, kind)
        .map_err(|error| PlaceholderError::io("create placeholder link", link, error))
}

/// Reads and decodes the target of the placeholder link at `link`.
pub fn read_placeholder(link: &Path) -> Result<PathBuf, PlaceholderError> {
    let raw = fs::read_link(link)
        .map_err(|error| PlaceholderError::io("read placeholder link", link, error))?;
    let raw = raw.to_str().ok_or_else(|| PlaceholderError::Codec {
        path: link.to_path_buf(),
        source: LinkCodecError::NotUnicode(raw.display().to_string()),
    })?;
    decode_target(raw).map_err(|source| PlaceholderError::Codec {
        path: link.to_path_buf(),
        source,
    })
}

/// Removes the placeholder link at `link` without touching its target.
pub fn remove_placeholder(link: &Path, kind: LinkKind) -> Result<(), PlaceholderError> {
    remove_link(link, kind)
        .map_err(|error| PlaceholderError::io("remove placeholder link", link, error))
}

/// Recreates the link at `source` at `destination` with the same raw target.
///
/// The target is neither decoded nor followed.
pub fn copy_raw_link(source: &Path, destination: &Path) -> Result<(), PlaceholderError> {
    let target =
        fs::read_link(source).map_err(|error| PlaceholderError::io("read link", source, error))?;
    let kind = if fs::metadata(source).is_ok_and(|metadata| metadata.is_dir()) {
        LinkKind::Directory
    } else {
        LinkKind::File
    };
    symlink(&target, destination, kind)
        .map_err(|error| PlaceholderError::io("copy link", destination, error))
}

/// Returns the hidden sibling used to stage a replacement link for `path`.
///
/// The staged link is renamed over `path` in a single step.
#[must_use]
pub fn staged_link_path(path: &Path) -> PathBuf {
    sibling_with(path, ".", ".snaprestore-link")
}

/// Returns the hidden sibling a replaced directory is moved to before removal.
#[must_use]
pub fn retired_path(path: &Path) -> PathBuf {
    sibling_with(path, ".", ".snaprestore-old")
}

/// Returns the hidden sibling a file copy is staged in before it is renamed
/// over the placeholder at `path`.
#[must_use]
pub fn staged_copy_path(path: &Path) -> PathBuf {
    sibling_with(path, ".", ".snaprestore-copy")
}

/// Returns the `<name>.tmp` sibling a directory copy is staged in.
#[must_use]
pub fn staging_path(path: &Path) -> PathBuf {
    sibling_with(path, "", ".tmp")
}

fn sibling_with(path: &Path, prefix: &str, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix);
    name.push(path.file_name().unwrap_or_default());
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path, _kind: LinkKind) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path, kind: LinkKind) -> io::Result<()> {
    match kind {
        LinkKind::File => std::os::windows::fs::symlink_file(target, link),
        LinkKind::Directory => std::os::windows::fs::symlink_dir(target, link),
    }
}

#[cfg(windows)]
fn remove_link(link: &Path, kind: LinkKind) -> io::Result<()> {
    match kind {
        LinkKind::File => fs::remove_file(link),
        LinkKind::Directory => fs::remove_dir(link),
    }
}

#[cfg(not(windows))]
fn remove_link(link: &Path, _kind: LinkKind) -> io::Result<()> {
    fs::remove_file(link)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_target: &Path, _link: &Path, _kind: LinkKind) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "placeholder links are not supported on this platform",
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn created_placeholder_round_trips_through_codec() {
        let temp = tempdir().expect("tempdir");
        let target = temp.path().join("snap/file.txt");
        let link = temp.path().join("file.txt");

        create_placeholder(&link, &target, LinkKind::File).expect("create link");

        let metadata = fs::symlink_metadata(&link).expect("link metadata");
        assert!(is_placeholder(&metadata));
        assert_eq!(read_placeholder(&link).expect("read link"), target);
    }

    #[test]
    fn network_targets_are_stored_encoded() {
        let temp = tempdir().expect("tempdir");
        let link = temp.path().join("remote");

        create_placeholder(&link, Path::new("//array/share/x"), LinkKind::Directory)
            .expect("create link");

        assert_eq!(
            fs::read_link(&link).expect("raw target"),
            PathBuf::from("UNC/array/share/x")
        );
        assert_eq!(
            read_placeholder(&link).expect("decoded"),
            PathBuf::from("//array/share/x")
        );
    }

    #[test]
    fn relative_raw_target_is_malformed() {
        let temp = tempdir().expect("tempdir");
        let link = temp.path().join("odd");
        std::os::unix::fs::symlink("relative/target", &link).expect("raw symlink");

        let error = read_placeholder(&link).expect_err("malformed");
        assert!(error.is_malformed());
    }

    #[test]
    fn creating_over_existing_entry_fails_with_action() {
        let temp = tempdir().expect("tempdir");
        let link = temp.path().join("taken");
        fs::write(&link, b"x").expect("existing file");

        let error = create_placeholder(&link, Path::new("/snap/x"), LinkKind::File)
            .expect_err("must fail");
        assert!(!error.is_malformed());
        assert!(error.to_string().starts_with("failed to create placeholder link"));
    }

    #[test]
    fn raw_links_are_copied_verbatim() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("source");
        let copy = temp.path().join("copy");
        std::os::unix::fs::symlink("../relative/target", &source).expect("raw link");

        copy_raw_link(&source, &copy).expect("copy link");

        assert_eq!(
            fs::read_link(&copy).expect("read copy"),
            PathBuf::from("../relative/target")
        );
    }

    #[test]
    fn sibling_names() {
        let path = Path::new("/live/data/file.txt");
        assert_eq!(
            staged_link_path(path),
            PathBuf::from("/live/data/.file.txt.snaprestore-link")
        );
        assert_eq!(
            retired_path(path),
            PathBuf::from("/live/data/.file.txt.snaprestore-old")
        );
        assert_eq!(
            staged_copy_path(path),
            PathBuf::from("/live/data/.file.txt.snaprestore-copy")
        );
        assert_eq!(staging_path(path), PathBuf::from("/live/data/file.txt.tmp"));
    }

    #[test]
    fn removing_directory_placeholder_keeps_target() {
        let temp = tempdir().expect("tempdir");
        let target = temp.path().join("snap/dir");
        fs::create_dir_all(&target).expect("target dir");
        fs::write(target.join("keep.txt"), b"x").expect("target file");
        let link = temp.path().join("dir");
        create_placeholder(&link, &target, LinkKind::Directory).expect("create link");

        remove_placeholder(&link, LinkKind::Directory).expect("remove link");

        assert!(fs::symlink_metadata(&link).is_err());
        assert!(target.join("keep.txt").is_file());
    }
}
