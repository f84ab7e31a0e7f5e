//! Live entry classification.

use metadata::{PlaceholderError, read_placeholder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// State of a live path, decided once per entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntryState {
    /// Nothing exists at the path.
    Absent,
    /// A regular file.
    RegularFile,
    /// A real directory.
    RegularDirectory,
    /// A link whose decoded target is the contained path.
    PlaceholderLink(PathBuf),
    /// A link whose target could not be decoded.
    MalformedLink(String),
    /// Any other entry type.
    Other,
}

impl EntryState {
    /// Classifies the entry at `path` without following links.
    pub fn inspect(path: &Path) -> io::Result<Self> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Self::Absent),
            Err(error) => return Err(error),
        };

        let file_type = metadata.file_type();
        if file_type.is_file() {
            Ok(Self::RegularFile)
        } else if file_type.is_dir() {
            Ok(Self::RegularDirectory)
        } else if file_type.is_symlink() {
            match read_placeholder(path) {
                Ok(target) => Ok(Self::PlaceholderLink(target)),
                Err(PlaceholderError::Io { source, .. }) => Err(source),
                Err(error @ PlaceholderError::Codec { .. }) => {
                    Ok(Self::MalformedLink(error.to_string()))
                }
            }
        } else {
            Ok(Self::Other)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::tempdir;

    #[test]
    fn classifies_each_state() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        fs::write(root.join("file"), b"x").expect("file");
        fs::create_dir(root.join("dir")).expect("dir");
        symlink("/snap/s/file", root.join("link")).expect("link");
        symlink("not/absolute", root.join("bad")).expect("bad link");

        assert_eq!(EntryState::inspect(&root.join("none")).expect("absent"), EntryState::Absent);
        assert_eq!(
            EntryState::inspect(&root.join("file")).expect("file"),
            EntryState::RegularFile
        );
        assert_eq!(
            EntryState::inspect(&root.join("dir")).expect("dir"),
            EntryState::RegularDirectory
        );
        assert_eq!(
            EntryState::inspect(&root.join("link")).expect("link"),
            EntryState::PlaceholderLink(PathBuf::from("/snap/s/file"))
        );
        assert!(matches!(
            EntryState::inspect(&root.join("bad")).expect("bad"),
            EntryState::MalformedLink(_)
        ));
    }

    #[test]
    fn fifo_is_other() {
        let temp = tempdir().expect("tempdir");
        let fifo = temp.path().join("pipe");
        test_support::make_fifo(&fifo).expect("fifo");
        assert_eq!(EntryState::inspect(&fifo).expect("fifo"), EntryState::Other);
    }
}
