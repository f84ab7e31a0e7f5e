//! Link placement: creation at absent paths and atomic replacement.

use crate::error::EntryError;
use metadata::{LinkKind, create_placeholder, retired_path, staged_link_path};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Creates a placeholder at an absent path, creating missing parents.
pub(crate) fn create_link(live: &Path, target: &Path, kind: LinkKind) -> Result<(), EntryError> {
    if let Some(parent) = live.parent() {
        fs::create_dir_all(parent)
            .map_err(|error| EntryError::io("create parent directory", parent, error))?;
    }
    create_placeholder(live, target, kind)?;
    Ok(())
}

/// Replaces a file or link at `live` with a placeholder in one rename.
pub(crate) fn swap_in_link(live: &Path, target: &Path, kind: LinkKind) -> Result<(), EntryError> {
    let staged = stage_link(live, target, kind)?;
    if let Err(error) = fs::rename(&staged, live) {
        discard(&staged);
        return Err(EntryError::io("rename staged link", live, error));
    }
    Ok(())
}

/// Replaces the directory at `live` with a placeholder.
///
/// The directory is moved aside, the staged link renamed into its place, and
/// only then is the old tree deleted. If the link cannot be placed the
/// directory is moved back.
pub(crate) fn replace_directory(
    live: &Path,
    target: &Path,
    kind: LinkKind,
) -> Result<(), EntryError> {
    let staged = stage_link(live, target, kind)?;
    let retired = retired_path(live);
    if let Err(error) = clear(&retired) {
        discard(&staged);
        return Err(EntryError::io("clear retired directory", &retired, error));
    }

    if let Err(error) = fs::rename(live, &retired) {
        discard(&staged);
        return Err(EntryError::io("move directory aside", live, error));
    }

    if let Err(error) = fs::rename(&staged, live) {
        discard(&staged);
        if let Err(restore) = fs::rename(&retired, live) {
            tracing::warn!(
                target: "snaprestore::link",
                "could not restore {} from {}: {restore}",
                live.display(),
                retired.display()
            );
        }
        return Err(EntryError::io("rename staged link", live, error));
    }

    if let Err(error) = fs::remove_dir_all(&retired) {
        tracing::warn!(
            target: "snaprestore::delete",
            "replaced directory left at {}: {error}",
            retired.display()
        );
    } else {
        logging::trace_del!("removed replaced tree {}", retired.display());
    }
    Ok(())
}

fn stage_link(live: &Path, target: &Path, kind: LinkKind) -> Result<PathBuf, EntryError> {
    let staged = staged_link_path(live);
    clear(&staged).map_err(|error| EntryError::io("clear staged link", &staged, error))?;
    create_placeholder(&staged, target, kind)?;
    Ok(staged)
}

/// Removes whatever sits at `path`; a missing path is not an error.
pub(crate) fn clear(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => remove_entry(path),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error),
    }
}

#[cfg(windows)]
fn remove_entry(path: &Path) -> io::Result<()> {
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}

#[cfg(not(windows))]
fn remove_entry(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

fn discard(path: &Path) {
    if let Err(error) = clear(path) {
        tracing::warn!(
            target: "snaprestore::delete",
            "could not remove {}: {error}",
            path.display()
        );
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use metadata::read_placeholder;
    use tempfile::tempdir;

    #[test]
    fn create_link_builds_missing_parents() {
        let temp = tempdir().expect("tempdir");
        let live = temp.path().join("a/b/file.txt");

        create_link(&live, Path::new("/snap/s/a/b/file.txt"), LinkKind::File).expect("create");

        assert_eq!(
            read_placeholder(&live).expect("read"),
            PathBuf::from("/snap/s/a/b/file.txt")
        );
    }

    #[test]
    fn swap_replaces_file_and_leaves_no_staging() {
        let temp = tempdir().expect("tempdir");
        let live = temp.path().join("file.txt");
        fs::write(&live, b"stale").expect("live file");

        swap_in_link(&live, Path::new("/snap/s/file.txt"), LinkKind::File).expect("swap");

        assert_eq!(
            read_placeholder(&live).expect("read"),
            PathBuf::from("/snap/s/file.txt")
        );
        assert!(fs::symlink_metadata(staged_link_path(&live)).is_err());
    }

    #[test]
    fn swap_replaces_stale_link() {
        let temp = tempdir().expect("tempdir");
        let live = temp.path().join("file.txt");
        create_placeholder(&live, Path::new("/snap/old/file.txt"), LinkKind::File)
            .expect("old link");

        swap_in_link(&live, Path::new("/snap/new/file.txt"), LinkKind::File).expect("swap");

        assert_eq!(
            read_placeholder(&live).expect("read"),
            PathBuf::from("/snap/new/file.txt")
        );
    }

    #[test]
    fn directory_replacement_removes_old_tree() {
        let temp = tempdir().expect("tempdir");
        let live = temp.path().join("dir");
        fs::create_dir_all(live.join("nested")).expect("live tree");
        fs::write(live.join("nested/file"), b"x").expect("live file");

        replace_directory(&live, Path::new("/snap/s/dir"), LinkKind::Directory).expect("replace");

        assert_eq!(
            read_placeholder(&live).expect("read"),
            PathBuf::from("/snap/s/dir")
        );
        assert!(fs::symlink_metadata(retired_path(&live)).is_err());
    }

    #[test]
    fn unencodable_target_leaves_directory_in_place() {
        let temp = tempdir().expect("tempdir");
        let live = temp.path().join("dir");
        fs::create_dir_all(&live).expect("live dir");
        fs::write(live.join("keep"), b"x").expect("live file");

        let error = replace_directory(&live, Path::new("relative"), LinkKind::Directory)
            .expect_err("relative target");

        assert!(matches!(error, EntryError::Placeholder(_)));
        assert!(live.join("keep").is_file());
    }

    #[test]
    fn clear_accepts_missing_paths() {
        let temp = tempdir().expect("tempdir");
        clear(&temp.path().join("absent")).expect("missing is fine");
    }
}
