use super::*;
use std::fs;
use std::path::{Path, PathBuf};

fn collect_relative_paths(walker: Walker) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.expect("walker entry");
        if entry.depth() == 0 {
            continue;
        }
        paths.push(entry.relative_path().to_path_buf());
    }
    paths
}

#[test]
fn walk_errors_when_root_missing() {
    let builder = WalkBuilder::new("/nonexistent/path/for/walker");
    let error = match builder.build() {
        Ok(_) => panic!("missing root should fail"),
        Err(error) => error,
    };
    assert!(matches!(error.kind(), WalkErrorKind::RootMetadata { .. }));
    assert!(error.is_missing_root());
    assert_eq!(error.path(), Path::new("/nonexistent/path/for/walker"));
}

#[test]
fn walk_single_file_emits_root_entry() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = temp.path().join("file.txt");
    fs::write(&file, b"contents").expect("write");

    let mut walker = WalkBuilder::new(&file).build().expect("build walker");
    let entry = walker.next().expect("entry").expect("entry ok");
    assert_eq!(entry.depth(), 0);
    assert_eq!(entry.kind(), EntryKind::File);
    assert_eq!(entry.relative_path(), Path::new(""));
    assert!(walker.next().is_none());
}

#[test]
fn walk_directory_yields_deterministic_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("root");
    fs::create_dir(&root).expect("create root");
    fs::create_dir(root.join("b")).expect("dir b");
    fs::create_dir(root.join("a")).expect("dir a");
    fs::write(root.join("a/inner.txt"), b"data").expect("write inner");
    fs::write(root.join("c.txt"), b"data").expect("write file");

    let walker = WalkBuilder::new(&root).build().expect("build walker");
    assert_eq!(
        collect_relative_paths(walker),
        vec![
            PathBuf::from("a"),
            PathBuf::from("a/inner.txt"),
            PathBuf::from("b"),
            PathBuf::from("c.txt"),
        ]
    );
}

#[test]
fn max_depth_stops_descent_but_yields_boundary_directories() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("root");
    fs::create_dir_all(root.join("l1/l2/l3/l4")).expect("nested dirs");
    fs::write(root.join("l1/l2/l3/deep.txt"), b"deep").expect("write deep");
    fs::write(root.join("l1/l2/mid.txt"), b"mid").expect("write mid");

    let walker = WalkBuilder::new(&root)
        .include_root(false)
        .max_depth(Some(3))
        .build()
        .expect("build walker");
    let entries: Vec<_> = walker.map(|entry| entry.expect("entry")).collect();
    let paths: Vec<_> = entries
        .iter()
        .map(|entry| entry.relative_path().to_path_buf())
        .collect();

    assert_eq!(
        paths,
        vec![
            PathBuf::from("l1"),
            PathBuf::from("l1/l2"),
            PathBuf::from("l1/l2/l3"),
            PathBuf::from("l1/l2/mid.txt"),
        ]
    );
    assert!(entries.iter().all(|entry| entry.depth() <= 3));
    assert_eq!(entries[2].kind(), EntryKind::Directory);
}

#[test]
fn max_depth_zero_yields_only_root() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("file"), b"x").expect("write");

    let walker = WalkBuilder::new(temp.path())
        .max_depth(Some(0))
        .build()
        .expect("build walker");
    let entries: Vec<_> = walker.map(|entry| entry.expect("entry")).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].depth(), 0);
}

#[test]
fn segment_count_ignores_root_separator() {
    assert_eq!(count_segments(Path::new("/snap/2024-01-01/data")), 3);
    assert_eq!(count_segments(Path::new("relative/path")), 2);
}

#[cfg(unix)]
#[test]
fn symlinks_are_reported_and_not_followed() {
    use std::os::unix::fs::symlink;

    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("root");
    let target = temp.path().join("target");
    fs::create_dir(&root).expect("create root");
    fs::create_dir(&target).expect("create target");
    fs::write(target.join("inner.txt"), b"data").expect("write inner");
    symlink(&target, root.join("link")).expect("create symlink");

    let walker = WalkBuilder::new(&root)
        .include_root(false)
        .build()
        .expect("build walker");
    let entries: Vec<_> = walker.map(|entry| entry.expect("entry")).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind(), EntryKind::Symlink);
    assert_eq!(entries[0].relative_path(), Path::new("link"));
}

#[cfg(unix)]
#[test]
fn unreadable_directory_is_reported_and_walk_continues() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("root");
    fs::create_dir_all(root.join("a_locked")).expect("locked dir");
    fs::write(root.join("a_locked/inner.txt"), b"x").expect("inner");
    fs::write(root.join("b.txt"), b"x").expect("sibling");
    fs::set_permissions(root.join("a_locked"), fs::Permissions::from_mode(0o000))
        .expect("lock dir");

    // Privileged users can read the directory anyway.
    if fs::read_dir(root.join("a_locked")).is_ok() {
        fs::set_permissions(root.join("a_locked"), fs::Permissions::from_mode(0o755))
            .expect("unlock dir");
        return;
    }

    let walker = WalkBuilder::new(&root)
        .include_root(false)
        .build()
        .expect("build walker");
    let results: Vec<_> = walker.collect();
    fs::set_permissions(root.join("a_locked"), fs::Permissions::from_mode(0o755))
        .expect("unlock dir");

    assert_eq!(results.len(), 3);
    let locked = results[0].as_ref().expect("locked dir still yielded");
    assert_eq!(locked.relative_path(), Path::new("a_locked"));
    assert_eq!(locked.kind(), EntryKind::Directory);
    let error = results[1].as_ref().expect_err("listing fails");
    assert!(matches!(error.kind(), WalkErrorKind::ReadDir { .. }));
    assert_eq!(error.path(), root.join("a_locked"));
    let sibling = results[2].as_ref().expect("sibling still walked");
    assert_eq!(sibling.relative_path(), Path::new("b.txt"));
}
