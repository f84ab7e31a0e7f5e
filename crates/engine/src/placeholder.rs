//! Placeholder links found in, or left in, the live tree.

use crate::error::EngineResult;
use crate::scope::ScanScope;
use metadata::{LinkKind, read_placeholder};
use std::fs;
use std::path::{Path, PathBuf};
use walk::{EntryKind, WalkBuilder, Walker};

/// A placeholder link awaiting materialization.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Placeholder {
    /// Live path holding the link.
    pub live_path: PathBuf,
    /// Decoded snapshot path the link points at.
    pub target: PathBuf,
    /// Whether the link stands in for a file or a directory.
    pub kind: LinkKind,
}

/// A decodable link found under a live root.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FoundLink {
    /// Live path holding the link.
    pub live_path: PathBuf,
    /// Decoded target.
    pub target: PathBuf,
    /// Depth below the live root.
    pub depth: usize,
}

/// Iterator over the decodable links under a live root, in walk order.
///
/// Links are never followed. Unreadable entries and malformed targets are
/// logged and skipped.
pub struct LinkScan {
    walker: Walker,
}

impl LinkScan {
    /// Starts scanning `live_root` down to the deeper of the scope's depths.
    pub fn new(live_root: &Path, scope: &ScanScope) -> EngineResult<Self> {
        let depth = scope.max_depth().max(scope.directory_depth());
        let walker = WalkBuilder::new(live_root)
            .include_root(false)
            .max_depth(Some(depth))
            .build()?;
        Ok(Self { walker })
    }
}

impl Iterator for LinkScan {
    type Item = FoundLink;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!(target: "snaprestore::walk", "skipping live entry: {error}");
                    continue;
                }
            };
            if entry.kind() != EntryKind::Symlink {
                continue;
            }
            match read_placeholder(entry.full_path()) {
                Ok(target) => {
                    return Some(FoundLink {
                        live_path: entry.full_path().to_path_buf(),
                        target,
                        depth: entry.depth(),
                    });
                }
                Err(error) => {
                    tracing::debug!(target: "snaprestore::walk", "ignoring link: {error}");
                }
            }
        }
    }
}

/// Collects the placeholders under `live_root` that point into `snapshot_root`.
///
/// File placeholders are taken from any depth within the scope; directory
/// placeholders only at exactly the scope's directory depth. A placeholder
/// whose source has already aged out of the snapshot is still returned, as a
/// file placeholder, so that materialization can clear it.
pub fn discover_placeholders(
    live_root: &Path,
    snapshot_root: &Path,
    scope: &ScanScope,
) -> EngineResult<Vec<Placeholder>> {
    let snapshot_root =
        std::path::absolute(snapshot_root).unwrap_or_else(|_| snapshot_root.to_path_buf());
    let mut found = Vec::new();

    for link in LinkScan::new(live_root, scope)? {
        if !link.target.starts_with(&snapshot_root) {
            continue;
        }
        let kind = match fs::metadata(&link.target) {
            Ok(metadata) if metadata.is_dir() => LinkKind::Directory,
            _ => LinkKind::File,
        };
        let admitted = match kind {
            LinkKind::File => link.depth <= scope.max_depth(),
            LinkKind::Directory => link.depth == scope.directory_depth(),
        };
        if admitted {
            found.push(Placeholder {
                live_path: link.live_path,
                target: link.target,
                kind,
            });
        }
    }

    logging::trace_walk!(
        "found {} placeholders under {}",
        found.len(),
        live_root.display()
    );
    Ok(found)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use metadata::create_placeholder;
    use test_support::{DEFAULT_MTIME, RestoreFixture};

    #[test]
    fn discovers_links_into_the_snapshot_only() {
        let fixture = RestoreFixture::new("2024-01-01");
        let file = fixture.snapshot_file("data/file.txt", b"payload", DEFAULT_MTIME);
        let dir = fixture.snapshot_subdir("jobs/a/b");
        let other = fixture.sibling_snapshot("2023-12-31").join("x.txt");
        fixture.live_subdir("data");
        fixture.live_subdir("jobs/a");
        create_placeholder(&fixture.live_path("data/file.txt"), &file, LinkKind::File)
            .expect("file link");
        create_placeholder(&fixture.live_path("jobs/a/b"), &dir, LinkKind::Directory)
            .expect("dir link");
        create_placeholder(&fixture.live_path("x.txt"), &other, LinkKind::File)
            .expect("foreign link");

        let found = discover_placeholders(
            fixture.live_root(),
            fixture.snapshot_root(),
            &ScanScope::new(),
        )
        .expect("discover");

        assert_eq!(
            found,
            vec![
                Placeholder {
                    live_path: fixture.live_path("data/file.txt"),
                    target: file,
                    kind: LinkKind::File,
                },
                Placeholder {
                    live_path: fixture.live_path("jobs/a/b"),
                    target: dir,
                    kind: LinkKind::Directory,
                },
            ]
        );
    }

    #[test]
    fn directory_links_off_the_directory_depth_are_ignored() {
        let fixture = RestoreFixture::new("s");
        let dir = fixture.snapshot_subdir("top");
        create_placeholder(&fixture.live_path("top"), &dir, LinkKind::Directory)
            .expect("dir link");

        let found = discover_placeholders(
            fixture.live_root(),
            fixture.snapshot_root(),
            &ScanScope::new(),
        )
        .expect("discover");
        assert!(found.is_empty());
    }

    #[test]
    fn scan_skips_malformed_links() {
        let fixture = RestoreFixture::new("s");
        std::os::unix::fs::symlink("relative", fixture.live_path("bad")).expect("bad link");
        let file = fixture.snapshot_file("good", b"x", DEFAULT_MTIME);
        create_placeholder(&fixture.live_path("good"), &file, LinkKind::File).expect("link");

        let links: Vec<_> = LinkScan::new(fixture.live_root(), &ScanScope::new())
            .expect("scan")
            .map(|link| link.live_path)
            .collect();
        assert_eq!(links, vec![fixture.live_path("good")]);
    }
}
