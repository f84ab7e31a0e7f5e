use crate::entry::WalkEntry;
use crate::error::WalkError;
use logging::trace_walk;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

/// Depth-first iterator over filesystem entries.
pub struct Walker {
    root: PathBuf,
    max_depth: Option<usize>,
    yielded_root: bool,
    root_metadata: Option<fs::Metadata>,
    stack: Vec<DirectoryState>,
    pending_error: Option<WalkError>,
}

impl Walker {
    pub(crate) fn new(
        root: PathBuf,
        include_root: bool,
        max_depth: Option<usize>,
    ) -> Result<Self, WalkError> {
        let root = absolutize(root)?;
        trace_walk!("walking {} (max depth {:?})", root.display(), max_depth);

        let metadata = fs::symlink_metadata(&root)
            .map_err(|error| WalkError::root_metadata(root.clone(), error))?;
        let is_dir = metadata.file_type().is_dir();

        let mut walker = Self {
            root,
            max_depth,
            yielded_root: !include_root,
            root_metadata: Some(metadata),
            stack: Vec::new(),
            pending_error: None,
        };

        if is_dir && walker.may_descend(0) {
            let state = DirectoryState::new(walker.root.clone(), PathBuf::new(), 0)?;
            walker.stack.push(state);
        }

        Ok(walker)
    }

    fn may_descend(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|limit| depth < limit)
    }

    fn prepare_entry(
        &mut self,
        full_path: PathBuf,
        relative_path: PathBuf,
        depth: usize,
    ) -> Result<WalkEntry, WalkError> {
        let metadata = fs::symlink_metadata(&full_path)
            .map_err(|error| WalkError::metadata(full_path.clone(), error))?;

        if metadata.file_type().is_dir() && self.may_descend(depth) {
            // The directory is still yielded; its listing error follows it.
            match DirectoryState::new(full_path.clone(), relative_path.clone(), depth) {
                Ok(state) => self.stack.push(state),
                Err(error) => self.pending_error = Some(error),
            }
        }

        Ok(WalkEntry {
            full_path,
            relative_path,
            metadata,
            depth,
        })
    }
}

impl Iterator for Walker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.yielded_root {
            self.yielded_root = true;
            if let Some(metadata) = self.root_metadata.take() {
                return Some(Ok(WalkEntry {
                    full_path: self.root.clone(),
                    relative_path: PathBuf::new(),
                    metadata,
                    depth: 0,
                }));
            }
        }

        if let Some(error) = self.pending_error.take() {
            return Some(Err(error));
        }

        loop {
            let state = self.stack.last_mut()?;
            let Some(name) = state.next_name() else {
                self.stack.pop();
                continue;
            };

            let full_path = state.fs_path.join(&name);
            let relative_path = state.relative_prefix.join(&name);
            let depth = state.depth + 1;

            // A failed entry is reported and skipped; its siblings are still walked.
            return Some(self.prepare_entry(full_path, relative_path, depth));
        }
    }
}

struct DirectoryState {
    fs_path: PathBuf,
    relative_prefix: PathBuf,
    entries: std::vec::IntoIter<OsString>,
    depth: usize,
}

impl DirectoryState {
    fn new(fs_path: PathBuf, relative_prefix: PathBuf, depth: usize) -> Result<Self, WalkError> {
        let read_dir =
            fs::read_dir(&fs_path).map_err(|error| WalkError::read_dir(fs_path.clone(), error))?;
        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|error| WalkError::read_dir_entry(fs_path.clone(), error))?;
            entries.push(entry.file_name());
        }
        entries.sort();

        Ok(Self {
            fs_path,
            relative_prefix,
            entries: entries.into_iter(),
            depth,
        })
    }

    fn next_name(&mut self) -> Option<OsString> {
        self.entries.next()
    }
}

fn absolutize(path: PathBuf) -> Result<PathBuf, WalkError> {
    if path.is_absolute() {
        Ok(path)
    } else {
        let cwd = env::current_dir().map_err(|error| WalkError::current_dir(path.clone(), error))?;
        Ok(cwd.join(path))
    }
}
