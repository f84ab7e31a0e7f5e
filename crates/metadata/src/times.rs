use crate::error::MetadataError;
use filetime::{FileTime, set_file_times};
use std::fs;
use std::path::Path;

/// Returns the modification time recorded in `metadata`.
#[must_use]
pub fn modification_time(metadata: &fs::Metadata) -> FileTime {
    FileTime::from_last_modification_time(metadata)
}

/// Applies the access and modification times from `source` to `destination`.
///
/// Links are followed; callers only pass materialized files and directories.
pub fn copy_mtime(source: &fs::Metadata, destination: &Path) -> Result<(), MetadataError> {
    let accessed = FileTime::from_last_access_time(source);
    let modified = FileTime::from_last_modification_time(source);
    set_file_times(destination, accessed, modified)
        .map_err(|error| MetadataError::new("preserve timestamps", destination, error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn modification_time_is_transferred() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("source.bin");
        let dest = temp.path().join("dest.bin");
        fs::write(&source, b"payload").expect("write source");
        fs::write(&dest, b"payload").expect("write dest");

        let atime = FileTime::from_unix_time(1_700_000_000, 111_000_000);
        let mtime = FileTime::from_unix_time(1_700_000_100, 222_000_000);
        set_file_times(&source, atime, mtime).expect("set source times");

        let metadata = fs::metadata(&source).expect("source metadata");
        copy_mtime(&metadata, &dest).expect("copy mtime");

        let dest_meta = fs::metadata(&dest).expect("dest metadata");
        assert_eq!(modification_time(&dest_meta), mtime);
    }

    #[test]
    fn missing_destination_reports_action() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("source.bin");
        fs::write(&source, b"payload").expect("write source");
        let metadata = fs::metadata(&source).expect("source metadata");

        let error = copy_mtime(&metadata, &temp.path().join("absent")).expect_err("must fail");
        assert_eq!(error.action(), "preserve timestamps");
    }
}
