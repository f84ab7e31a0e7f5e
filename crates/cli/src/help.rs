/// Deterministic help text.
pub(crate) const HELP_TEXT: &str = concat!(
    "snaprestore ",
    env!("CARGO_PKG_VERSION"),
    "\n",
    "\n",
    "Restores a live share from a read-only snapshot. Missing or stale entries\n",
    "are first replaced by placeholder links into the snapshot, then the\n",
    "placeholders are materialized into real copies.\n",
    "\n",
    "Usage: snaprestore --snapshot-dir DIR --snapshot NAME --live DIR [OPTIONS]\n",
    "       snaprestore --snapshot-dir DIR --live DIR --copy-only [OPTIONS]\n",
    "       snaprestore --snapshot-dir DIR --list-snapshots\n",
    "\n",
    "Options:\n",
    "      --snapshot-dir=PATH  Directory holding the snapshots.\n",
    "      --snapshot=NAME      Snapshot to restore from.\n",
    "      --live=PATH          Live share to restore.\n",
    "      --link-only          Only place links; do not copy.\n",
    "      --copy-only          Only materialize existing links. Without\n",
    "                           --snapshot the snapshot is taken from them.\n",
    "  -n, --dry-run            Report what would change without changing it.\n",
    "      --report=PATH        Write a tab-delimited report to PATH.\n",
    "  -j, --jobs=N             Materialize up to N files at once (default 1).\n",
    "      --workers=N          Cap copy workers per directory (default 24).\n",
    "      --depth=N            Link files down to depth N (default 3).\n",
    "      --dir-depth=N        Link directories at exactly depth N\n",
    "                           (default: --depth).\n",
    "      --segment-limit=N    Skip paths with more than N components.\n",
    "      --dir-timeout=SECONDS  Deadline for each directory copy.\n",
    "      --modify-window=SECONDS  Tolerated modification-time skew.\n",
    "      --list-snapshots     List the snapshots in --snapshot-dir.\n",
    "  -v, --verbose            Increase diagnostics; repeat for more.\n",
    "  -h, --help               Show this help message and exit.\n",
    "  -V, --version            Output version information and exit.\n",
    "\n",
    "Exit status: 0 ok, 1 usage, 3 missing root or snapshot, 5 no placeholder\n",
    "to restore from, 23 some entries failed, 30 directory copies timed out.\n",
);

/// Renders the help text describing the supported options.
pub(crate) fn render_help() -> String {
    HELP_TEXT.to_owned()
}

/// Renders the version banner.
pub(crate) fn render_version() -> String {
    format!("snaprestore {}\n", env!("CARGO_PKG_VERSION"))
}
