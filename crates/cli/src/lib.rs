#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the thin command-line front-end of `snaprestore`. A `clap`
//! command definition recognises the supported switches, the parsed values
//! are turned into a [`recovery::RecoveryConfig`] and the run is delegated
//! to [`recovery::run`].
//!
//! # Design
//!
//! [`run`] accepts an iterator of arguments together with handles for
//! standard output and error and returns the process exit code. The summary,
//! snapshot listings, help and version text go to standard output;
//! diagnostics go to standard error. Tracing events are written to the
//! process's standard error by the subscriber installed from `-v`.
//!
//! # Invariants
//!
//! - `run` never panics; failures surface as non-zero exit codes.
//! - Usage errors exit with `1` before any filesystem access.
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = cli::run(["snaprestore", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, 0);
//! assert!(stdout.starts_with(b"snaprestore "));
//! assert!(stderr.is_empty());
//! ```

mod arguments;
mod help;

use arguments::{ParsedArgs, parse_args};
use engine::{CopySettings, ScanScope};
use logging::VerbosityConfig;
use recovery::{
    ExitCode, HasExitCode, Mode, RecoveryConfig, RecoveryError, SnapshotId, list_snapshots,
};
use std::ffi::OsString;
use std::io::Write;
use std::time::{Duration, SystemTime};

/// Runs the CLI using the provided argument iterator and output handles.
///
/// Returns the process exit code.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    match parse_args(arguments) {
        Ok(parsed) => execute(parsed, stdout, stderr).as_i32(),
        Err(error) => {
            let _ = write!(stderr, "{error}");
            ExitCode::Syntax.as_i32()
        }
    }
}

/// Converts a status returned by [`run`] into a process exit code.
///
/// Values outside `0..=255` become 255.
#[must_use]
pub fn exit_code_from(status: i32) -> std::process::ExitCode {
    std::process::ExitCode::from(u8::try_from(status).unwrap_or(u8::MAX))
}

fn execute<Out, Err>(parsed: ParsedArgs, stdout: &mut Out, stderr: &mut Err) -> ExitCode
where
    Out: Write,
    Err: Write,
{
    if parsed.show_help {
        return emit(stdout, &help::render_help());
    }
    if parsed.show_version {
        return emit(stdout, &help::render_version());
    }

    logging::init_tracing(&VerbosityConfig::from_verbose_level(parsed.verbose));

    let result = if parsed.list_snapshots {
        list(&parsed, stdout)
    } else {
        restore(parsed, stdout, stderr)
    };
    result.unwrap_or_else(|error| {
        let _ = writeln!(stderr, "snaprestore: {error}");
        error.exit_code()
    })
}

fn emit<Out: Write>(stdout: &mut Out, text: &str) -> ExitCode {
    if stdout.write_all(text.as_bytes()).is_err() {
        return ExitCode::PartialRestore;
    }
    ExitCode::Ok
}

fn list<Out: Write>(parsed: &ParsedArgs, stdout: &mut Out) -> Result<ExitCode, RecoveryError> {
    let snapshot_dir = parsed.snapshot_dir.as_deref().ok_or_else(|| {
        RecoveryError::Config("--list-snapshots requires --snapshot-dir".to_owned())
    })?;
    for info in list_snapshots(snapshot_dir)? {
        let modified = info
            .modified
            .and_then(|time| time.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map_or_else(|| "-".to_owned(), |since| since.as_secs().to_string());
        let _ = writeln!(stdout, "{}\t{modified}\t{}", info.id, info.path.display());
    }
    Ok(ExitCode::Ok)
}

fn build_config(parsed: ParsedArgs) -> Result<RecoveryConfig, RecoveryError> {
    let mode = if parsed.copy_only {
        Mode::CopyOnly
    } else if parsed.link_only {
        Mode::LinkOnly
    } else {
        Mode::Full
    };

    let mut scope = ScanScope::new().with_segment_limit(parsed.segment_limit);
    if let Some(depth) = parsed.depth {
        scope = scope.with_max_depth(depth);
    }
    if let Some(depth) = parsed.dir_depth {
        scope = scope.with_directory_depth(depth);
    }

    let defaults = CopySettings::new();
    let copy = defaults
        .with_entry_parallelism(parsed.jobs.unwrap_or(defaults.entry_parallelism()))
        .with_worker_cap(parsed.workers.unwrap_or(defaults.worker_cap()))
        .with_directory_timeout(parsed.dir_timeout.map(Duration::from_secs));

    let mut builder = RecoveryConfig::builder()
        .mode(mode)
        .dry_run(parsed.dry_run)
        .scope(scope)
        .copy_settings(copy)
        .modify_window(Duration::from_secs(parsed.modify_window.unwrap_or(0)));
    if let Some(dir) = parsed.snapshot_dir {
        builder = builder.snapshot_dir(dir);
    }
    if let Some(live) = parsed.live {
        builder = builder.live_root(live);
    }
    if let Some(name) = parsed.snapshot {
        builder = builder.snapshot(SnapshotId::new(name)?);
    }
    if let Some(report) = parsed.report {
        builder = builder.report_path(report);
    }
    builder.build()
}

fn restore<Out, Err>(
    parsed: ParsedArgs,
    stdout: &mut Out,
    stderr: &mut Err,
) -> Result<ExitCode, RecoveryError>
where
    Out: Write,
    Err: Write,
{
    let config = build_config(parsed)?;
    let outcome = recovery::run(&config)?;

    if outcome.is_dry_run() {
        let _ = writeln!(stdout, "dry run: no changes were made");
    }
    let _ = writeln!(stdout, "snapshot: {}", outcome.snapshot());
    let _ = writeln!(stdout, "{}", outcome.summary());

    let mut code = outcome.exit_code();
    if let Some(path) = config.report_path()
        && let Err(error) = outcome.report().write_to_path(path)
    {
        let _ = writeln!(stderr, "snaprestore: {error}");
        if code.is_success() {
            code = error.exit_code();
        }
    }
    if !code.is_success() {
        let _ = writeln!(stderr, "snaprestore: {}", code.description());
    }
    Ok(code)
}
