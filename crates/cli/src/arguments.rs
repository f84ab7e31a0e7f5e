//! Command definition and argument parsing.

use clap::{Arg, ArgAction, Command, builder::OsStringValueParser, value_parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Program name used when the argument list is empty.
pub(crate) const PROGRAM_NAME: &str = "snaprestore";

/// Arguments after parsing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ParsedArgs {
    pub(crate) show_help: bool,
    pub(crate) show_version: bool,
    pub(crate) list_snapshots: bool,
    pub(crate) snapshot_dir: Option<PathBuf>,
    pub(crate) snapshot: Option<String>,
    pub(crate) live: Option<PathBuf>,
    pub(crate) copy_only: bool,
    pub(crate) link_only: bool,
    pub(crate) dry_run: bool,
    pub(crate) report: Option<PathBuf>,
    pub(crate) jobs: Option<usize>,
    pub(crate) workers: Option<usize>,
    pub(crate) depth: Option<usize>,
    pub(crate) dir_depth: Option<usize>,
    pub(crate) segment_limit: Option<usize>,
    pub(crate) dir_timeout: Option<u64>,
    pub(crate) modify_window: Option<u64>,
    pub(crate) verbose: u8,
}

/// Builds the `clap` command used for parsing.
fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-snapshots")
                .long("list-snapshots")
                .action(ArgAction::SetTrue),
        )
        .arg(path_arg("snapshot-dir"))
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .value_name("NAME")
                .action(ArgAction::Set),
        )
        .arg(path_arg("live"))
        .arg(
            Arg::new("copy-only")
                .long("copy-only")
                .action(ArgAction::SetTrue)
                .conflicts_with("link-only"),
        )
        .arg(
            Arg::new("link-only")
                .long("link-only")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .short('n')
                .action(ArgAction::SetTrue),
        )
        .arg(path_arg("report"))
        .arg(count_arg("jobs").short('j'))
        .arg(count_arg("workers"))
        .arg(depth_arg("depth"))
        .arg(depth_arg("dir-depth"))
        .arg(count_arg("segment-limit"))
        .arg(seconds_arg("dir-timeout"))
        .arg(seconds_arg("modify-window"))
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
}

fn path_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("PATH")
        .value_parser(OsStringValueParser::new())
        .action(ArgAction::Set)
}

fn count_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("N")
        .value_parser(value_parser!(u64).range(1..))
        .action(ArgAction::Set)
}

fn depth_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("N")
        .value_parser(value_parser!(u64))
        .action(ArgAction::Set)
}

fn seconds_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("SECONDS")
        .value_parser(value_parser!(u64))
        .action(ArgAction::Set)
}

fn take_path(matches: &mut clap::ArgMatches, name: &str) -> Option<PathBuf> {
    matches.remove_one::<OsString>(name).map(PathBuf::from)
}

fn take_usize(matches: &mut clap::ArgMatches, name: &str) -> Option<usize> {
    matches
        .remove_one::<u64>(name)
        .map(|value| usize::try_from(value).unwrap_or(usize::MAX))
}

/// Parses command-line arguments into a [`ParsedArgs`] structure.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;

    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        list_snapshots: matches.get_flag("list-snapshots"),
        copy_only: matches.get_flag("copy-only"),
        link_only: matches.get_flag("link-only"),
        dry_run: matches.get_flag("dry-run"),
        verbose: matches.get_count("verbose"),
        snapshot_dir: take_path(&mut matches, "snapshot-dir"),
        snapshot: matches.remove_one::<String>("snapshot"),
        live: take_path(&mut matches, "live"),
        report: take_path(&mut matches, "report"),
        jobs: take_usize(&mut matches, "jobs"),
        workers: take_usize(&mut matches, "workers"),
        depth: take_usize(&mut matches, "depth"),
        dir_depth: take_usize(&mut matches, "dir-depth"),
        segment_limit: take_usize(&mut matches, "segment-limit"),
        dir_timeout: matches.remove_one::<u64>("dir-timeout"),
        modify_window: matches.remove_one::<u64>("modify-window"),
    })
}
