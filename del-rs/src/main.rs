use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use delete_core::config;
use delete_core::prelude::*;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

const LOG_FILTER_VAR: &str = "DEL_LOG";

fn main() -> ExitCode {
    init_tracing();

    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                exit(ExitStatusLike::Usage)
            } else {
                exit(ExitStatusLike::Ok)
            };
        }
    };

    let notifier = ConsoleNotifier::stderr();
    let action = match map_args_to_action(&matches) {
        Ok(action) => action,
        Err(err) => {
            notifier.notify_error(&format!("del: {err}"));
            return exit(ExitStatusLike::BadArgument);
        }
    };

    let settings = map_args_to_settings(&matches, Settings::from_env());
    debug!(?settings, "resolved settings");

    let mut session = match Session::open(&settings, &notifier) {
        Ok(session) => session,
        Err(err) => {
            error!("could not open trash: {err:?}");
            notifier.notify_error(&format!("del: {}", err.report()));
            return exit(ExitStatusLike::RuntimeError);
        }
    };

    let status = session.run(&action, &mut io::stdout().lock());
    if let Err(err) = session.close() {
        error!("closing catalog failed: {err:?}");
    }
    exit(status)
}

fn exit(status: ExitStatusLike) -> ExitCode {
    ExitCode::from(status.as_code())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn cli() -> Command {
    Command::new("del")
        .about("Simple command-line move-to-trash.")
        .version(env!("CARGO_PKG_VERSION"))
        .disable_version_flag(true)
        .args([
            // NOTE: arguments
            Arg::new("paths")
                .action(ArgAction::Append)
                .num_args(0..)
                .value_parser(value_parser!(String))
                .help("A file or folder path"),
            // NOTE: actions
            Arg::new("list")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .help("List objects and their original path"),
            Arg::new("empty")
                .long("empty")
                .action(ArgAction::SetTrue)
                .help("Empty the trash"),
            Arg::new("restore")
                .short('r')
                .long("restore")
                .action(ArgAction::SetTrue)
                .help("Restore one or more items"),
            // NOTE: options
            Arg::new("long")
                .long("long")
                .action(ArgAction::SetTrue)
                .help("With --list, also print when each item was trashed"),
            Arg::new("trash-dir")
                .long("trash-dir")
                .value_parser(value_parser!(PathBuf))
                .help("Holding-area directory (overrides TRASH_FOLDER)"),
            Arg::new("database")
                .long("database")
                .value_parser(value_parser!(PathBuf))
                .help("Catalog file (overrides TRASH_DATABASE)"),
            Arg::new("version")
                .short('v')
                .long("version")
                .action(ArgAction::Version)
                .help("Show the version and exit"),
        ])
        .group(
            ArgGroup::new("action")
                .args(["list", "empty", "restore"])
                .multiple(false),
        )
}

fn map_args_to_action(args: &ArgMatches) -> delete_core::Result<Action> {
    let kind = if args.get_flag("list") {
        CommandKind::List
    } else if args.get_flag("empty") {
        CommandKind::Empty
    } else if args.get_flag("restore") {
        CommandKind::Restore
    } else {
        CommandKind::Put
    };

    let paths = args
        .get_many::<String>("paths")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    Action::from_parts(kind, paths, args.get_flag("long"))
}

fn map_args_to_settings(args: &ArgMatches, mut settings: Settings) -> Settings {
    if let Some(holding) = args.get_one::<PathBuf>("trash-dir") {
        settings = settings.with_holding_area(holding);
        let database_set = args.get_one::<PathBuf>("database").is_some()
            || std::env::var_os(config::TRASH_DATABASE_VAR).is_some();
        if !database_set {
            settings = settings.with_catalog_path(config::default_catalog_path(holding));
        }
    }
    if let Some(catalog) = args.get_one::<PathBuf>("database") {
        settings = settings.with_catalog_path(catalog);
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        cli().try_get_matches_from(std::iter::once("del").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_default_verb_is_put() {
        let action = map_args_to_action(&parse(&["a.txt", "b"])).unwrap();
        assert_eq!(action, Action::Put(vec![PathBuf::from("a.txt"), PathBuf::from("b")]));
    }

    #[test]
    fn test_restore_and_list() {
        let action = map_args_to_action(&parse(&["-r", "report.1.txt"])).unwrap();
        assert_eq!(action, Action::Restore(vec!["report.1.txt".to_string()]));

        let action = map_args_to_action(&parse(&["--list", "--long"])).unwrap();
        assert_eq!(action, Action::List { long: true });
    }

    #[test]
    fn test_rejects_combined_actions_and_stray_paths() {
        assert!(cli().try_get_matches_from(["del", "--list", "--empty"]).is_err());
        assert!(map_args_to_action(&parse(&["--empty", "x"])).is_err());
        assert!(map_args_to_action(&parse(&[])).is_err());
    }

    #[test]
    fn test_database_flag_overrides_settings() {
        let settings = map_args_to_settings(
            &parse(&["--database", "/tmp/c.db", "x"]),
            Settings::new("/h/.Trash", "/h/.Trash.db"),
        );
        assert_eq!(settings, Settings::new("/h/.Trash", "/tmp/c.db"));
    }
}
