//! `haystack` command-line front end.
//!
//! Two modes:
//! - **Shell mode**: `haystack [flags] PATH [--body JSON]` runs one request
//! - **Pipe mode**: `echo "/read {...}" | haystack` runs one request per line
//!
//! Responses print as JSON tables on stdout; logs go to stderr and are
//! controlled by `HAYSTACK_LOG` (default `warn`).

mod commands;
mod format;
mod parse;
mod pipe;

use std::path::{Path, PathBuf};
use std::process;

use haystack_engine::{Database, ServerConfig, CONFIG_FILE_NAME};
use haystack_executor::Executor;
use tracing::info;

use commands::build_cli;
use format::{format_error, format_output, OutputMode};
use parse::parse_body;

fn main() {
    init_logging();
    let matches = build_cli().get_matches();

    if matches.get_flag("init") {
        process::exit(run_init(&matches));
    }

    let mode = if matches.get_flag("human") {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    let executor = match open_executor(&matches) {
        Ok(executor) => executor,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let exit_code = match matches.get_one::<String>("path") {
        Some(path) => run_shell_mode(&executor, path, &matches, mode),
        None => pipe::run_pipe(&executor, mode),
    };
    process::exit(exit_code);
}

fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("HAYSTACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn config_path(matches: &clap::ArgMatches) -> PathBuf {
    matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

fn run_init(matches: &clap::ArgMatches) -> i32 {
    let path = config_path(matches);
    match ServerConfig::write_default_if_missing(&path) {
        Ok(()) => {
            println!("{}", path.display());
            0
        }
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    }
}

/// Explicit `--config` must exist; the default file is optional.
fn load_config(matches: &clap::ArgMatches) -> Result<ServerConfig, String> {
    let path = config_path(matches);
    let explicit = matches.contains_id("config");
    let mut config = if explicit || Path::new(&path).exists() {
        ServerConfig::from_file(&path).map_err(|e| e.to_string())?
    } else {
        ServerConfig::default()
    };
    if let Some(seed) = matches.get_one::<String>("seed") {
        config.seed = Some(PathBuf::from(seed));
    }
    Ok(config)
}

fn open_executor(matches: &clap::ArgMatches) -> Result<Executor, String> {
    let config = load_config(matches)?;
    let db = Database::open(config).map_err(|e| format!("Failed to open database: {}", e))?;
    info!(entities = db.store().len(), "Ready");
    Ok(Executor::new(db))
}

fn read_body(matches: &clap::ArgMatches) -> Result<String, String> {
    if let Some(body) = matches.get_one::<String>("body") {
        return Ok(body.clone());
    }
    match matches.get_one::<String>("body-file") {
        Some(file) => std::fs::read_to_string(file)
            .map_err(|e| format!("Failed to read body file '{}': {}", file, e)),
        None => Ok(String::new()),
    }
}

fn run_shell_mode(
    executor: &Executor,
    path: &str,
    matches: &clap::ArgMatches,
    mode: OutputMode,
) -> i32 {
    let req = match read_body(matches).and_then(|text| parse_body(&text)) {
        Ok(req) => req,
        Err(e) => {
            eprintln!("(error) {}", e);
            return 1;
        }
    };
    match executor.execute_path(path, &req) {
        Ok(table) => {
            println!("{}", format_output(&table, mode));
            0
        }
        Err(e) => {
            println!("{}", format_error(&e, mode));
            1
        }
    }
}
