//! Clap command definition.

use clap::{Arg, ArgAction, Command};

/// Build the CLI.
///
/// With a `PATH` argument one request is executed; without one, request
/// lines are read from stdin.
pub fn build_cli() -> Command {
    Command::new("haystack")
        .about("Haystack operations over a local entity database")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Config file (default: ./haystack.toml if present)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("JSON table of entities to load, overrides the config"),
        )
        .arg(
            Arg::new("init")
                .long("init")
                .help("Write a default config file and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("human")
                .long("human")
                .help("Print tables as text grids instead of JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("body")
                .long("body")
                .short('b')
                .help("Request table as JSON")
                .conflicts_with("body-file"),
        )
        .arg(
            Arg::new("body-file")
                .long("body-file")
                .help("File holding the request table as JSON"),
        )
        .arg(
            Arg::new("path")
                .help("Operation path, e.g. /read or hisRead")
                .index(1),
        )
}
