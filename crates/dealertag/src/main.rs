#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use dealertag::cli::app::{Cli, Command};
use dealertag::cli::commands;
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_EXPECTATION_FAILURE: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

const LOG_ENV: &str = "DEALERTAG_LOG";

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    init_tracing();

    let command_name = command_name(&cli.command);
    let progress = reports_progress(&cli.command);
    if progress {
        println!("dealertag: starting `{command_name}`");
    }

    match execute(cli) {
        Ok(()) => {
            if progress {
                println!("dealertag: completed `{command_name}` (exit_code={EXIT_SUCCESS})");
            }
            EXIT_SUCCESS
        }
        Err(error) => {
            let exit_code = classify_runtime_error(&error);
            eprintln!("dealertag: failed `{command_name}` (exit_code={exit_code})");
            eprintln!("{error:#}");
            exit_code
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Clean(args) => commands::clean::run(&args),
        Command::Replay(args) => commands::replay::run(&args),
        Command::Schema(args) => commands::schema::run(&args),
    }
}

fn classify_runtime_error(error: &anyhow::Error) -> i32 {
    if error
        .downcast_ref::<commands::replay::ReplayExpectationFailure>()
        .is_some()
    {
        EXIT_EXPECTATION_FAILURE
    } else {
        EXIT_RUNTIME_FAILURE
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = error.print();
            EXIT_USAGE_ERROR
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Clean(_) => "clean",
        Command::Replay(_) => "replay",
        Command::Schema(_) => "schema",
    }
}

/// `clean` and `schema` print machine-readable JSON only.
fn reports_progress(command: &Command) -> bool {
    matches!(command, Command::Replay(_))
}
