use std::path::Path;

use clap::Parser;
use dealertag::cli::app::{Cli, Command};

#[test]
fn parses_clean_with_input_and_pretty_flag() {
    let cli = Cli::parse_from(["dealertag", "clean", "payload.json", "--pretty"]);

    match cli.command {
        Command::Clean(args) => {
            assert!(args.pretty);
            assert_eq!(args.input.as_deref(), Some(Path::new("payload.json")));
        }
        other => panic!("expected clean command, got {other:?}"),
    }
}

#[test]
fn clean_reads_stdin_by_default() {
    let cli = Cli::parse_from(["dealertag", "clean"]);

    match cli.command {
        Command::Clean(args) => {
            assert!(!args.pretty);
            assert!(args.input.is_none());
        }
        other => panic!("expected clean command, got {other:?}"),
    }
}

#[test]
fn parses_replay_expectation() {
    let cli = Cli::parse_from([
        "dealertag",
        "replay",
        "scenarios/landing.json",
        "--expect-calls",
        "3",
    ]);

    match cli.command {
        Command::Replay(args) => {
            assert_eq!(args.scenario, Path::new("scenarios/landing.json"));
            assert_eq!(args.expect_calls, Some(3));
        }
        other => panic!("expected replay command, got {other:?}"),
    }
}

#[test]
fn parses_schema_without_arguments() {
    let cli = Cli::parse_from(["dealertag", "schema"]);
    assert!(matches!(cli.command, Command::Schema(_)));
}

#[test]
fn replay_requires_a_scenario() {
    let error = Cli::try_parse_from(["dealertag", "replay"]).expect_err("scenario is required");
    assert_eq!(
        error.kind(),
        clap::error::ErrorKind::MissingRequiredArgument
    );
}

#[test]
fn replay_accepts_a_config_override() {
    let cli = Cli::parse_from([
        "dealertag",
        "replay",
        "landing.json",
        "--config",
        "tealium-config.json",
    ]);

    match cli.command {
        Command::Replay(args) => {
            assert_eq!(args.config.as_deref(), Some(Path::new("tealium-config.json")));
            assert!(args.expect_calls.is_none());
        }
        other => panic!("expected replay command, got {other:?}"),
    }
}
