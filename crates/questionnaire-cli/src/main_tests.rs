// crates/questionnaire-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Tests
// Description: Unit tests for argument parsing and config commands.
// Purpose: Ensure the dispatcher maps inputs to the right exit codes.
// Dependencies: questionnaire-cli main helpers
// ============================================================================

//! ## Overview
//! Validates clap wiring and the `config` subcommands end to end.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;

use clap::CommandFactory;
use clap::Parser;
use tempfile::NamedTempFile;

use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::run;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn config_check_parses_path() {
    let cli = parse(&["questionnaire", "config", "check", "--config", "custom.toml"]);
    match cli.command {
        Some(Commands::Config {
            command: ConfigCommand::Check(check),
        }) => {
            assert_eq!(check.config.unwrap().to_string_lossy(), "custom.toml");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn serve_parses_without_config() {
    let cli = parse(&["questionnaire", "serve"]);
    assert!(matches!(cli.command, Some(Commands::Serve(ref serve)) if serve.config.is_none()));
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["questionnaire", "migrate"]).is_err());
}

#[tokio::test]
async fn config_check_accepts_valid_file() {
    let file = config_file("[server]\nbind = \"127.0.0.1:9090\"\n");
    let path = file.path().to_string_lossy().to_string();
    let cli = parse(&["questionnaire", "config", "check", "--config", &path]);
    assert_eq!(run(cli).await.unwrap(), ExitCode::SUCCESS);
}

#[tokio::test]
async fn config_check_reports_invalid_file() {
    let file = config_file("[server]\nmax_body_bytes = 0\n");
    let path = file.path().to_string_lossy().to_string();
    let cli = parse(&["questionnaire", "config", "check", "--config", &path]);
    let err = run(cli).await.unwrap_err();
    assert!(err.to_string().contains("failed to load config"));
    assert!(err.to_string().contains("max_body_bytes"));
}

#[tokio::test]
async fn serve_fails_fast_on_invalid_config() {
    let file = config_file("[server]\nbind = \"not-an-address\"\n");
    let path = file.path().to_string_lossy().to_string();
    let cli = parse(&["questionnaire", "serve", "--config", &path]);
    assert!(run(cli).await.is_err());
}

#[tokio::test]
async fn missing_command_is_failure() {
    let cli = parse(&["questionnaire"]);
    assert_eq!(run(cli).await.unwrap(), ExitCode::FAILURE);
}
