//! Tests for argument parsing, dispatch and exit codes

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tempfile::TempDir;

use vspectl::cli::commands::{execute_command, run};
use vspectl::cli::{Cli, CliError, Commands};
use vspectl::config::Settings;
use vspectl::exitcode;
use vspectl::infrastructure::di::ServiceContainer;
use vspectl::infrastructure::TextEncoding;
use vspectl::util::testing::{Call, FakeVspe};

fn container(fake: &Arc<FakeVspe>) -> ServiceContainer {
    let settings = Settings {
        library_path: PathBuf::from("fake-vspe"),
        activation_key: String::new(),
        encoding: TextEncoding::Utf8,
    };
    ServiceContainer::with_deps(settings, fake.clone())
}

// ============================================================
// Parsing
// ============================================================

#[test]
fn given_start_without_port_when_parsing_then_usage_error() {
    let result = Cli::try_parse_from(["vspectl", "start"]);
    assert!(result.is_err());
}

#[test]
fn given_non_numeric_port_when_parsing_then_usage_error() {
    assert!(Cli::try_parse_from(["vspectl", "stop", "COM5"]).is_err());
}

#[test]
fn given_negative_port_when_parsing_then_rejected_before_any_native_call() {
    let err = Cli::try_parse_from(["vspectl", "start", "--", "-5"]).unwrap_err();

    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn given_start_with_port_when_parsing_then_command_carries_port() {
    let cli = Cli::try_parse_from(["vspectl", "start", "5"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Start { com_port: 5 })));
}

#[test]
fn given_stopall_when_parsing_then_stop_all_command() {
    let cli = Cli::try_parse_from(["vspectl", "stopall"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::StopAll)));
}

#[test]
fn given_global_flags_after_subcommand_when_parsing_then_accepted() {
    let cli =
        Cli::try_parse_from(["vspectl", "show", "--library", "/opt/VSPE_API.dll", "-dd"]).unwrap();
    assert_eq!(cli.library, Some(PathBuf::from("/opt/VSPE_API.dll")));
    assert_eq!(cli.debug, 2);
}

// ============================================================
// Dispatch
// ============================================================

#[test]
fn given_start_when_run_then_ok_and_device_created() {
    // Arrange
    let fake = Arc::new(FakeVspe::new());
    let container = container(&fake);

    // Act
    let code = run(&Commands::Start { com_port: 3 }, &container.port_service()).unwrap();

    // Assert
    assert_eq!(code, exitcode::OK);
    assert_eq!(fake.init_strings(), vec!["3;0".to_string()]);
}

#[test]
fn given_empty_emulator_when_run_show_then_ok() {
    let fake = Arc::new(FakeVspe::new());
    let container = container(&fake);

    let code = run(&Commands::Show, &container.port_service()).unwrap();

    assert_eq!(code, exitcode::OK);
    assert_eq!(fake.count_calls(|c| *c == Call::Release), 1);
}

#[test]
fn given_version_when_run_then_no_session() {
    let fake = Arc::new(FakeVspe::new());
    let container = container(&fake);

    run(&Commands::Version, &container.port_service()).unwrap();

    assert_eq!(fake.calls(), vec![Call::VersionInformation]);
}

#[test]
fn given_no_command_when_execute_then_unknown_command_code() {
    let cli = Cli::try_parse_from(["vspectl"]).unwrap();

    let err = execute_command(&cli).unwrap_err();

    assert!(matches!(err, CliError::UnknownCommand));
    assert_eq!(err.exit_code(), exitcode::UNKNOWN_COMMAND);
}

#[test]
fn given_missing_library_when_execute_then_unavailable() {
    // Arrange: isolated config so no global file interferes
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("vspectl.toml");
    std::fs::write(&config, "activation_key = \"\"\n").unwrap();
    let missing = temp.path().join("no-such-vspe-library");
    let cli = Cli::try_parse_from([
        "vspectl",
        "show",
        "--config",
        config.to_str().unwrap(),
        "--library",
        missing.to_str().unwrap(),
    ])
    .unwrap();

    // Act
    let err = execute_command(&cli).unwrap_err();

    // Assert
    assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
    assert!(err.to_string().contains("no-such-vspe-library"));
}

#[test]
fn given_broken_config_when_execute_then_config_code() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("vspectl.toml");
    std::fs::write(&config, "encoding = [").unwrap();
    let cli =
        Cli::try_parse_from(["vspectl", "show", "--config", config.to_str().unwrap()]).unwrap();

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::CONFIG);
}

#[test]
fn given_config_subcommands_when_execute_then_ok_without_native_library() {
    // Arrange: library path points nowhere; config commands must not load it
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("vspectl.toml");
    std::fs::write(&config, "library_path = \"/nonexistent/libvspe_api.so\"\n").unwrap();

    for sub in ["show", "path"] {
        let cli =
            Cli::try_parse_from(["vspectl", "config", sub, "--config", config.to_str().unwrap()])
                .unwrap();

        // Act
        let code = execute_command(&cli).unwrap();

        // Assert
        assert_eq!(code, exitcode::OK, "config {sub}");
    }
}
