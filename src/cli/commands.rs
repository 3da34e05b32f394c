//! Command dispatch: resolves the subcommand, runs it and reports the outcome

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{
    PortService, ReinitOutcome, StartOutcome, StopAllOutcome, StopOutcome,
};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{ComPort, ListingEntry};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;

/// Line printed when the emulator has no devices.
pub const NO_DEVICES: &str = "no devices";

/// Run the parsed command line and return the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    let Some(command) = &cli.command else {
        return Err(CliError::UnknownCommand);
    };

    if let Commands::Completion { shell } = command {
        print_completions(*shell);
        return Ok(exitcode::OK);
    }

    let settings = Settings::load(cli.config.as_deref())?
        .with_overrides(cli.library.as_deref(), cli.key.as_deref());
    debug!("settings: {:?}", settings.library_path);

    if let Commands::Config { command } = command {
        return config_command(command, &settings, cli.config.as_deref());
    }

    let container = ServiceContainer::new(settings)?;
    run(command, &container.port_service())
}

/// Dispatch a command against an already wired service.
pub fn run(command: &Commands, service: &PortService) -> CliResult<i32> {
    let opens_session = !matches!(
        command,
        Commands::Version | Commands::Completion { .. } | Commands::Config { .. }
    );
    if opens_session {
        output::header(&format!("VSPE API version: {}", service.version()));
    }

    match command {
        Commands::Start { com_port } => _start(service, port(*com_port)?)?,
        Commands::Stop { com_port } => _stop(service, port(*com_port)?)?,
        Commands::StopAll => _stop_all(service)?,
        Commands::Show => _show(service)?,
        Commands::Reinit { com_port } => _reinit(service, port(*com_port)?)?,
        Commands::Load { file } => _load(service, file)?,
        Commands::Save { file } => _save(service, file)?,
        Commands::Version => output::info(&service.version()),
        Commands::Completion { .. } | Commands::Config { .. } => {
            return Err(CliError::UnknownCommand);
        }
    }
    Ok(exitcode::OK)
}

fn port(number: i32) -> CliResult<ComPort> {
    ComPort::new(number).map_err(|e| CliError::from(ApplicationError::from(e)))
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn config_command(
    command: &ConfigCommands,
    settings: &Settings,
    explicit: Option<&Path>,
) -> CliResult<i32> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => match explicit.map(Path::to_path_buf).or_else(global_config_path) {
            Some(path) => {
                let state = if path.exists() { "" } else { " (not found)" };
                output::info(&format!("{}{}", path.display(), state));
            }
            None => output::warning("no config directory on this platform"),
        },
    }
    Ok(exitcode::OK)
}

#[instrument(skip(service))]
fn _start(service: &PortService, port: ComPort) -> CliResult<()> {
    match service.start(port)? {
        StartOutcome::AlreadyExists(id) => {
            output::info(&format!("device already exists on {port} (id {id})"))
        }
        StartOutcome::Created(id) => {
            output::success(&format!("device created on {port} (id {id})"));
            output::detail("emulation started");
        }
    }
    Ok(())
}

#[instrument(skip(service))]
fn _stop(service: &PortService, port: ComPort) -> CliResult<()> {
    match service.stop(port)? {
        StopOutcome::NotFound => output::info(&format!("device does not exist on {port}")),
        StopOutcome::Destroyed {
            id,
            emulation_stopped,
        } => {
            output::success(&format!("device removed from {port} (id {id})"));
            if emulation_stopped {
                output::detail("emulation stopped");
            }
        }
    }
    Ok(())
}

#[instrument(skip(service))]
fn _stop_all(service: &PortService) -> CliResult<()> {
    match service.stop_all()? {
        StopAllOutcome::NoDevices => output::info(NO_DEVICES),
        StopAllOutcome::Destroyed { count } => {
            output::success(&format!("{count} devices removed"));
            output::detail("emulation stopped");
        }
    }
    Ok(())
}

#[instrument(skip(service))]
fn _show(service: &PortService) -> CliResult<()> {
    let entries = service.show()?;
    print_listing(&entries);
    Ok(())
}

/// Print one line per device, or a single "no devices" line.
pub fn print_listing(entries: &[ListingEntry]) {
    if entries.is_empty() {
        output::info(NO_DEVICES);
        return;
    }
    for entry in entries {
        if entry.info.is_some() {
            output::info(entry);
        } else {
            output::warning(entry);
        }
    }
}

#[instrument(skip(service))]
fn _reinit(service: &PortService, port: ComPort) -> CliResult<()> {
    match service.reinit(port)? {
        ReinitOutcome::NotFound => output::info(&format!("device does not exist on {port}")),
        ReinitOutcome::Reinitialized(id) => {
            output::success(&format!("device reinitialized on {port} (id {id})"))
        }
    }
    Ok(())
}

#[instrument(skip(service))]
fn _load(service: &PortService, file: &Path) -> CliResult<()> {
    service.load_configuration(file)?;
    output::success(&format!("configuration loaded: {}", file.display()));
    Ok(())
}

#[instrument(skip(service))]
fn _save(service: &PortService, file: &Path) -> CliResult<()> {
    service.save_configuration(file)?;
    output::success(&format!("configuration saved: {}", file.display()));
    Ok(())
}
