//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Create, remove and list virtual COM ports via the VSPE emulator library
#[derive(Parser, Debug)]
#[command(name = "vspectl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Path to the VSPE native library
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub library: Option<PathBuf>,

    /// Activation key (default: empty, free edition)
    #[arg(short, long, global = true)]
    pub key: Option<String>,

    /// Config file (default: $XDG_CONFIG_HOME/vspectl/vspectl.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a connector on a COM port and start emulation
    Start {
        /// COM port number
        #[arg(value_parser = clap::value_parser!(i32).range(0..))]
        com_port: i32,
    },

    /// Remove the device on a COM port
    Stop {
        /// COM port number
        #[arg(value_parser = clap::value_parser!(i32).range(0..))]
        com_port: i32,
    },

    /// Remove all devices and stop emulation
    #[command(name = "stopall")]
    StopAll,

    /// List devices
    Show,

    /// Reinitialize the device on a COM port
    Reinit {
        /// COM port number
        #[arg(value_parser = clap::value_parser!(i32).range(0..))]
        com_port: i32,
    },

    /// Load an emulator configuration file
    Load {
        /// Configuration file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Save devices to an emulator configuration file
    Save {
        /// Configuration file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show native library version
    Version,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config path
    Path,
}
