//! vspectl: command-line control for the VSPE virtual serial port emulator
//!
//! Layers, innermost first:
//! - [`domain`]: device ids, COM ports, device info
//! - [`infrastructure`]: the [`VspeApi`](infrastructure::VspeApi) boundary and its native binding
//! - [`application`]: session bracketing and port operations
//! - [`cli`]: argument parsing, dispatch, output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
