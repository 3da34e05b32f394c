//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent values the emulator can never accept.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid COM port number: {0}")]
    InvalidComPort(i32),

    #[error("invalid device id: {0}")]
    InvalidDeviceId(i32),
}
