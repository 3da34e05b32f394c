//! Process exit codes
//!
//! Session outcomes use small signed codes so callers can tell a no-op (0)
//! from a failed primary call (-1) from a failed emulation toggle (-2).
//! Failures before any session starts use BSD sysexits.h values.

/// Successful termination, including "already exists" / "not found" no-ops
pub const OK: i32 = 0;

/// Primary native call failed (activation, create, destroy, reinit, load/save)
pub const FAILED: i32 = -1;

/// Secondary step failed (initialization, emulation start/stop)
pub const SECONDARY_FAILED: i32 = -2;

/// No or unrecognized command
pub const UNKNOWN_COMMAND: i32 = -10;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Service unavailable (native library cannot be loaded)
pub const UNAVAILABLE: i32 = 69;

/// Configuration error
pub const CONFIG: i32 = 78;
