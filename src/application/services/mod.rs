//! Application services
//!
//! Concrete service implementations that sequence native calls.
//! Services depend on the `VspeApi` boundary trait
//! but are themselves concrete structs, not traits.

mod ports;
mod session;

pub use ports::{PortService, ReinitOutcome, StartOutcome, StopAllOutcome, StopOutcome};
pub use session::Session;
