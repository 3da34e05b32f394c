//! Infrastructure layer: native bindings and DI container
//!
//! This layer implements the native-library boundary trait and wires up services.

pub mod di;
pub mod encoding;
pub mod error;
pub mod native;
pub mod traits;

pub use encoding::TextEncoding;
pub use error::{InfraError, InfraResult};
pub use native::NativeVspe;
pub use traits::VspeApi;
