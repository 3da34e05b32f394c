//! Application layer: sessions and use cases
//!
//! This layer sequences native calls and depends only on the `VspeApi` boundary trait.

pub mod error;
pub mod error_ext;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::InfraResultExt;
