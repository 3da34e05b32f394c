//! Error conversion helpers for native-boundary calls
//!
//! Provides extension traits for cleaner error handling with call context.

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::InfraResult;

/// Extension trait for converting `InfraResult` to `ApplicationResult` with context.
pub trait InfraResultExt<T> {
    /// Add call context to a marshaling error.
    ///
    /// # Example
    /// ```ignore
    /// api.create_device(&DeviceKind::Connector, &init)
    ///     .with_call_context("create device on COM5")?;
    /// ```
    fn with_call_context(self, context: &str) -> ApplicationResult<T>;
}

impl<T> InfraResultExt<T> for InfraResult<T> {
    fn with_call_context(self, context: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: context.to_string(),
            source: Box::new(e),
        })
    }
}
