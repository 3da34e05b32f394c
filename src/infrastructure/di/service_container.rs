//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::PortService;
use crate::config::Settings;
use crate::infrastructure::traits::VspeApi;
use crate::infrastructure::{InfraResult, NativeVspe};

/// Container holding the native handle and the settings it was loaded with.
///
/// Built once by the entry point; the library stays loaded for as long as
/// the container lives.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Native library binding
    pub api: Arc<dyn VspeApi>,
}

impl ServiceContainer {
    /// Load the native library named in `settings`.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let api = NativeVspe::load(&settings.library_path, settings.encoding)?;
        Ok(Self::with_deps(settings, Arc::new(api)))
    }

    /// Create a service container with a custom binding (for testing).
    pub fn with_deps(settings: Settings, api: Arc<dyn VspeApi>) -> Self {
        Self {
            settings: Arc::new(settings),
            api,
        }
    }

    pub fn port_service(&self) -> PortService {
        PortService::new(self.api.clone(), self.settings.clone())
    }
}
