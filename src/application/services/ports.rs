//! COM port management service
//!
//! Each public operation opens its own `Session`, runs a fixed sequence of
//! native calls and returns what happened. Nothing is cached between
//! operations: every lookup re-queries the library.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::services::Session;
use crate::application::{ApplicationError, ApplicationResult, InfraResultExt};
use crate::config::Settings;
use crate::domain::{ComPort, DeviceId, DeviceKind, ListingEntry};
use crate::infrastructure::traits::VspeApi;

/// Result of `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A device already serves the port; nothing was created.
    AlreadyExists(DeviceId),
    /// A new connector was created and emulation started.
    Created(DeviceId),
}

/// Result of `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No device serves the port.
    NotFound,
    /// The device was removed; emulation is stopped once no device is left.
    Destroyed {
        id: DeviceId,
        emulation_stopped: bool,
    },
}

/// Result of `reinit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReinitOutcome {
    NotFound,
    Reinitialized(DeviceId),
}

/// Result of `stop_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopAllOutcome {
    NoDevices,
    Destroyed { count: usize },
}

/// Service creating, removing and listing emulated COM ports.
pub struct PortService {
    api: Arc<dyn VspeApi>,
    settings: Arc<Settings>,
}

impl PortService {
    /// Create a new port service.
    pub fn new(api: Arc<dyn VspeApi>, settings: Arc<Settings>) -> Self {
        Self { api, settings }
    }

    /// Library version banner. Needs no session.
    pub fn version(&self) -> String {
        self.api.version_information()
    }

    fn session(&self) -> ApplicationResult<Session<'_>> {
        Session::open(self.api.as_ref(), &self.settings.activation_key)
    }

    /// Create a connector on `port` and start emulation.
    #[instrument(skip(self))]
    pub fn start(&self, port: ComPort) -> ApplicationResult<StartOutcome> {
        let session = self.session()?;
        let api = session.api();

        if let Some(id) = api.device_id_by_com_port(port) {
            debug!("{} already served by device {}", port, id);
            return Ok(StartOutcome::AlreadyExists(id));
        }

        let init_string = port.connector_init_string();
        let id = api
            .create_device(&DeviceKind::Connector, &init_string)
            .with_call_context(&format!("create device on {port}"))?
            .ok_or_else(|| ApplicationError::NativeCallFailed {
                context: format!("cannot create device on {port}"),
            })?;
        info!("created device {} on {}", id, port);

        if !api.start_emulation() {
            return Err(ApplicationError::EmulationFailed {
                context: format!("device {id} created on {port}, but emulation did not start"),
            });
        }
        Ok(StartOutcome::Created(id))
    }

    /// Remove the device on `port`; stop emulation when it was the last one.
    #[instrument(skip(self))]
    pub fn stop(&self, port: ComPort) -> ApplicationResult<StopOutcome> {
        let session = self.session()?;
        let api = session.api();

        let Some(id) = api.device_id_by_com_port(port) else {
            debug!("no device on {}", port);
            return Ok(StopOutcome::NotFound);
        };

        if !api.destroy_device(id) {
            return Err(ApplicationError::NativeCallFailed {
                context: format!("cannot remove device {id} on {port}"),
            });
        }
        info!("removed device {} on {}", id, port);

        if api.devices_count() > 0 {
            return Ok(StopOutcome::Destroyed {
                id,
                emulation_stopped: false,
            });
        }
        if !api.stop_emulation() {
            return Err(ApplicationError::EmulationFailed {
                context: format!("device {id} removed from {port}, but emulation did not stop"),
            });
        }
        Ok(StopOutcome::Destroyed {
            id,
            emulation_stopped: true,
        })
    }

    /// Remove every device and stop emulation.
    #[instrument(skip(self))]
    pub fn stop_all(&self) -> ApplicationResult<StopAllOutcome> {
        let session = self.session()?;
        let api = session.api();

        let count = api.devices_count();
        if count == 0 {
            return Ok(StopAllOutcome::NoDevices);
        }

        if !api.destroy_all_devices() {
            return Err(ApplicationError::NativeCallFailed {
                context: "cannot remove all devices".to_string(),
            });
        }
        info!("removed {} devices", count);

        if !api.stop_emulation() {
            return Err(ApplicationError::EmulationFailed {
                context: "devices removed, but emulation did not stop".to_string(),
            });
        }
        Ok(StopAllOutcome::Destroyed { count })
    }

    /// List all devices by index.
    ///
    /// A device whose id or info cannot be fetched yields an entry without
    /// info instead of aborting the listing.
    #[instrument(skip(self))]
    pub fn show(&self) -> ApplicationResult<Vec<ListingEntry>> {
        let session = self.session()?;
        let api = session.api();

        let count = api.devices_count();
        let entries = (0..count)
            .map(|index| ListingEntry {
                position: index + 1,
                info: api
                    .device_id_by_index(index)
                    .and_then(|id| api.device_info(id)),
            })
            .collect();
        Ok(entries)
    }

    /// Reinitialize the device on `port` in place.
    #[instrument(skip(self))]
    pub fn reinit(&self, port: ComPort) -> ApplicationResult<ReinitOutcome> {
        let session = self.session()?;
        let api = session.api();

        let Some(id) = api.device_id_by_com_port(port) else {
            return Ok(ReinitOutcome::NotFound);
        };
        if !api.reinitialize_device(id) {
            return Err(ApplicationError::NativeCallFailed {
                context: format!("cannot reinitialize device {id} on {port}"),
            });
        }
        Ok(ReinitOutcome::Reinitialized(id))
    }

    /// Load an emulator configuration file.
    #[instrument(skip(self))]
    pub fn load_configuration(&self, path: &Path) -> ApplicationResult<()> {
        let session = self.session()?;
        let loaded = session
            .api()
            .load_configuration(path)
            .with_call_context(&format!("load configuration {}", path.display()))?;
        if !loaded {
            return Err(ApplicationError::NativeCallFailed {
                context: format!("cannot load configuration {}", path.display()),
            });
        }
        Ok(())
    }

    /// Save the current device setup to a configuration file.
    #[instrument(skip(self))]
    pub fn save_configuration(&self, path: &Path) -> ApplicationResult<()> {
        let session = self.session()?;
        let saved = session
            .api()
            .save_configuration(path)
            .with_call_context(&format!("save configuration {}", path.display()))?;
        if !saved {
            return Err(ApplicationError::NativeCallFailed {
                context: format!("cannot save configuration {}", path.display()),
            });
        }
        Ok(())
    }
}
