//! Native-library boundary trait for testability
//!
//! `VspeApi` mirrors the VSPE C API one method per exported function,
//! with sentinels and output parameters already turned into Rust types.
//! Services depend on this trait so they can be tested against a fake.

use std::path::Path;

use crate::domain::{ComPort, DeviceId, DeviceInfo, DeviceKind};
use crate::infrastructure::InfraResult;

/// Virtual serial port emulator API.
///
/// Methods returning `bool` report the native success flag unchanged.
/// Only methods that marshal caller-supplied strings can fail on the Rust
/// side, hence the `InfraResult` on those.
pub trait VspeApi: Send + Sync {
    /// Activate the API with a license key (empty key for the free edition).
    /// Must precede every other call except `version_information`.
    fn activate(&self, key: &str) -> InfraResult<bool>;

    /// Details for the last failed activation.
    fn activation_error(&self) -> String;

    /// Initialize the emulator core. Must follow a successful activation.
    fn initialize(&self) -> bool;

    /// Load an emulator configuration file.
    fn load_configuration(&self, path: &Path) -> InfraResult<bool>;

    /// Save the current device setup to a configuration file.
    fn save_configuration(&self, path: &Path) -> InfraResult<bool>;

    /// Create a device. Returns `None` when the library refuses.
    fn create_device(&self, kind: &DeviceKind, init_string: &str)
        -> InfraResult<Option<DeviceId>>;

    fn destroy_device(&self, id: DeviceId) -> bool;

    fn destroy_all_devices(&self) -> bool;

    fn devices_count(&self) -> usize;

    /// Id of the device at `index` (`0..devices_count()`).
    ///
    /// Indices are renumbered by the library after any create/destroy,
    /// so never keep one across a mutating call.
    fn device_id_by_index(&self, index: usize) -> Option<DeviceId>;

    /// Id of the device bound to a COM port, if any.
    fn device_id_by_com_port(&self, port: ComPort) -> Option<DeviceId>;

    /// Device details, or `None` when the library has nothing for `id`.
    fn device_info(&self, id: DeviceId) -> Option<DeviceInfo>;

    fn reinitialize_device(&self, id: DeviceId) -> bool;

    fn start_emulation(&self) -> bool;

    fn stop_emulation(&self) -> bool;

    /// Release the emulator core. Called exactly once per session.
    fn release(&self);

    /// Version banner; callable without activation.
    fn version_information(&self) -> String;
}
