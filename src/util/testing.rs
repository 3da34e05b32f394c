//! Test support: logging setup and an in-memory `VspeApi`

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{ComPort, DeviceId, DeviceInfo, DeviceKind};
use crate::infrastructure::traits::VspeApi;
use crate::infrastructure::{InfraError, InfraResult};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let noisy_modules = ["config::"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::ENTER)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

// ============================================================
// FAKE NATIVE LIBRARY
// ============================================================

/// A native call as observed by `FakeVspe`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Activate(String),
    ActivationError,
    Initialize,
    LoadConfiguration(PathBuf),
    SaveConfiguration(PathBuf),
    CreateDevice { kind: String, init_string: String },
    DestroyDevice(DeviceId),
    DestroyAllDevices,
    DevicesCount,
    DeviceIdByIndex(usize),
    DeviceIdByComPort(ComPort),
    DeviceInfo(DeviceId),
    ReinitializeDevice(DeviceId),
    StartEmulation,
    StopEmulation,
    Release,
    VersionInformation,
}

/// Operations whose native result can be forced to failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOp {
    Activate,
    Initialize,
    LoadConfiguration,
    SaveConfiguration,
    CreateDevice,
    DestroyDevice,
    DestroyAllDevices,
    DeviceInfo,
    ReinitializeDevice,
    StartEmulation,
    StopEmulation,
}

#[derive(Debug, Clone)]
struct FakeDevice {
    id: DeviceId,
    kind: DeviceKind,
    init_string: String,
    clients: u32,
}

#[derive(Debug)]
struct FakeState {
    devices: Vec<FakeDevice>,
    next_id: i32,
    id_stride: i32,
    emulating: bool,
    failing: HashSet<FakeOp>,
    calls: Vec<Call>,
}

/// In-memory emulator with the native calling contract.
///
/// Connector devices are found by COM port through their init string,
/// ids grow by a configurable stride so they need not be contiguous,
/// and every call is recorded for assertions.
#[derive(Debug)]
pub struct FakeVspe {
    state: Mutex<FakeState>,
}

impl Default for FakeVspe {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeVspe {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                devices: Vec::new(),
                next_id: 0,
                id_stride: 1,
                emulating: false,
                failing: HashSet::new(),
                calls: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        // A panicking test poisons the lock; the state is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Space generated ids `stride` apart (0, stride, 2*stride, ...).
    pub fn with_id_stride(self, stride: i32) -> Self {
        self.state().id_stride = stride;
        self
    }

    /// Pre-create a connector on `port` without recording a call.
    pub fn with_connector(self, port: i32) -> Self {
        self.with_device(DeviceKind::Connector, &format!("{port};0"))
    }

    /// Pre-create an arbitrary device without recording a call.
    pub fn with_device(self, kind: DeviceKind, init_string: &str) -> Self {
        {
            let mut state = self.state();
            state.insert(kind, init_string);
        }
        self
    }

    /// Set the client count of the device with `id`.
    pub fn with_clients(self, id: DeviceId, clients: u32) -> Self {
        {
            let mut state = self.state();
            if let Some(device) = state.devices.iter_mut().find(|d| d.id == id) {
                device.clients = clients;
            }
        }
        self
    }

    pub fn with_emulation_running(self) -> Self {
        self.state().emulating = true;
        self
    }

    /// Force `op` to report failure.
    pub fn failing(self, op: FakeOp) -> Self {
        self.state().failing.insert(op);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|c| matches(c)).count()
    }

    pub fn is_emulating(&self) -> bool {
        self.state().emulating
    }

    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.state().devices.iter().map(|d| d.id).collect()
    }

    pub fn init_strings(&self) -> Vec<String> {
        self.state()
            .devices
            .iter()
            .map(|d| d.init_string.clone())
            .collect()
    }

    fn record(&self, call: Call) -> MutexGuard<'_, FakeState> {
        let mut state = self.state();
        state.calls.push(call);
        state
    }
}

impl FakeState {
    fn insert(&mut self, kind: DeviceKind, init_string: &str) -> DeviceId {
        let id = DeviceId::new(self.next_id).unwrap_or_else(|_| unreachable!("ids start at 0"));
        self.next_id += self.id_stride;
        self.devices.push(FakeDevice {
            id,
            kind,
            init_string: init_string.to_string(),
            clients: 0,
        });
        id
    }

    fn fails(&self, op: FakeOp) -> bool {
        self.failing.contains(&op)
    }
}

fn reject_nul(text: &str) -> InfraResult<()> {
    if text.contains('\0') {
        Err(InfraError::encoding(text, "contains a NUL byte"))
    } else {
        Ok(())
    }
}

impl VspeApi for FakeVspe {
    fn activate(&self, key: &str) -> InfraResult<bool> {
        reject_nul(key)?;
        let state = self.record(Call::Activate(key.to_string()));
        Ok(!state.fails(FakeOp::Activate))
    }

    fn activation_error(&self) -> String {
        self.record(Call::ActivationError);
        "license key rejected".to_string()
    }

    fn initialize(&self) -> bool {
        !self.record(Call::Initialize).fails(FakeOp::Initialize)
    }

    fn load_configuration(&self, path: &Path) -> InfraResult<bool> {
        let state = self.record(Call::LoadConfiguration(path.to_path_buf()));
        Ok(!state.fails(FakeOp::LoadConfiguration))
    }

    fn save_configuration(&self, path: &Path) -> InfraResult<bool> {
        let state = self.record(Call::SaveConfiguration(path.to_path_buf()));
        Ok(!state.fails(FakeOp::SaveConfiguration))
    }

    fn create_device(
        &self,
        kind: &DeviceKind,
        init_string: &str,
    ) -> InfraResult<Option<DeviceId>> {
        reject_nul(init_string)?;
        let mut state = self.record(Call::CreateDevice {
            kind: kind.to_string(),
            init_string: init_string.to_string(),
        });
        if state.fails(FakeOp::CreateDevice) {
            return Ok(None);
        }
        Ok(Some(state.insert(kind.clone(), init_string)))
    }

    fn destroy_device(&self, id: DeviceId) -> bool {
        let mut state = self.record(Call::DestroyDevice(id));
        if state.fails(FakeOp::DestroyDevice) {
            return false;
        }
        let before = state.devices.len();
        state.devices.retain(|d| d.id != id);
        state.devices.len() < before
    }

    fn destroy_all_devices(&self) -> bool {
        let mut state = self.record(Call::DestroyAllDevices);
        if state.fails(FakeOp::DestroyAllDevices) {
            return false;
        }
        state.devices.clear();
        true
    }

    fn devices_count(&self) -> usize {
        self.record(Call::DevicesCount).devices.len()
    }

    fn device_id_by_index(&self, index: usize) -> Option<DeviceId> {
        self.record(Call::DeviceIdByIndex(index))
            .devices
            .get(index)
            .map(|d| d.id)
    }

    fn device_id_by_com_port(&self, port: ComPort) -> Option<DeviceId> {
        self.record(Call::DeviceIdByComPort(port))
            .devices
            .iter()
            .find(|d| {
                d.kind == DeviceKind::Connector
                    && ComPort::from_connector_init(&d.init_string) == Some(port)
            })
            .map(|d| d.id)
    }

    fn device_info(&self, id: DeviceId) -> Option<DeviceInfo> {
        let state = self.record(Call::DeviceInfo(id));
        if state.fails(FakeOp::DeviceInfo) {
            return None;
        }
        state
            .devices
            .iter()
            .find(|d| d.id == id)
            .map(|d| DeviceInfo {
                id: d.id,
                name: d.kind.to_string(),
                init_string: d.init_string.clone(),
                ok: true,
                clients: d.clients,
            })
    }

    fn reinitialize_device(&self, id: DeviceId) -> bool {
        let state = self.record(Call::ReinitializeDevice(id));
        !state.fails(FakeOp::ReinitializeDevice) && state.devices.iter().any(|d| d.id == id)
    }

    fn start_emulation(&self) -> bool {
        let mut state = self.record(Call::StartEmulation);
        if state.fails(FakeOp::StartEmulation) {
            return false;
        }
        state.emulating = true;
        true
    }

    fn stop_emulation(&self) -> bool {
        let mut state = self.record(Call::StopEmulation);
        if state.fails(FakeOp::StopEmulation) {
            return false;
        }
        state.emulating = false;
        true
    }

    fn release(&self) {
        self.record(Call::Release);
    }

    fn version_information(&self) -> String {
        self.record(Call::VersionInformation);
        "VSPE API fake 1.0".to_string()
    }
}

// test
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_stride_when_creating_then_ids_not_contiguous() {
        let fake = FakeVspe::new().with_id_stride(10);
        let a = fake.create_device(&DeviceKind::Connector, "1;0").unwrap();
        let b = fake.create_device(&DeviceKind::Connector, "2;0").unwrap();
        assert_eq!(a.map(DeviceId::get), Some(0));
        assert_eq!(b.map(DeviceId::get), Some(10));
    }

    #[test]
    fn given_connector_when_looked_up_by_port_then_found() {
        let fake = FakeVspe::new().with_connector(4);
        let port = ComPort::new(4).unwrap();
        assert!(fake.device_id_by_com_port(port).is_some());
        assert!(fake
            .device_id_by_com_port(ComPort::new(5).unwrap())
            .is_none());
    }
}
