//! `VspeApi` backed by the vendor's dynamic library
//!
//! The library is opened once with `libloading` and every export is
//! resolved up front, so a missing symbol fails at load time instead of
//! halfway through a session. Signatures follow the vendor header
//! (`VSPE_API ... __cdecl`).

use std::ffi::{c_char, c_int};
use std::fmt;
use std::path::{Path, PathBuf};
use std::ptr;

use libloading::Library;
use tracing::{debug, trace};

use crate::domain::{ComPort, DeviceId, DeviceInfo, DeviceKind};
use crate::infrastructure::traits::VspeApi;
use crate::infrastructure::{InfraError, InfraResult, TextEncoding};

type KeyFn = unsafe extern "C" fn(*const c_char) -> bool;
type StringFn = unsafe extern "C" fn() -> *const c_char;
type FlagFn = unsafe extern "C" fn() -> bool;
type CreateDeviceFn = unsafe extern "C" fn(*const c_char, *const c_char) -> c_int;
type DeviceFlagFn = unsafe extern "C" fn(c_int) -> bool;
type CountFn = unsafe extern "C" fn() -> c_int;
type LookupFn = unsafe extern "C" fn(c_int) -> c_int;
type DeviceInfoFn = unsafe extern "C" fn(
    c_int,
    *mut *const c_char,
    *mut *const c_char,
    *mut c_int,
    *mut c_int,
) -> bool;
type ReleaseFn = unsafe extern "C" fn();

/// Resolved function pointers. Valid only while the owning `Library` is loaded.
struct Symbols {
    activate: KeyFn,
    activation_error: StringFn,
    initialize: FlagFn,
    load_configuration: KeyFn,
    save_configuration: KeyFn,
    create_device: CreateDeviceFn,
    destroy_device: DeviceFlagFn,
    destroy_all_devices: FlagFn,
    devices_count: CountFn,
    device_id_by_index: LookupFn,
    device_id_by_com_port: LookupFn,
    device_info: DeviceInfoFn,
    reinitialize_device: DeviceFlagFn,
    start_emulation: FlagFn,
    stop_emulation: FlagFn,
    release: ReleaseFn,
    version_information: StringFn,
}

impl Symbols {
    fn resolve(library: &Library, path: &Path) -> InfraResult<Self> {
        Ok(Self {
            activate: symbol(library, path, "vspe_activate")?,
            activation_error: symbol(library, path, "vspe_get_activation_error")?,
            initialize: symbol(library, path, "vspe_initialize")?,
            load_configuration: symbol(library, path, "vspe_loadConfiguration")?,
            save_configuration: symbol(library, path, "vspe_saveConfiguration")?,
            create_device: symbol(library, path, "vspe_createDevice")?,
            destroy_device: symbol(library, path, "vspe_destroyDevice")?,
            destroy_all_devices: symbol(library, path, "vspe_destroyAllDevices")?,
            devices_count: symbol(library, path, "vspe_getDevicesCount")?,
            device_id_by_index: symbol(library, path, "vspe_getDeviceIdByIdx")?,
            device_id_by_com_port: symbol(library, path, "vspe_getDeviceIdByComPortIndex")?,
            device_info: symbol(library, path, "vspe_getDeviceInfo")?,
            reinitialize_device: symbol(library, path, "vspe_reinitializeDevice")?,
            start_emulation: symbol(library, path, "vspe_startEmulation")?,
            stop_emulation: symbol(library, path, "vspe_stopEmulation")?,
            release: symbol(library, path, "vspe_release")?,
            version_information: symbol(library, path, "vspe_getVersionInformation")?,
        })
    }
}

fn symbol<T: Copy>(library: &Library, path: &Path, name: &'static str) -> InfraResult<T> {
    // SAFETY: every caller pairs `name` with the signature from the vendor header.
    let sym = unsafe { library.get::<T>(name.as_bytes()) }.map_err(|source| {
        InfraError::MissingSymbol {
            path: path.to_path_buf(),
            symbol: name,
            source,
        }
    })?;
    trace!("resolved {}", name);
    Ok(*sym)
}

/// Handle to a loaded VSPE library.
pub struct NativeVspe {
    path: PathBuf,
    encoding: TextEncoding,
    symbols: Symbols,
    // Keeps the code behind `symbols` mapped; dropped last.
    _library: Library,
}

impl NativeVspe {
    /// Load the library at `path` and resolve all exports.
    pub fn load(path: &Path, encoding: TextEncoding) -> InfraResult<Self> {
        debug!("loading native library {} ({})", path.display(), encoding);
        // SAFETY: loading runs the library's initializers; the vendor DLL is trusted.
        let library = unsafe { Library::new(path) }.map_err(|source| InfraError::LibraryLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let symbols = Symbols::resolve(&library, path)?;
        Ok(Self {
            path: path.to_path_buf(),
            encoding,
            symbols,
            _library: library,
        })
    }

    fn encode_path(&self, path: &Path) -> InfraResult<std::ffi::CString> {
        let text = path
            .to_str()
            .ok_or_else(|| InfraError::encoding(path.display().to_string(), "path is not unicode"))?;
        self.encoding.encode(text)
    }

    fn decode(&self, ptr: *const c_char) -> String {
        // SAFETY: the library returns null or a NUL-terminated string it owns.
        unsafe { self.encoding.decode_ptr(ptr) }
    }
}

impl fmt::Debug for NativeVspe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeVspe")
            .field("path", &self.path)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

// SAFETY for every block below: the pointers in `symbols` stay valid while
// `_library` is alive, and arguments match the vendor signatures.
impl VspeApi for NativeVspe {
    fn activate(&self, key: &str) -> InfraResult<bool> {
        let key = self.encoding.encode(key)?;
        let ok = unsafe { (self.symbols.activate)(key.as_ptr()) };
        debug!("vspe_activate -> {}", ok);
        Ok(ok)
    }

    fn activation_error(&self) -> String {
        self.decode(unsafe { (self.symbols.activation_error)() })
    }

    fn initialize(&self) -> bool {
        let ok = unsafe { (self.symbols.initialize)() };
        debug!("vspe_initialize -> {}", ok);
        ok
    }

    fn load_configuration(&self, path: &Path) -> InfraResult<bool> {
        let name = self.encode_path(path)?;
        let ok = unsafe { (self.symbols.load_configuration)(name.as_ptr()) };
        debug!("vspe_loadConfiguration({}) -> {}", path.display(), ok);
        Ok(ok)
    }

    fn save_configuration(&self, path: &Path) -> InfraResult<bool> {
        let name = self.encode_path(path)?;
        let ok = unsafe { (self.symbols.save_configuration)(name.as_ptr()) };
        debug!("vspe_saveConfiguration({}) -> {}", path.display(), ok);
        Ok(ok)
    }

    fn create_device(
        &self,
        kind: &DeviceKind,
        init_string: &str,
    ) -> InfraResult<Option<DeviceId>> {
        let name = self.encoding.encode(kind.as_str())?;
        let init = self.encoding.encode(init_string)?;
        let raw = unsafe { (self.symbols.create_device)(name.as_ptr(), init.as_ptr()) };
        debug!("vspe_createDevice({}, {:?}) -> {}", kind, init_string, raw);
        Ok(DeviceId::from_native(raw))
    }

    fn destroy_device(&self, id: DeviceId) -> bool {
        let ok = unsafe { (self.symbols.destroy_device)(id.get()) };
        debug!("vspe_destroyDevice({}) -> {}", id, ok);
        ok
    }

    fn destroy_all_devices(&self) -> bool {
        let ok = unsafe { (self.symbols.destroy_all_devices)() };
        debug!("vspe_destroyAllDevices -> {}", ok);
        ok
    }

    fn devices_count(&self) -> usize {
        let raw = unsafe { (self.symbols.devices_count)() };
        debug!("vspe_getDevicesCount -> {}", raw);
        usize::try_from(raw).unwrap_or(0)
    }

    fn device_id_by_index(&self, index: usize) -> Option<DeviceId> {
        let idx = c_int::try_from(index).ok()?;
        let raw = unsafe { (self.symbols.device_id_by_index)(idx) };
        debug!("vspe_getDeviceIdByIdx({}) -> {}", idx, raw);
        DeviceId::from_native(raw)
    }

    fn device_id_by_com_port(&self, port: ComPort) -> Option<DeviceId> {
        let raw = unsafe { (self.symbols.device_id_by_com_port)(port.number()) };
        debug!("vspe_getDeviceIdByComPortIndex({}) -> {}", port.number(), raw);
        DeviceId::from_native(raw)
    }

    fn device_info(&self, id: DeviceId) -> Option<DeviceInfo> {
        let mut name: *const c_char = ptr::null();
        let mut init_string: *const c_char = ptr::null();
        let mut ok: c_int = 0;
        let mut used: c_int = 0;
        let found = unsafe {
            (self.symbols.device_info)(id.get(), &mut name, &mut init_string, &mut ok, &mut used)
        };
        debug!("vspe_getDeviceInfo({}) -> {}", id, found);
        if !found {
            return None;
        }
        Some(DeviceInfo {
            id,
            name: self.decode(name),
            init_string: self.decode(init_string),
            ok: ok != 0,
            clients: u32::try_from(used).unwrap_or(0),
        })
    }

    fn reinitialize_device(&self, id: DeviceId) -> bool {
        let ok = unsafe { (self.symbols.reinitialize_device)(id.get()) };
        debug!("vspe_reinitializeDevice({}) -> {}", id, ok);
        ok
    }

    fn start_emulation(&self) -> bool {
        let ok = unsafe { (self.symbols.start_emulation)() };
        debug!("vspe_startEmulation -> {}", ok);
        ok
    }

    fn stop_emulation(&self) -> bool {
        let ok = unsafe { (self.symbols.stop_emulation)() };
        debug!("vspe_stopEmulation -> {}", ok);
        ok
    }

    fn release(&self) {
        debug!("vspe_release");
        unsafe { (self.symbols.release)() }
    }

    fn version_information(&self) -> String {
        self.decode(unsafe { (self.symbols.version_information)() })
    }
}
