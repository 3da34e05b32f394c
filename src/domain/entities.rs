//! Domain entities: core data structures

use std::fmt;

use crate::domain::DomainError;

/// Native sentinel for "no device" / "creation failed" in id-returning calls.
pub const NATIVE_NO_DEVICE: i32 = -1;

/// Identifier the native library assigns to a device on creation.
///
/// Ids need not be contiguous and are only meaningful to the library that
/// issued them. The `-1` sentinel is never a valid `DeviceId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(i32);

impl DeviceId {
    /// Wrap a raw id, rejecting negative values.
    pub fn new(raw: i32) -> Result<Self, DomainError> {
        if raw < 0 {
            Err(DomainError::InvalidDeviceId(raw))
        } else {
            Ok(Self(raw))
        }
    }

    /// Interpret a raw native return value; the sentinel maps to `None`.
    pub fn from_native(raw: i32) -> Option<Self> {
        Self::new(raw).ok()
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// COM port number as understood by the emulator (`COM5` is `ComPort(5)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComPort(i32);

impl ComPort {
    pub fn new(number: i32) -> Result<Self, DomainError> {
        if number < 0 {
            Err(DomainError::InvalidComPort(number))
        } else {
            Ok(Self(number))
        }
    }

    pub fn number(self) -> i32 {
        self.0
    }

    /// Init string for a "Connector" device bound to this port.
    ///
    /// Format is `{port};{flag}`; the flag is always `0` here.
    pub fn connector_init_string(self) -> String {
        format!("{};0", self.0)
    }

    /// Recover the port from a "Connector" init string (`"5;0"` → `COM5`).
    pub fn from_connector_init(init_string: &str) -> Option<Self> {
        let head = init_string.split(';').next()?;
        head.trim()
            .parse::<i32>()
            .ok()
            .and_then(|n| Self::new(n).ok())
    }
}

impl fmt::Display for ComPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "COM{}", self.0)
    }
}

/// Device-type tag accepted by `vspe_createDevice`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Connector,
    Splitter,
    Pair,
    Other(String),
}

impl DeviceKind {
    pub fn as_str(&self) -> &str {
        match self {
            DeviceKind::Connector => "Connector",
            DeviceKind::Splitter => "Splitter",
            DeviceKind::Pair => "Pair",
            DeviceKind::Other(name) => name.as_str(),
        }
    }
}

impl From<&str> for DeviceKind {
    fn from(name: &str) -> Self {
        match name {
            "Connector" => DeviceKind::Connector,
            "Splitter" => DeviceKind::Splitter,
            "Pair" => DeviceKind::Pair,
            other => DeviceKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a device as reported by `vspe_getDeviceInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: DeviceId,
    /// Device-type tag, e.g. "Connector"
    pub name: String,
    /// Device-specific configuration, e.g. "5;0"
    pub init_string: String,
    /// Device state reported healthy (native `ok` nonzero)
    pub ok: bool,
    /// Number of clients holding the port open
    pub clients: u32,
}

impl DeviceInfo {
    pub fn is_used(&self) -> bool {
        self.clients > 0
    }
}

/// One row of a device listing: 1-based position plus whatever the
/// library could tell us about the device at that index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub position: usize,
    pub info: Option<DeviceInfo>,
}

impl fmt::Display for ListingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.info {
            Some(info) => write!(
                f,
                "Device {}: {} ({}) status: {}, used: {}",
                self.position,
                info.name,
                info.init_string,
                if info.ok { "OK" } else { "ERROR" },
                if info.is_used() { "YES" } else { "NO" },
            ),
            None => write!(f, "Device {}: no device information", self.position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_sentinel_when_from_native_then_none() {
        assert_eq!(DeviceId::from_native(NATIVE_NO_DEVICE), None);
        assert_eq!(DeviceId::from_native(7).map(DeviceId::get), Some(7));
    }

    #[test]
    fn given_port_when_connector_init_string_then_port_and_zero_flag() {
        let port = ComPort::new(5).unwrap();
        assert_eq!(port.connector_init_string(), "5;0");
        assert_eq!(ComPort::from_connector_init("5;0"), Some(port));
        assert_eq!(ComPort::from_connector_init("garbage"), None);
    }

    #[test]
    fn given_negative_port_when_new_then_error() {
        assert!(matches!(
            ComPort::new(-3),
            Err(DomainError::InvalidComPort(-3))
        ));
    }

    #[test]
    fn given_unknown_name_when_kind_then_other() {
        assert_eq!(DeviceKind::from("Pair"), DeviceKind::Pair);
        assert_eq!(
            DeviceKind::from("Bridge"),
            DeviceKind::Other("Bridge".to_string())
        );
    }

    #[test]
    fn given_entries_when_displayed_then_one_based_lines() {
        let info = DeviceInfo {
            id: DeviceId::new(12).unwrap(),
            name: "Connector".into(),
            init_string: "3;0".into(),
            ok: true,
            clients: 0,
        };
        let present = ListingEntry {
            position: 1,
            info: Some(info),
        };
        let missing = ListingEntry {
            position: 2,
            info: None,
        };
        assert_eq!(
            present.to_string(),
            "Device 1: Connector (3;0) status: OK, used: NO"
        );
        assert_eq!(missing.to_string(), "Device 2: no device information");
    }
}
