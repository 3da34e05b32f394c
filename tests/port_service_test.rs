//! Tests for PortService against the in-memory emulator

use std::path::PathBuf;
use std::sync::Arc;

use vspectl::application::services::{
    PortService, ReinitOutcome, StartOutcome, StopAllOutcome, StopOutcome,
};
use vspectl::config::Settings;
use vspectl::domain::{ComPort, DeviceKind};
use vspectl::infrastructure::TextEncoding;
use vspectl::util::testing::{self, Call, FakeOp, FakeVspe};

fn test_settings() -> Settings {
    Settings {
        library_path: PathBuf::from("fake-vspe"),
        activation_key: String::new(),
        encoding: TextEncoding::Utf8,
    }
}

fn service(fake: &Arc<FakeVspe>) -> PortService {
    testing::init_test_setup();
    PortService::new(fake.clone(), Arc::new(test_settings()))
}

fn com(n: i32) -> ComPort {
    ComPort::new(n).unwrap()
}

fn releases(fake: &FakeVspe) -> usize {
    fake.count_calls(|c| *c == Call::Release)
}

// ============================================================
// start() tests
// ============================================================

#[test]
fn given_free_port_when_start_then_creates_one_connector_and_starts_emulation() {
    // Arrange
    let fake = Arc::new(FakeVspe::new());
    let service = service(&fake);

    // Act
    let outcome = service.start(com(5)).unwrap();

    // Assert
    assert!(matches!(outcome, StartOutcome::Created(_)));
    let creates: Vec<Call> = fake
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::CreateDevice { .. }))
        .collect();
    assert_eq!(
        creates,
        vec![Call::CreateDevice {
            kind: "Connector".to_string(),
            init_string: "5;0".to_string(),
        }]
    );
    assert_eq!(fake.init_strings(), vec!["5;0".to_string()]);
    assert!(fake.is_emulating());
    assert_eq!(releases(&fake), 1);
}

#[test]
fn given_existing_port_when_start_again_then_no_creation_call() {
    // Arrange
    let fake = Arc::new(FakeVspe::new());
    let service = service(&fake);
    service.start(com(5)).unwrap();

    // Act
    let outcome = service.start(com(5)).unwrap();

    // Assert
    assert!(matches!(outcome, StartOutcome::AlreadyExists(_)));
    assert_eq!(
        fake.count_calls(|c| matches!(c, Call::CreateDevice { .. })),
        1,
        "only the first start creates a device"
    );
    assert_eq!(fake.device_ids().len(), 1);
    assert_eq!(releases(&fake), 2);
}

#[test]
fn given_session_when_start_then_calls_follow_bracket_order() {
    // Arrange
    let fake = Arc::new(FakeVspe::new());
    let service = service(&fake);

    // Act
    service.start(com(7)).unwrap();

    // Assert
    let calls = fake.calls();
    assert_eq!(calls.first(), Some(&Call::Activate(String::new())));
    assert_eq!(calls.get(1), Some(&Call::Initialize));
    assert_eq!(calls.last(), Some(&Call::Release));
}

// ============================================================
// stop() tests
// ============================================================

#[test]
fn given_last_device_when_stop_then_emulation_stopped() {
    // Arrange
    let fake = Arc::new(FakeVspe::new().with_connector(5).with_emulation_running());
    let service = service(&fake);

    // Act
    let outcome = service.stop(com(5)).unwrap();

    // Assert
    assert!(matches!(
        outcome,
        StopOutcome::Destroyed {
            emulation_stopped: true,
            ..
        }
    ));
    assert_eq!(fake.count_calls(|c| *c == Call::StopEmulation), 1);
    assert!(!fake.is_emulating());
    assert!(fake.device_ids().is_empty());
}

#[test]
fn given_other_devices_remain_when_stop_then_emulation_keeps_running() {
    // Arrange
    let fake = Arc::new(
        FakeVspe::new()
            .with_connector(5)
            .with_connector(6)
            .with_emulation_running(),
    );
    let service = service(&fake);

    // Act
    let outcome = service.stop(com(5)).unwrap();

    // Assert
    assert!(matches!(
        outcome,
        StopOutcome::Destroyed {
            emulation_stopped: false,
            ..
        }
    ));
    assert_eq!(fake.count_calls(|c| *c == Call::StopEmulation), 0);
    assert!(fake.is_emulating());
    assert_eq!(fake.init_strings(), vec!["6;0".to_string()]);
}

#[test]
fn given_unknown_port_when_stop_then_no_destroy_call() {
    // Arrange
    let fake = Arc::new(FakeVspe::new().with_connector(5));
    let service = service(&fake);

    // Act
    let outcome = service.stop(com(99)).unwrap();

    // Assert
    assert_eq!(outcome, StopOutcome::NotFound);
    assert_eq!(
        fake.count_calls(|c| matches!(c, Call::DestroyDevice(_))),
        0
    );
    assert_eq!(releases(&fake), 1);
}

// ============================================================
// stop_all() tests
// ============================================================

#[test]
fn given_no_devices_when_stop_all_then_no_destroy_call() {
    // Arrange
    let fake = Arc::new(FakeVspe::new());
    let service = service(&fake);

    // Act
    let outcome = service.stop_all().unwrap();

    // Assert
    assert_eq!(outcome, StopAllOutcome::NoDevices);
    assert_eq!(fake.count_calls(|c| *c == Call::DestroyAllDevices), 0);
    assert_eq!(fake.count_calls(|c| *c == Call::StopEmulation), 0);
}

#[test]
fn given_devices_when_stop_all_then_destroys_all_and_stops_emulation() {
    // Arrange
    let fake = Arc::new(
        FakeVspe::new()
            .with_connector(1)
            .with_connector(2)
            .with_device(DeviceKind::Pair, "3;4")
            .with_emulation_running(),
    );
    let service = service(&fake);

    // Act
    let outcome = service.stop_all().unwrap();

    // Assert
    assert_eq!(outcome, StopAllOutcome::Destroyed { count: 3 });
    assert_eq!(fake.count_calls(|c| *c == Call::DestroyAllDevices), 1);
    assert!(fake.device_ids().is_empty());
    assert!(!fake.is_emulating());
}

// ============================================================
// show() tests
// ============================================================

#[test]
fn given_no_devices_when_show_then_empty_listing_without_device_queries() {
    // Arrange
    let fake = Arc::new(FakeVspe::new());
    let service = service(&fake);

    // Act
    let entries = service.show().unwrap();

    // Assert
    assert!(entries.is_empty());
    assert_eq!(
        fake.count_calls(|c| matches!(c, Call::DeviceIdByIndex(_) | Call::DeviceInfo(_))),
        0
    );
}

#[test]
fn given_non_contiguous_ids_when_show_then_one_lookup_per_index() {
    // Arrange
    let fake = Arc::new(
        FakeVspe::new()
            .with_id_stride(7)
            .with_connector(1)
            .with_connector(2)
            .with_connector(3),
    );
    let service = service(&fake);

    // Act
    let entries = service.show().unwrap();

    // Assert
    assert_eq!(entries.len(), 3);
    let indices: Vec<usize> = fake
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::DeviceIdByIndex(i) => Some(i),
            _ => None,
        })
        .collect();
    assert_eq!(indices, vec![0, 1, 2]);
    let looked_up: Vec<i32> = fake
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::DeviceInfo(id) => Some(id.get()),
            _ => None,
        })
        .collect();
    assert_eq!(looked_up, vec![0, 7, 14]);
    assert_eq!(
        entries.iter().map(|e| e.position).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(
        entries[1].to_string(),
        "Device 2: Connector (2;0) status: OK, used: NO"
    );
}

#[test]
fn given_info_lookup_fails_when_show_then_listing_continues() {
    // Arrange
    let fake = Arc::new(
        FakeVspe::new()
            .with_connector(1)
            .with_connector(2)
            .failing(FakeOp::DeviceInfo),
    );
    let service = service(&fake);

    // Act
    let entries = service.show().unwrap();

    // Assert
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.info.is_none()));
    assert_eq!(entries[0].to_string(), "Device 1: no device information");
    assert_eq!(releases(&fake), 1);
}

#[test]
fn given_device_with_clients_when_show_then_reported_used() {
    // Arrange
    let fake = FakeVspe::new().with_connector(3);
    let id = fake.device_ids()[0];
    let fake = Arc::new(fake.with_clients(id, 2));
    let service = service(&fake);

    // Act
    let entries = service.show().unwrap();

    // Assert
    let info = entries[0].info.as_ref().unwrap();
    assert!(info.is_used());
    assert!(entries[0].to_string().ends_with("used: YES"));
}

// ============================================================
// reinit / configuration tests
// ============================================================

#[test]
fn given_existing_port_when_reinit_then_reinitializes_that_device() {
    // Arrange
    let fake = Arc::new(FakeVspe::new().with_connector(8));
    let id = fake.device_ids()[0];
    let service = service(&fake);

    // Act
    let outcome = service.reinit(com(8)).unwrap();

    // Assert
    assert_eq!(outcome, ReinitOutcome::Reinitialized(id));
    assert_eq!(fake.count_calls(|c| *c == Call::ReinitializeDevice(id)), 1);
}

#[test]
fn given_unknown_port_when_reinit_then_not_found() {
    let fake = Arc::new(FakeVspe::new());
    let service = service(&fake);

    assert_eq!(service.reinit(com(8)).unwrap(), ReinitOutcome::NotFound);
    assert_eq!(
        fake.count_calls(|c| matches!(c, Call::ReinitializeDevice(_))),
        0
    );
}

#[test]
fn given_path_when_save_and_load_then_passed_through() {
    // Arrange
    let fake = Arc::new(FakeVspe::new());
    let service = service(&fake);
    let path = PathBuf::from("ports.vspe");

    // Act
    service.save_configuration(&path).unwrap();
    service.load_configuration(&path).unwrap();

    // Assert
    assert_eq!(
        fake.count_calls(|c| *c == Call::SaveConfiguration(path.clone())),
        1
    );
    assert_eq!(
        fake.count_calls(|c| *c == Call::LoadConfiguration(path.clone())),
        1
    );
    assert_eq!(releases(&fake), 2);
}

#[test]
fn given_no_session_when_version_then_no_activation() {
    let fake = Arc::new(FakeVspe::new());
    let service = service(&fake);

    assert_eq!(service.version(), "VSPE API fake 1.0");
    assert_eq!(fake.calls(), vec![Call::VersionInformation]);
}
