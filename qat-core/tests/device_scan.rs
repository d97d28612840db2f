//! Integration tests for a single device scan.
//!
//! Every test runs against an in-memory sysfs tree, so no QAT hardware or
//! root privileges are needed.

mod common;

use common::{config, FakeHost};
use qat_core::plugin::DEVICE_CLASS;
use qat_core::{ErrorKind, QatError, Scanner};
use std::path::PathBuf;

#[test]
fn test_cap_limits_rebinds_and_skips_junk() {
    let host = FakeHost::new(&["c6xxvf", "igb_uio"]);
    let addresses = ["0000:01:00.0", "0000:01:00.1", "0000:01:00.2", "0000:01:00.3"];
    for (index, address) in addresses.iter().enumerate() {
        host.add_vf("c6xxvf", address, index);
    }
    host.sysfs.add_entry(host.layout.driver_dir("c6xxvf"), "somejunk");

    let scanner = Scanner::new(host.sysfs.clone(), &config("igb_uio", &["c6xxvf"], 2));
    let inventory = scanner.scan().unwrap();

    assert_eq!(host.unbound_devices(), vec!["0000:01:00.0", "0000:01:00.1"]);
    assert_eq!(inventory.len(), 2);

    let first = inventory.device(DEVICE_CLASS, "01:00.0").unwrap();
    assert_eq!(first.envs.get("qat1").map(String::as_str), Some("0000:01:00.0"));
    let second = inventory.device(DEVICE_CLASS, "01:00.1").unwrap();
    assert_eq!(second.envs.get("qat2").map(String::as_str), Some("0000:01:00.1"));
    assert_eq!(second.envs.len(), 1);

    assert!(!inventory.contains(DEVICE_CLASS, "01:00.2"));
}

#[test]
fn test_device_id_written_to_new_id() {
    let host = FakeHost::new(&["d15xxvf", "vfio-pci"]);
    host.add_vf_with_id("d15xxvf", "0000:3d:01.0", 7, "0x8086\n");

    let scanner = Scanner::new(host.sysfs.clone(), &config("vfio-pci", &["d15xxvf"], 8));
    scanner.scan().unwrap();

    assert_eq!(host.sysfs.writes_to(&host.layout.new_id_path("vfio-pci")), vec!["8086 8086"]);
}

#[test]
fn test_vfio_inventory_nodes() {
    let host = FakeHost::new(&["c3xxxvf", "vfio-pci"]);
    host.add_vf("c3xxxvf", "0000:3d:01.0", 7);

    let scanner = Scanner::new(host.sysfs.clone(), &config("vfio-pci", &["c3xxxvf"], 8));
    let inventory = scanner.scan().unwrap();

    let device = inventory.device(DEVICE_CLASS, "3d:01.0").unwrap();
    assert_eq!(device.nodes, vec![PathBuf::from("/dev/vfio/7"), PathBuf::from("/dev/vfio/vfio")]);
    assert!(device.mounts.is_empty());
}

#[test]
fn test_uio_inventory_nodes() {
    let host = FakeHost::new(&["c6xxvf", "igb_uio"]);
    host.add_vf("c6xxvf", "0000:3d:01.0", 4);

    let scanner = Scanner::new(host.sysfs.clone(), &config("igb_uio", &["c6xxvf"], 8));
    let inventory = scanner.scan().unwrap();

    let device = inventory.device(DEVICE_CLASS, "3d:01.0").unwrap();
    assert_eq!(device.nodes, vec![PathBuf::from("/dev/uio4")]);
    assert_eq!(device.mounts, vec![PathBuf::from("/sys/class/uio/uio4/device")]);
}

#[test]
fn test_target_driver_devices_are_not_rebound() {
    let host = FakeHost::new(&["c6xxvf", "igb_uio"]);
    host.add_vf("igb_uio", "0000:01:00.0", 0);
    host.add_vf("igb_uio", "0000:01:00.1", 1);

    let scanner = Scanner::new(host.sysfs.clone(), &config("igb_uio", &["c6xxvf"], 8));
    let inventory = scanner.scan().unwrap();

    assert!(host.sysfs.writes().is_empty());
    assert_eq!(inventory.len(), 2);
}

#[test]
fn test_repeated_scans_after_migration_are_idempotent() {
    let host = FakeHost::new(&["c6xxvf", "igb_uio"]);
    host.add_vf("c6xxvf", "0000:01:00.0", 0);
    host.add_vf("c6xxvf", "0000:01:00.1", 1);

    let scanner = Scanner::new(host.sysfs.clone(), &config("igb_uio", &["c6xxvf"], 8));
    let first = scanner.scan().unwrap();
    assert_eq!(host.unbound_devices().len(), 2);

    host.move_vf("0000:01:00.0", "c6xxvf", "igb_uio");
    host.move_vf("0000:01:00.1", "c6xxvf", "igb_uio");

    let second = scanner.scan().unwrap();
    let third = scanner.scan().unwrap();
    assert_eq!(host.unbound_devices().len(), 2);
    assert_eq!(first.diff(&second).added, Vec::<String>::new());
    assert_eq!(second, third);
}

#[test]
fn test_cap_applies_per_driver() {
    let host = FakeHost::new(&["c6xxvf", "d15xxvf", "vfio-pci"]);
    for index in 0..3 {
        host.add_vf("c6xxvf", &format!("0000:01:00.{}", index), index);
        host.add_vf("d15xxvf", &format!("0000:02:00.{}", index), 10 + index);
    }
    host.add_vf("vfio-pci", "0000:03:00.0", 20);

    let config = config("vfio-pci", &["c6xxvf", "d15xxvf"], 2);
    let scanner = Scanner::new(host.sysfs.clone(), &config);
    let inventory = scanner.scan().unwrap();

    // min(2, 3) + min(2, 3) + min(2, 1)
    assert_eq!(inventory.len(), 5);
    assert_eq!(
        host.unbound_devices(),
        vec!["0000:01:00.0", "0000:01:00.1", "0000:02:00.0", "0000:02:00.1"]
    );
    let target_device = inventory.device(DEVICE_CLASS, "03:00.0").unwrap();
    assert!(target_device.envs.contains_key("qat1"));
}

#[test]
fn test_unreadable_driver_directory_fails_before_rebinding() {
    let host = FakeHost::new(&["c6xxvf", "igb_uio"]);
    host.add_vf("c6xxvf", "0000:01:00.0", 0);
    host.sysfs.remove_dir(&host.layout.driver_dir("igb_uio"));

    let scanner = Scanner::new(host.sysfs.clone(), &config("igb_uio", &["c6xxvf"], 8));
    let err = scanner.scan().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Discovery);
    assert!(err.to_string().contains("igb_uio"));
    assert!(host.sysfs.writes().is_empty());
}

#[test]
fn test_device_under_two_drivers_is_rejected() {
    let host = FakeHost::new(&["c6xxvf", "c3xxxvf", "igb_uio"]);
    host.add_vf("c6xxvf", "0000:01:00.0", 0);
    host.sysfs.add_entry(host.layout.driver_dir("c3xxxvf"), "0000:01:00.0");

    let config = config("igb_uio", &["c6xxvf", "c3xxxvf"], 8);
    let scanner = Scanner::new(host.sysfs.clone(), &config);
    let err = scanner.scan().unwrap_err();

    match err {
        QatError::DuplicateDevice { address, first, second } => {
            assert_eq!(address, "0000:01:00.0");
            assert_eq!(first, "c6xxvf");
            assert_eq!(second, "c3xxxvf");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(host.sysfs.writes().is_empty());
}

#[test]
fn test_bind_failure_fails_scan() {
    let host = FakeHost::new(&["c6xxvf", "igb_uio"]);
    host.add_vf("c6xxvf", "0000:01:00.0", 0);
    host.sysfs.fail_writes_to(host.layout.new_id_path("igb_uio"));

    let scanner = Scanner::new(host.sysfs.clone(), &config("igb_uio", &["c6xxvf"], 8));
    let err = scanner.scan().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Bind);
    // The unbind already happened; there is no rollback.
    assert_eq!(host.unbound_devices(), vec!["0000:01:00.0"]);
}

#[test]
fn test_missing_uio_node_fails_scan() {
    let host = FakeHost::new(&["c6xxvf", "igb_uio"]);
    host.add_vf("c6xxvf", "0000:01:00.0", 0);
    host.add_vf("c6xxvf", "0000:01:00.1", 1);
    host.sysfs.remove_dir(&host.layout.uio_dir("0000:01:00.1"));

    let scanner = Scanner::new(host.sysfs.clone(), &config("igb_uio", &["c6xxvf"], 8));
    let err = scanner.scan().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NodeResolution);
}

#[test]
fn test_any_domain_prefixed_entry_is_a_device() {
    let host = FakeHost::new(&["c6xxvf", "igb_uio"]);
    host.add_vf("c6xxvf", "0000:3D:01.0", 3);

    let scanner = Scanner::new(host.sysfs.clone(), &config("igb_uio", &["c6xxvf"], 8));
    let inventory = scanner.scan().unwrap();

    assert_eq!(host.unbound_devices(), vec!["0000:3D:01.0"]);
    let device = inventory.device(DEVICE_CLASS, "3D:01.0").unwrap();
    assert_eq!(device.envs.get("qat1").map(String::as_str), Some("0000:3D:01.0"));
    assert_eq!(device.nodes, vec![PathBuf::from("/dev/uio3")]);
}

#[test]
fn test_missing_source_driver_directory_fails_scan() {
    let host = FakeHost::new(&["c6xxvf", "igb_uio"]);
    host.add_vf("c6xxvf", "0000:01:00.0", 0);

    let scanner = Scanner::new(host.sysfs.clone(), &config("igb_uio", &["c6xxvf", "d15xxvf"], 8));
    let err = scanner.scan().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Discovery);
    assert!(err.to_string().contains("d15xxvf"));
    assert!(host.sysfs.writes().is_empty());
}

#[test]
fn test_unreadable_device_id_fails_scan() {
    let host = FakeHost::new(&["c6xxvf", "vfio-pci"]);
    host.add_vf("c6xxvf", "0000:01:00.0", 0);
    host.sysfs.remove_file(&host.layout.device_id_path("0000:01:00.0"));

    let scanner = Scanner::new(host.sysfs.clone(), &config("vfio-pci", &["c6xxvf"], 8));
    let err = scanner.scan().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Identifier);
    assert!(err.to_string().contains("0000:01:00.0"));
    // The device was unbound before its ID could be read.
    assert_eq!(host.unbound_devices(), vec!["0000:01:00.0"]);
    assert!(host.sysfs.writes_to(&host.layout.new_id_path("vfio-pci")).is_empty());
}
