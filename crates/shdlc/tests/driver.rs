//! End-to-end tests of the assembled driver stack: device layer over a
//! connection over a (mock) port, with real frames on the "wire".

use std::sync::Arc;
use std::time::Duration;

use shdlc::commands::GetVersion;
use shdlc::frame::build_mosi_frame;
use shdlc::{Connection, Device, Error};
use shdlc_test_harness::{build_miso_frame, MockPort};

fn setup(port: MockPort) -> (Arc<MockPort>, Connection) {
    let port = Arc::new(port);
    let connection = Connection::new(port.clone());
    (port, connection)
}

#[test]
fn identity_query_round_trip() {
    let port = MockPort::new();
    port.expect_exchange(0x00, 0xD0, &[0x00], 0x00, b"00080000");
    port.expect_exchange(0x00, 0xD0, &[0x03], 0x00, b"18082A1F\0\0\0\0");
    port.expect_exchange(0x00, 0xD1, &[], 0x00, &[0, 1, 2, 3, 4, 5, 6]);
    let (port, connection) = setup(port);

    let mut device = Device::new(&connection, 0x00);
    assert_eq!(device.get_product_type().unwrap(), "00080000");
    assert_eq!(device.get_serial_number().unwrap(), "18082A1F");
    assert_eq!(
        device.get_version().unwrap().to_string(),
        "Firmware 0.1-debug, Hardware 3.4, Protocol 5.6"
    );

    // The exact frames that went over the wire.
    assert_eq!(
        port.sent_data(),
        vec![
            build_mosi_frame(0x00, 0xD0, &[0x00]),
            build_mosi_frame(0x00, 0xD0, &[0x03]),
            build_mosi_frame(0x00, 0xD1, &[]),
        ]
    );
}

#[test]
fn desynchronized_bus_is_detected() {
    let port = MockPort::new();
    // A response for some other slave leaks in.
    port.expect(
        &build_mosi_frame(0x01, 0xD1, &[]),
        &build_miso_frame(0x02, 0xD1, 0x00, &[0, 1, 0, 1, 0, 1, 0]),
    );
    let (_port, connection) = setup(port);

    let err = connection
        .execute(0x01, &GetVersion, true)
        .unwrap_err();
    match err {
        Error::Response { reason, .. } => {
            assert_eq!(reason, "received slave address 2 instead of 1");
        }
        other => panic!("expected Response error, got {other:?}"),
    }
}

#[test]
fn corrupted_frame_is_rejected_with_raw_bytes() {
    let port = MockPort::new();
    let mut response = build_miso_frame(0x00, 0xD1, 0x00, &[0, 1, 0, 1, 0, 1, 0]);
    response[5] ^= 0x01;
    port.expect(&build_mosi_frame(0x00, 0xD1, &[]), &response);
    let (_port, connection) = setup(port);

    let err = connection.execute(0x00, &GetVersion, true).unwrap_err();
    match err {
        Error::Response { reason, raw } => {
            assert_eq!(reason, "wrong checksum");
            assert_eq!(raw, response);
        }
        other => panic!("expected Response error, got {other:?}"),
    }
}

#[test]
fn device_error_surfaces_through_all_layers() {
    let port = MockPort::new();
    port.expect_exchange(0x00, 0xD1, &[], 0x01, &[]);
    let (_port, connection) = setup(port);

    let mut device = Device::new(&connection, 0x00);
    let err = device.get_version().unwrap_err();
    match err {
        Error::Device(e) => {
            assert_eq!(e.code(), 0x01);
            assert_eq!(e.message(), "wrong data size of command or response");
        }
        other => panic!("expected Device error, got {other:?}"),
    }
}

#[test]
fn bus_lock_serializes_multiple_devices() {
    // Two devices on the same bus: exchanges interleave in call order,
    // each one atomic under the bus lock.
    let port = MockPort::new();
    port.expect_exchange(0x01, 0x93, &[], 0x00, &[0, 0, 0, 1]);
    port.expect_exchange(0x02, 0x93, &[], 0x00, &[0, 0, 0, 2]);
    port.expect_exchange(0x01, 0x93, &[], 0x00, &[0, 0, 0, 3]);
    let (_port, connection) = setup(port);

    let mut first = Device::new(&connection, 0x01);
    let mut second = Device::new(&connection, 0x02);

    assert_eq!(first.get_system_up_time().unwrap(), 1);
    assert_eq!(second.get_system_up_time().unwrap(), 2);
    assert_eq!(first.get_system_up_time().unwrap(), 3);
}

#[test]
fn raw_command_escapes_reserved_payload() {
    use shdlc::RawCommand;

    let port = MockPort::new();
    port.expect_exchange(0x7E, 0x80, &[0x7D, 0x11], 0x00, &[0x13]);
    let (port, connection) = setup(port);

    let command = RawCommand::new(0x80, vec![0x7D, 0x11], Duration::from_millis(50));
    let (data, _) = connection.execute(0x7E, &command, true).unwrap();
    assert_eq!(data, vec![0x13]);

    // Reserved bytes in address and payload were stuffed on the wire.
    let sent = port.sent_data();
    assert_eq!(
        sent[0],
        vec![0x7E, 0x7D, 0x5E, 0x80, 0x02, 0x7D, 0x5D, 0x7D, 0x31, 0x71, 0x7E]
    );
}
