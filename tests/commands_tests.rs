use tokio_test::{assert_err, assert_ok};
use vmc_rs::constants::{CMD_NAME, CMD_STATUS};
use vmc_rs::error::VmcError;
use vmc_rs::vmc::commands::*;
use vmc_rs::vmc::mock::MockTransport;
use vmc_rs::vmc::FanSpeed;

fn device(mock: &MockTransport) -> VmcDevice<MockTransport> {
    VmcDevice::with_transport(mock.clone(), "10.0.0.7", 5001)
}

#[test]
fn test_register_layout() {
    assert_eq!(encode_fan_speed(FanSpeed(3)).unwrap(), "VMWH0000003");
    assert_eq!(encode_panel_led(true).unwrap(), "VMWH0100010");
    assert_eq!(encode_panel_led(false).unwrap(), "VMWH0100000");
    assert_eq!(encode_sensors_enabled(true).unwrap(), "VMWH0300000");
    assert_eq!(encode_sensors_enabled(false).unwrap(), "VMWH0300002");
    assert_eq!(encode_lights_level(100).unwrap(), "VMWH0400100");
    assert_eq!(encode_lights_timer(900).unwrap(), "VMWH0500900");
}

#[test]
fn test_out_of_range_writes_rejected() {
    assert!(matches!(encode_fan_speed(FanSpeed(8)), Err(VmcError::InvalidArgument(_))));
    assert!(matches!(encode_lights_level(101), Err(VmcError::InvalidArgument(_))));
    assert!(matches!(encode_lights_timer(100_000), Err(VmcError::InvalidArgument(_))));
    assert!(matches!(encode_register(100, 1), Err(VmcError::InvalidArgument(_))));
}

#[test]
fn test_rename_encoding() {
    assert_eq!(encode_rename("  Bathroom ").unwrap(), "VMNM Bathroom");
    assert!(encode_rename("   ").is_err());
    assert!(encode_rename(&"x".repeat(33)).is_err());
    assert!(encode_rename("two\nlines").is_err());
}

#[test]
fn test_wifi_encoding() {
    let command = encode_wifi("HomeNet", "secret").unwrap();
    assert_eq!(command.len(), "VMSL ".len() + 64);
    assert!(command.starts_with("VMSL HomeNet*"));
    assert_eq!(&command[5 + 32..5 + 38], "secret");
    assert!(command.ends_with('*'));

    assert!(encode_wifi("", "secret").is_err());
    assert!(encode_wifi("Home*Net", "secret").is_err());
    assert!(encode_wifi("HomeNet", &"p".repeat(33)).is_err());
}

#[test]
fn test_expect_ok() {
    assert!(expect_ok("OK").is_ok());
    assert!(expect_ok(" OK\r\n").is_ok());
    assert!(matches!(expect_ok("ERROR"), Err(VmcError::Protocol(_))));
    assert!(matches!(expect_ok("VMGO,1"), Err(VmcError::Protocol(_))));
}

#[tokio::test]
async fn test_device_write_acknowledged() {
    let mock = MockTransport::new();
    mock.queue_ok("VMWH0000004", "OK");
    assert_ok!(device(&mock).set_fan_speed(FanSpeed(4)).await);
    assert_eq!(mock.sent(), vec!["VMWH0000004"]);
}

#[tokio::test]
async fn test_device_write_refused() {
    let mock = MockTransport::new();
    mock.queue_ok("VMNM Hall", "ERROR");
    let err = assert_err!(device(&mock).rename("Hall").await);
    assert!(matches!(err, VmcError::Protocol(_)));
}

#[tokio::test]
async fn test_invalid_argument_sends_nothing() {
    let mock = MockTransport::new();
    let err = device(&mock).set_lights_level(150).await.unwrap_err();
    assert!(matches!(err, VmcError::InvalidArgument(_)));
    assert!(mock.sent().is_empty());
}

#[tokio::test]
async fn test_device_reads() {
    let mock = MockTransport::new();
    mock.queue_ok(CMD_STATUS, "VMGO,1,00010,0,00000,0,0,0,0,0,0,20,0,0,0");
    mock.queue_ok(CMD_NAME, "VMNM,Cellar");
    let dev = device(&mock);

    let status = dev.read_status().await.unwrap();
    assert_eq!(status.fan_speed, FanSpeed(1));
    assert_eq!(status.lights_level_pct, 20);
    assert_eq!(dev.read_name().await.unwrap(), "Cellar");
}

#[tokio::test]
async fn test_unreachable_device_read() {
    let mock = MockTransport::new();
    let err = assert_err!(device(&mock).read_sensors().await);
    assert!(matches!(err, VmcError::Connection { .. }));
}
