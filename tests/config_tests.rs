use std::io::Write;
use std::time::Duration;
use vmc_rs::config::{load_devices, parse_devices, DeviceRecord, PollConfig};
use vmc_rs::error::VmcError;

#[test]
fn test_parse_device_list() {
    let devices = parse_devices(
        r#"[
            {"ip": "192.168.1.40", "display_name": "Living room", "room_volume_m3": 60},
            {"ip": "192.168.1.41", "port": 5002, "name": "Bathroom", "room_volume": 12.5}
        ]"#,
    )
    .unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].port, 5001);
    assert_eq!(devices[0].address(), "192.168.1.40:5001");
    assert_eq!(devices[1].display_name, "Bathroom");
    assert_eq!(devices[1].room_volume_m3, 12.5);
    assert_eq!(devices[1].address(), "192.168.1.41:5002");
}

#[test]
fn test_room_volume_bounds() {
    assert!(DeviceRecord::new("10.0.0.1", "a", 1.0).validate().is_ok());
    assert!(DeviceRecord::new("10.0.0.1", "a", 1000.0).validate().is_ok());
    assert!(DeviceRecord::new("10.0.0.1", "a", 0.5).validate().is_err());
    assert!(DeviceRecord::new("10.0.0.1", "a", 1000.5).validate().is_err());
    assert!(DeviceRecord::new("10.0.0.1", "a", f64::NAN).validate().is_err());
}

#[test]
fn test_invalid_records_rejected() {
    assert!(DeviceRecord::new(" ", "a", 50.0).validate().is_err());
    assert!(DeviceRecord::new("10.0.0.1", "a", 50.0)
        .with_port(0)
        .validate()
        .is_err());
    let err = parse_devices(r#"[{"ip": "10.0.0.1", "display_name": "a", "room_volume_m3": 0}]"#)
        .unwrap_err();
    assert!(matches!(err, VmcError::Config(_)));
    assert!(matches!(parse_devices("not json"), Err(VmcError::Config(_))));
}

#[test]
fn test_poll_config_defaults() {
    let config = PollConfig::default();
    assert_eq!(config.normal_interval, Duration::from_secs(180));
    assert_eq!(config.recovery_interval, Duration::from_secs(30));
    assert_eq!(config.error_threshold, 5);
    assert_eq!(config.name_refresh, Duration::from_secs(900));
    assert_eq!(config.network_refresh, Duration::from_secs(900));
    assert!(config.validate().is_ok());
}

#[test]
fn test_poll_config_from_json() {
    let config: PollConfig =
        serde_json::from_str(r#"{"normal_interval": 60, "error_threshold": 3}"#).unwrap();
    assert_eq!(config.normal_interval, Duration::from_secs(60));
    assert_eq!(config.error_threshold, 3);
    assert_eq!(config.recovery_interval, Duration::from_secs(30));

    let zero = PollConfig {
        error_threshold: 0,
        ..PollConfig::default()
    };
    assert!(zero.validate().is_err());
}

#[test]
fn test_load_devices_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"ip": "10.0.0.9", "display_name": "Office", "room_volume_m3": 35}}]"#
    )
    .unwrap();
    let devices = load_devices(file.path()).unwrap();
    assert_eq!(devices, vec![DeviceRecord::new("10.0.0.9", "Office", 35.0)]);
}

#[test]
fn test_load_devices_missing_file() {
    let err = load_devices("/nonexistent/devices.json").unwrap_err();
    assert!(matches!(err, VmcError::Config(_)));
}
