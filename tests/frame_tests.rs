use vmc_rs::error::VmcError;
use vmc_rs::vmc::frame::{
    decode_name, parse_name, parse_network, parse_sensors, parse_status, FanMode, FanSpeed,
    NetworkInfo, SensorFrame, StatusFrame,
};

const STATUS_15: &str = "VMGO,2,00010,0,00000,0,0,0,0,0,0,0,0,0,60";
const STATUS_16: &str = "VMGO,4,00000,0,00002,0,0,0,0,0,0,75,0,0,0,300";
const SENSORS: &str = "VMGI,220,150,500,800,0,0,0,0,0,0,150,0,0,0";

#[test]
fn test_status_fifteen_fields() {
    let status = parse_status(STATUS_15).expect("valid status");
    assert_eq!(status.fan_speed, FanSpeed(2));
    assert!(status.panel_led_on);
    assert!(status.sensors_enabled);
    assert_eq!(status.lights_level_pct, 0);
    // No field 15 in this firmware layout
    assert_eq!(status.lights_timer_sec, 0);
}

#[test]
fn test_status_sixteen_fields() {
    let status = parse_status(STATUS_16).expect("valid status");
    assert_eq!(status.fan_speed, FanSpeed(4));
    assert!(!status.panel_led_on);
    assert!(!status.sensors_enabled);
    assert_eq!(status.lights_level_pct, 75);
    assert_eq!(status.lights_timer_sec, 300);
}

#[test]
fn test_status_tolerates_line_terminator() {
    assert!(parse_status(&format!("{STATUS_15}\r\n")).is_some());
}

#[test]
fn test_status_wrong_tag_or_short() {
    assert!(parse_status(SENSORS).is_none());
    assert!(parse_status("VMGO,2,00010,0,00000").is_none());
    assert!(parse_status("").is_none());
    assert!(parse_status("ERROR").is_none());
}

#[test]
fn test_status_non_numeric_field() {
    assert!(parse_status("VMGO,x,00010,0,00000,0,0,0,0,0,0,0,0,0,60").is_none());
    assert!(parse_status("VMGO,2,00010,0,00000,0,0,0,0,0,0,abc,0,0,60").is_none());
    let err = StatusFrame::decode("VMGO,2,00010,0,00000,0,0,0,0,0,0,0,0,0,60,soon").unwrap_err();
    assert!(matches!(err, VmcError::Parse(_)));
}

#[test]
fn test_status_unknown_fan_code_is_kept() {
    let status = parse_status("VMGO,9,00010,0,00000,0,0,0,0,0,0,0,0,0,60").unwrap();
    assert_eq!(status.fan_speed.mode(), FanMode::Unknown(9));
    assert_eq!(status.fan_speed.airflow_m3h(), 10.0);
}

#[test]
fn test_sensors_tenths_encoding() {
    let sensors = parse_sensors(SENSORS).expect("valid sensors");
    assert_eq!(sensors.temp_internal_c, 22.0);
    assert_eq!(sensors.temp_external_c, 15.0);
    assert_eq!(sensors.humidity_pct, 50.0);
    assert_eq!(sensors.co2_ppm, 800);
    assert_eq!(sensors.voc_ppb, Some(150));
}

#[test]
fn test_sensors_negative_temperature() {
    let sensors = parse_sensors("VMGI,205,-35,612,450,0,0,0,0,0,0,0,0,0,0").unwrap();
    assert_eq!(sensors.temp_external_c, -3.5);
    assert_eq!(sensors.humidity_pct, 61.2);
}

#[test]
fn test_sensors_voc_sentinel() {
    let sensors = parse_sensors("VMGI,220,150,500,800,0,0,0,0,0,0,0,0,0,0").unwrap();
    assert_eq!(sensors.voc_ppb, None);
}

#[test]
fn test_sensors_rejects_bad_input() {
    assert!(parse_sensors(STATUS_15).is_none());
    assert!(parse_sensors("VMGI,220,150,500,800,0,0,0,0,0,0,150").is_none());
    assert!(parse_sensors("VMGI,22.0,150,500,800,0,0,0,0,0,0,150,0,0,0").is_none());
    assert!(matches!(
        SensorFrame::decode("VMGI,220,150,500,n/a,0,0,0,0,0,0,150,0,0,0"),
        Err(VmcError::Parse(_))
    ));
}

#[test]
fn test_sensors_negative_air_quality_keeps_frame() {
    let sensors = parse_sensors("VMGI,220,150,500,-1,0,0,0,0,0,0,-5,0,0,0").expect("numeric fields");
    assert_eq!(sensors.temp_internal_c, 22.0);
    assert_eq!(sensors.humidity_pct, 50.0);
    assert_eq!(sensors.co2_ppm, -1);
    assert_eq!(sensors.voc_ppb, Some(-5));
}

#[test]
fn test_fan_modes() {
    assert_eq!(FanSpeed(0).mode(), FanMode::Off);
    assert_eq!(FanSpeed(3).mode(), FanMode::Manual(3));
    assert_eq!(FanSpeed(5).mode(), FanMode::Night);
    assert_eq!(FanSpeed(6).mode(), FanMode::Hyperventilation);
    assert_eq!(FanSpeed(7).mode(), FanMode::FreeCooling);
    assert_eq!(FanSpeed(7).to_string(), "free cooling");
}

#[test]
fn test_manual_speed_percentages() {
    for speed in 1..=4u8 {
        assert_eq!(FanSpeed(speed).percentage(), speed * 25);
    }
}

#[test]
fn test_special_mode_table() {
    assert_eq!(FanSpeed(5).airflow_m3h(), 7.0);
    assert_eq!(FanSpeed(6).airflow_m3h(), 42.0);
    assert_eq!(FanSpeed(7).airflow_m3h(), 26.0);
    assert_eq!(FanSpeed(5).percentage(), 25);
    assert_eq!(FanSpeed(6).percentage(), 100);
    assert_eq!(FanSpeed(7).percentage(), 0);
    assert_eq!(FanSpeed(200).airflow_m3h(), 10.0);
}

#[test]
fn test_name_variants() {
    assert_eq!(parse_name("VMNM,Kitchen").as_deref(), Some("Kitchen"));
    assert_eq!(parse_name("VMNM Kitchen unit ").as_deref(), Some("Kitchen unit"));
    assert_eq!(parse_name("VMNM, Bath ,x").as_deref(), Some("Bath"));
    assert!(parse_name("VMNM").is_none());
    assert!(parse_name("VMNM,").is_none());
    assert!(matches!(decode_name("VMGO,1"), Err(VmcError::Protocol(_))));
}

fn network_payload(ssid: &str, password: &str) -> String {
    format!("{ssid:*<32}{password:*<32}")
}

#[test]
fn test_network_payload() {
    let info = parse_network(&network_payload("HomeNet", "hunter22")).unwrap();
    assert_eq!(info.ssid, "HomeNet");
    assert_eq!(info.password.as_str(), "hunter22");
}

#[test]
fn test_network_payload_with_tag() {
    let raw = format!("VMSL,{}", network_payload("Attic", ""));
    let info = NetworkInfo::decode(&raw).unwrap();
    assert_eq!(info.ssid, "Attic");
    assert_eq!(info.password.as_str(), "");
}

#[test]
fn test_network_payload_too_short() {
    assert!(matches!(NetworkInfo::decode("VMSL,abc***"), Err(VmcError::Parse(_))));
    // Full SSID slot but the password slot cut after six characters
    let truncated = format!("{:*<32}{}", "HomeNet", "hunter");
    assert_eq!(truncated.len(), 38);
    assert!(matches!(NetworkInfo::decode(&truncated), Err(VmcError::Parse(_))));
    assert!(parse_network(&truncated).is_none());
}

mod totality {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_parsers_never_panic(raw in "\\PC{0,200}") {
            let _ = parse_status(&raw);
            let _ = parse_sensors(&raw);
            let _ = parse_name(&raw);
            let _ = parse_network(&raw);
        }

        #[test]
        fn prop_short_telegrams_rejected(fields in prop::collection::vec(0u32..100_000, 0..14)) {
            let body: Vec<String> = fields.iter().map(u32::to_string).collect();
            let status = format!("VMGO,{}", body.join(","));
            let sensors = format!("VMGI,{}", body.join(","));
            prop_assert!(parse_status(&status).is_none());
            prop_assert!(parse_sensors(&sensors).is_none());
        }

        #[test]
        fn prop_numeric_status_accepted(
            fan in 0u8..=u8::MAX,
            rest in prop::collection::vec(0u32..100_000, 13..19),
        ) {
            let body: Vec<String> = rest.iter().map(u32::to_string).collect();
            let status = format!("VMGO,{fan},{}", body.join(","));
            let parsed = parse_status(&status);
            prop_assert!(parsed.is_some());
            prop_assert_eq!(parsed.unwrap().fan_speed.code(), fan);
        }
    }
}
