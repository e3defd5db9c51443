#![no_main]

use libfuzzer_sys::fuzz_target;
use vmc_rs::vmc::frame::{parse_name, parse_network, parse_sensors, parse_status};

fuzz_target!(|data: &[u8]| {
    // Devices may answer with any bytes; decoders must reject, never panic.
    let text = String::from_utf8_lossy(data);
    let _ = parse_status(&text);
    let _ = parse_sensors(&text);
    let _ = parse_name(&text);
    let _ = parse_network(&text);

    // Same payload behind each known tag
    for tag in ["VMGO,", "VMGI,", "VMNM,", "VMSL,"] {
        let tagged = format!("{tag}{text}");
        let _ = parse_status(&tagged);
        let _ = parse_sensors(&tagged);
        let _ = parse_name(&tagged);
        let _ = parse_network(&tagged);
    }
});
