#![no_main]
use libfuzzer_sys::fuzz_target;
use skd::parse_str;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(database) = parse_str(s) {
            let _ = parse_str(&database.to_string());
        }
    }
});
