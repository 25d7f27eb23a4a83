#![no_main]

use harvard_library_mcp::normalize::{self, Payload};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = std::str::from_utf8(data) {
        let _ = normalize::normalize_search(Payload::Json(body));
        let _ = normalize::normalize_record(Payload::Json(body));
    }
});
