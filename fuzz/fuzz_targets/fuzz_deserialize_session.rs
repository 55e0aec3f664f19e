#![no_main]

use libfuzzer_sys::fuzz_target;
use tls_session_cache::core::serialization::deserialize_session;

fuzz_target!(|data: &[u8]| {
    // Fuzz session import - test for panics, unbounded allocation, bad lengths
    if let Ok(session) = deserialize_session(data) {
        let _ = session.to_bytes();
    }
});
