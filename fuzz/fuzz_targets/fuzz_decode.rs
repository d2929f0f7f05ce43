#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Decoding must never panic, whatever the server sends.
        let _ = crisis_survival_client::codec::decode(text);
    }

    // Raw-byte path through serde_json's own UTF-8 validation.
    let _ = serde_json::from_slice::<crisis_survival_client::ServerEvent>(data);
});
