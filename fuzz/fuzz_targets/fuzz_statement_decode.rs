#![no_main]

use libfuzzer_sys::fuzz_target;
use trackid_track::TrackingStatement;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    // Decoding and verifying arbitrary input must never panic.
    if let Ok(statement) = TrackingStatement::from_json(json) {
        let _ = statement.verify();
        let _ = statement.id();
        let again = TrackingStatement::from_json(&statement.to_json())
            .expect("re-encoded statement must decode");
        assert_eq!(again, statement);
    }
});
