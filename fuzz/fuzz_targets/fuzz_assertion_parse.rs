#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // Parsing must never panic, and whatever parses must render to text that
    // parses back to the same tree.
    if let Ok(assertion) = trackid_assertion::parse(input) {
        let rendered = assertion.render();
        let reparsed = trackid_assertion::parse(&rendered)
            .expect("rendered assertion must parse");
        assert_eq!(reparsed, assertion);
    }
});
