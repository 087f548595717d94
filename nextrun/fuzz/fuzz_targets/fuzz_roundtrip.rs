#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let validator = nextrun::SyntaxValidator::new(s);
        if validator.is_valid() {
            let displayed = validator.to_string();
            let reparsed = nextrun::SyntaxValidator::new(&displayed);
            assert!(reparsed.is_valid(), "display output must be valid");
            assert_eq!(displayed, reparsed.to_string(), "roundtrip idempotency failed");
            for (a, b) in validator.parts().iter().zip(reparsed.parts()) {
                assert_eq!((a.kind(), a.value()), (b.kind(), b.value()));
            }
        }
    }
});
