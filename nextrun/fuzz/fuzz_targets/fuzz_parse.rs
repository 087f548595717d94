#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Never panics, whatever the input.
        let reference: jiff::Timestamp = "2026-02-06T12:00:00Z".parse().unwrap();
        let mut resolver = nextrun::ScheduleResolver::new(s, reference);
        let _ = resolver.next();
        let _ = resolver.prev();
    }
});
