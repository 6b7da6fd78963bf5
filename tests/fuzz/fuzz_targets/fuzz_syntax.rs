#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Declaration scanner must not panic, and every extent it reports must be
    // well-formed.
    if let Ok(file) = gobertura::syntax::parse_file("fuzz.go", data) {
        for func in &file.funcs {
            assert!(func.span.start <= func.span.end);
        }
    }
});
