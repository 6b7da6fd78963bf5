#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Profile reader must not panic on any input.
    let _ = gobertura::profile::parse(data);
});
