#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let mut engine = fmpl::Engine::new();
    engine.clear_default_resolver();
    let _ = engine.compile(data);
});
