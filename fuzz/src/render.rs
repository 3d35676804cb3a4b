#![no_main]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;

/// Upper bound on resolver calls per compile, a template that includes itself
/// would splice forever.
const MAX_INCLUDES: usize = 16;

#[derive(Debug, Serialize, Arbitrary)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

fuzz_target!(|data: (&str, BTreeMap<String, String>, BTreeMap<String, Value>)| {
    let (root, includes, value) = data;

    // Arbitrary Lua can loop forever, only fuzz straight line templates.
    let looping = ["while", "for", "repeat", "goto", "{$"];
    if looping.iter().any(|kw| root.contains(kw) || includes.values().any(|s| s.contains(kw))) {
        return;
    }

    let calls = AtomicUsize::new(0);
    let mut engine = fmpl::Engine::new();
    engine.clear_default_resolver();
    engine.add_resolver(move |name: &str, _: Option<&str>| {
        if calls.fetch_add(1, Ordering::Relaxed) >= MAX_INCLUDES {
            return None;
        }
        includes.get(name).cloned()
    });

    if let Ok(procedure) = engine.compile(root) {
        let _ = procedure.render(&value).to_string();
    }
});
