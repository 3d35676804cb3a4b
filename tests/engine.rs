use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fmpl::{Engine, ErrorKind, FileResolver, Resolve, Value};

#[test]
fn engine_debug() {
    let mut engine = Engine::new();
    engine.add_resolver(|_: &str, _: Option<&str>| None);
    assert_eq!(
        format!("{engine:?}"),
        "Engine { resolvers: 1, default_resolver: true }"
    );
}

#[test]
fn engine_resolver_include_is_parsed_in_place() {
    let mut engine = Engine::new();
    engine.add_resolver(|name: &str, _: Option<&str>| match name {
        "greeting" => Some(String::from("Hello {{ name }}!")),
        _ => None,
    });
    let result = engine
        .compile("<{% include greeting %}>")
        .unwrap()
        .render(Value::from([("name", "World")]))
        .to_string()
        .unwrap();
    assert_eq!(result, "<Hello World!>");
}

#[test]
fn engine_include_interacts_with_blocks() {
    let mut engine = Engine::new();
    engine.clear_default_resolver();
    engine.add_resolver(|name: &str, _: Option<&str>| match name {
        "layout" => Some(String::from(
            "<h1>{% block title %}Untitled{% endblock %}</h1>",
        )),
        _ => None,
    });
    let result = engine
        .compile("{% include layout %}{% block title %}Home{% endblock %}")
        .unwrap()
        .render(())
        .to_string()
        .unwrap();
    assert_eq!(result, "<h1>Home</h1>");
}

#[test]
fn engine_include_nested() {
    let mut engine = Engine::new();
    engine.clear_default_resolver();
    engine.add_resolver(|name: &str, _: Option<&str>| match name {
        "a" => Some(String::from("a({% include b %})")),
        "b" => Some(String::from("b")),
        _ => None,
    });
    let result = engine
        .compile("{% include a %}!")
        .unwrap()
        .render(())
        .to_string()
        .unwrap();
    assert_eq!(result, "a(b)!");
}

#[test]
fn engine_unresolved_include_then_resolver() {
    let source = "{% include missing.html %}";

    let mut engine = Engine::new();
    engine.clear_default_resolver();
    let err = engine.compile(source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resolve);
    assert!(err.message().contains("missing.html"));

    engine.add_resolver(|name: &str, _: Option<&str>| {
        (name == "missing.html").then(|| String::from("found"))
    });
    let result = engine.compile(source).unwrap().render(()).to_string().unwrap();
    assert_eq!(result, "found");
}

#[test]
fn engine_resolvers_in_order() {
    let mut engine = Engine::new();
    engine.add_resolver(|name: &str, _: Option<&str>| (name == "x").then(|| String::from("first")));
    engine.add_resolver(|_: &str, _: Option<&str>| Some(String::from("second")));
    assert_eq!(engine.resolve("x", None).as_deref(), Some("first"));
    assert_eq!(engine.resolve("y", None).as_deref(), Some("second"));
}

#[test]
fn engine_empty_resolution_is_a_miss() {
    let mut engine = Engine::new();
    engine.clear_default_resolver();
    engine.add_resolver(|_: &str, _: Option<&str>| Some(String::new()));
    engine.add_resolver(|_: &str, _: Option<&str>| Some(String::from("fallback")));
    assert_eq!(engine.resolve("x", None).as_deref(), Some("fallback"));
}

#[test]
fn engine_resolver_receives_origin() {
    let mut engine = Engine::new();
    engine.clear_default_resolver();
    engine.add_resolver(|name: &str, origin: Option<&str>| {
        Some(format!("{name} from {}", origin.unwrap_or("nowhere")))
    });
    let result = engine
        .compile_with_origin("{% include part %}", Some("page.html"))
        .unwrap()
        .render(())
        .to_string()
        .unwrap();
    assert_eq!(result, "part from page.html");
}

#[test]
fn engine_resolver_struct() {
    struct Counting(Arc<AtomicUsize>);

    impl Resolve for Counting {
        fn resolve(&self, _: &str, _: Option<&str>) -> Option<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Some(String::from("counted"))
        }
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let mut engine = Engine::new();
    engine.add_resolver(Counting(calls.clone()));
    engine.compile("{% include a %}{% include b %}").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn engine_default_resolver_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("part.html");
    fs::write(&path, "<p>{{ x }}</p>").unwrap();

    let source = format!("{{% include {} %}}", path.display());
    let result = Engine::new()
        .compile(&source)
        .unwrap()
        .render(Value::from([("x", 1)]))
        .to_string()
        .unwrap();
    assert_eq!(result, "<p>1</p>");
}

#[test]
fn engine_default_resolver_runs_after_added_resolvers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("part.html");
    fs::write(&path, "from file").unwrap();
    let name = path.display().to_string();

    let mut engine = Engine::new();
    engine.add_resolver(|name: &str, _: Option<&str>| {
        name.ends_with("other.html").then(|| String::from("from resolver"))
    });
    assert_eq!(engine.resolve(&name, None).as_deref(), Some("from file"));
    assert_eq!(
        engine.resolve("other.html", None).as_deref(),
        Some("from resolver")
    );
}

#[test]
fn engine_clear_default_resolver() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("part.html");
    fs::write(&path, "from file").unwrap();
    let name = path.display().to_string();

    let mut engine = Engine::new();
    engine.clear_default_resolver();
    assert_eq!(engine.resolve(&name, None), None);

    engine.set_default_resolver(FileResolver);
    assert_eq!(engine.resolve(&name, None).as_deref(), Some("from file"));
}

#[test]
fn engine_compile_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("header.html"), "<h1>{{ title }}</h1>").unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, "{% include header.html %}\n<p>body</p>").unwrap();

    let procedure = Engine::new().compile_file(&page).unwrap();
    assert_eq!(procedure.origin(), page.to_str());

    let result = procedure
        .render(Value::from([("title", "Hi")]))
        .to_string()
        .unwrap();
    assert_eq!(result, "<h1>Hi</h1>\n<p>body</p>");
}

#[test]
fn engine_compile_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.html");
    let err = Engine::new().compile_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(
        err.message(),
        format!("failed to read template `{}`", path.display())
    );
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn engine_compile_file_syntax_error_is_not_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.html");
    fs::write(&path, "{% nope %}").unwrap();
    let err = Engine::new().compile_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn engine_shared_between_threads() {
    let mut engine = Engine::new();
    engine.add_resolver(|name: &str, _: Option<&str>| Some(format!("[{name}]")));
    let engine = Arc::new(engine);

    let handles: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|name| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                engine
                    .compile(&format!("{{% include {name} %}}"))
                    .unwrap()
                    .render(())
                    .to_string()
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, ["[a]", "[b]", "[c]"]);
}
