//! Resolvers turn the path given to an `{% include %}` tag into template text.
//!
//! The [`Engine`][crate::Engine] keeps an ordered chain of resolvers. They are
//! asked in the order they were added and the first one to return non-empty
//! text wins. The default [`FileResolver`] is asked last, unless it has been
//! cleared with
//! [`Engine::clear_default_resolver`][crate::Engine::clear_default_resolver].
//!
//! Any closure with the right signature is a resolver.
//!
//! ```
//! let mut engine = fmpl::Engine::new();
//! engine.add_resolver(|name: &str, _origin: Option<&str>| match name {
//!     "greeting" => Some(String::from("Hello {{ name }}!")),
//!     _ => None,
//! });
//!
//! let result = engine
//!     .compile("{% include greeting %}")?
//!     .render(fmpl::Value::from([("name", "World")]))
//!     .to_string()?;
//! assert_eq!(result, "Hello World!");
//! # Ok::<(), fmpl::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

/// A strategy for turning an include path into template text.
pub trait Resolve {
    /// Returns the text for `name`, or [`None`] if this resolver can't find it.
    ///
    /// `origin` identifies the template containing the include, typically its
    /// file path, so that relative names can be looked up next to it.
    fn resolve(&self, name: &str, origin: Option<&str>) -> Option<String>;
}

impl<F> Resolve for F
where
    F: Fn(&str, Option<&str>) -> Option<String>,
{
    #[inline]
    fn resolve(&self, name: &str, origin: Option<&str>) -> Option<String> {
        self(name, origin)
    }
}

/// Reads includes from the filesystem.
///
/// If an origin is given and the name is a relative path, the name is first
/// looked up relative to the directory of the origin. Otherwise, or if that
/// fails, the name is read as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileResolver;

impl Resolve for FileResolver {
    fn resolve(&self, name: &str, origin: Option<&str>) -> Option<String> {
        candidates(name, origin)
            .into_iter()
            .find_map(|path| match fs::read_to_string(&path) {
                Ok(text) => Some(text),
                Err(err) => {
                    tracing::debug!(path = %path.display(), %err, "include candidate not readable");
                    None
                }
            })
    }
}

fn candidates(name: &str, origin: Option<&str>) -> Vec<PathBuf> {
    let path = Path::new(name);
    let mut paths = Vec::with_capacity(2);
    if let Some(origin) = origin {
        if path.is_relative() {
            let dir = Path::new(origin).parent().unwrap_or_else(|| Path::new(""));
            paths.push(dir.join(path));
        }
    }
    paths.push(path.to_path_buf());
    paths
}
