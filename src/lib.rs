//! A template compiler that turns tagged text into reusable render procedures
//! backed by Lua.
//!
//! # Features
//!
//! ### Syntax
//!
//! - Literal text is copied through as is.
//! - Echoed expressions: `{{ user.name }}`
//! - Statements: `{$ local total = a + b $}`
//! - Control flow: `{% if x %} ... {% else %} ... {% endif %}`,
//!   `{% for i = 1, 3 %} ... {% endfor %}`, `{% while n > 0 %} ... {% endwhile %}`
//! - Named blocks: `{% block title %} ... {% endblock %}`, where a later block
//!   of the same name replaces the earlier content in place and
//!   `{% block +title %}` appends to it instead.
//! - Includes: `{% include header.html %}` splices in another template.
//! - Trimming: a `-` directly after an opening delimiter, as in `{{- x }}`,
//!   removes whitespace the template has emitted before the tag.
//!
//! Expressions, statements and control flow headers are Lua.
//!
//! ### Engine
//!
//! - Compile once, render many times, from any thread
//! - Pluggable include resolvers, with a filesystem resolver by default
//! - Render to a [`String`] or any [`std::io::Write`] implementor
//! - Render using any [`serde`] serializable values
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct. The engine stores the include
//! resolvers. Generally, you only need to construct one engine during the
//! lifetime of a program.
//!
//! ```
//! let engine = fmpl::Engine::new();
//! ```
//!
//! Next, [`.compile`][Engine::compile] turns template source into a
//! [`Procedure`] which can be rendered any number of times.
//!
//! ```
//! # let engine = fmpl::Engine::new();
//! let procedure = engine.compile("Hello {{ user.name }}!")?;
//! let result = procedure
//!     .render(fmpl::Value::from([(
//!         "user",
//!         fmpl::Value::from([("name", "John Smith")]),
//!     )]))
//!     .to_string()?;
//! assert_eq!(result, "Hello John Smith!");
//! # Ok::<(), fmpl::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Render using structured data
//!
//! ```
//! #[derive(serde::Serialize)]
//! struct Context { items: Vec<String> }
//!
//! let ctx = Context { items: vec!["a".into(), "b".into()] };
//!
//! let result = fmpl::Engine::new()
//!     .compile("{% for _, item in ipairs(items) %}<{{ item }}>{% endfor %}")?
//!     .render(&ctx)
//!     .to_string()?;
//!
//! assert_eq!(result, "<a><b>");
//! # Ok::<(), fmpl::Error>(())
//! ```
//!
//! ### Override a block
//!
//! ```
//! let source = "\
//! {% block title %}Default{% endblock %} | \
//! {% block title %}Custom{% endblock %}";
//!
//! let result = fmpl::render(source, ())?;
//! assert_eq!(result, "Custom | ");
//! # Ok::<(), fmpl::Error>(())
//! ```
//!
//! ### Render a template to an `impl io::Write`
//!
//! ```
//! use std::io;
//!
//! let stdout = io::BufWriter::new(io::stdout());
//!
//! fmpl::Engine::new()
//!     .compile("Hello {{ name }}")?
//!     .render(fmpl::Value::from([("name", "John Smith")]))
//!     .to_writer(stdout)?;
//! # Ok::<(), fmpl::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod compile;
mod error;
mod render;
mod resolve;
mod types;
mod value;

use std::fmt;
use std::fs;
use std::path::Path;

pub use crate::error::{Error, ErrorKind};
pub use crate::render::Renderer;
pub use crate::resolve::{FileResolver, Resolve};
pub use crate::value::Value;

use crate::types::program::Program;

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The compilation engine.
///
/// The engine holds the include resolver chain. Compiling never mutates it so
/// a single engine can be shared between threads.
pub struct Engine {
    resolvers: Vec<Box<dyn Resolve + Send + Sync>>,
    default_resolver: Option<Box<dyn Resolve + Send + Sync>>,
}

/// A compiled template.
///
/// A procedure owns only the generated Lua chunk, so it is cheap to keep
/// around and can be rendered concurrently.
pub struct Procedure {
    program: Program,
}

impl Default for Engine {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Construct a new engine with the [`FileResolver`] as default resolver.
    #[inline]
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
            default_resolver: Some(Box::new(FileResolver)),
        }
    }

    /// Add a resolver to the end of the chain.
    ///
    /// Resolvers are asked in the order they were added, before the default
    /// resolver.
    #[inline]
    pub fn add_resolver<R>(&mut self, resolver: R)
    where
        R: Resolve + Send + Sync + 'static,
    {
        self.resolvers.push(Box::new(resolver));
    }

    /// Replace the resolver that is asked after every added resolver.
    #[inline]
    pub fn set_default_resolver<R>(&mut self, resolver: R)
    where
        R: Resolve + Send + Sync + 'static,
    {
        self.default_resolver = Some(Box::new(resolver));
    }

    /// Remove the default resolver, so only added resolvers are asked.
    #[inline]
    pub fn clear_default_resolver(&mut self) {
        self.default_resolver = None;
    }

    /// Ask the resolver chain for the text of an include.
    ///
    /// Returns the first non-empty text, or [`None`] if every resolver missed.
    pub fn resolve(&self, name: &str, origin: Option<&str>) -> Option<String> {
        self.resolvers
            .iter()
            .chain(self.default_resolver.as_ref())
            .find_map(|r| r.resolve(name, origin).filter(|text| !text.is_empty()))
    }

    /// Compile a template.
    #[inline]
    pub fn compile(&self, source: &str) -> Result<Procedure> {
        self.compile_with_origin(source, None)
    }

    /// Compile a template, recording where it came from.
    ///
    /// The origin is passed to resolvers so includes can be found relative to
    /// it and names the chunk in Lua error messages.
    pub fn compile_with_origin(&self, source: &str, origin: Option<&str>) -> Result<Procedure> {
        let program = compile::template(self, source, origin)?;
        Ok(Procedure { program })
    }

    /// Read a template file and compile it, using the path as origin.
    pub fn compile_file<P>(&self, path: P) -> Result<Procedure>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| {
            Error::io(format!("failed to read template `{}`", path.display()), err)
        })?;
        let origin = path.to_string_lossy();
        self.compile_with_origin(&source, Some(&origin))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("resolvers", &self.resolvers.len())
            .field("default_resolver", &self.default_resolver.is_some())
            .finish()
    }
}

impl Procedure {
    /// Returns a renderer for this procedure using the provided data.
    ///
    /// The top level keys of the data are in scope for template expressions.
    #[inline]
    pub fn render<'render, S>(&'render self, data: S) -> Renderer<'render>
    where
        S: serde::Serialize + 'render,
    {
        Renderer::with_serde(&self.program, data)
    }

    /// Returns the generated Lua chunk.
    #[inline]
    pub fn source(&self) -> &str {
        &self.program.chunk
    }

    /// Returns the origin this procedure was compiled with.
    #[inline]
    pub fn origin(&self) -> Option<&str> {
        self.program.origin.as_deref()
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("origin", &self.program.origin)
            .finish_non_exhaustive()
    }
}

/// Compile a template using a default engine.
#[inline]
pub fn compile(source: &str) -> Result<Procedure> {
    Engine::new().compile(source)
}

/// Compile and render a template in one go using a default engine.
pub fn render<S>(source: &str, data: S) -> Result<String>
where
    S: serde::Serialize,
{
    compile(source)?.render(data).to_string()
}

/// Like [`render`] but also passes the options value, available to the
/// template as `_OPTIONS`.
pub fn render_with_options<S, O>(source: &str, data: S, options: O) -> Result<String>
where
    S: serde::Serialize,
    O: serde::Serialize,
{
    compile(source)?
        .render(data)
        .with_options(options)
        .to_string()
}
