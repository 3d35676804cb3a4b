use std::cmp::max;
use std::error::Error as StdError;
use std::fmt;
use std::io;

use crate::types::span::Span;

/// The category of an [`Error`].
///
/// Callers can branch on this to tell "could not obtain the template"
/// ([`Io`][ErrorKind::Io], [`Resolve`][ErrorKind::Resolve]) apart from "the
/// template was invalid" ([`Syntax`][ErrorKind::Syntax]) and "the template
/// failed while running" ([`Eval`][ErrorKind::Eval]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed tag syntax, an unknown tag, a malformed end tag, or embedded
    /// Lua that does not parse, such as an unbalanced `{% endif %}`.
    Syntax,
    /// An `{% include %}` path that no resolver could turn into text.
    Resolve,
    /// Reading a template file failed.
    Io,
    /// Raised by the Lua evaluator while rendering.
    Eval,
}

/// An error that can occur during template compilation or rendering.
pub struct Error {
    kind: ErrorKind,
    msg: String,
    span: Option<(String, Span)>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    pub(crate) fn syntax(msg: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        assert!(!source.is_empty(), "source must be populated");
        Self {
            kind: ErrorKind::Syntax,
            msg: msg.into(),
            span: Some((source.to_owned(), span.into())),
            source: None,
        }
    }

    pub(crate) fn resolve(path: &str, source: &str, span: impl Into<Span>) -> Self {
        Self {
            kind: ErrorKind::Resolve,
            msg: format!("unable to resolve template for include path `{path}`"),
            span: Some((source.to_owned(), span.into())),
            source: None,
        }
    }

    pub(crate) fn io(msg: impl Into<String>, err: io::Error) -> Self {
        Self {
            kind: ErrorKind::Io,
            msg: msg.into(),
            span: None,
            source: Some(Box::new(err)),
        }
    }

    /// An error from loading the generated chunk at compile time.
    ///
    /// Lua syntax errors mean the template was invalid. There is no span, Lua
    /// reports positions in the generated chunk instead.
    pub(crate) fn lua_syntax(err: mlua::Error) -> Self {
        let kind = match &err {
            mlua::Error::SyntaxError { .. } => ErrorKind::Syntax,
            _ => ErrorKind::Eval,
        };
        Self {
            kind,
            msg: err.to_string(),
            span: None,
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn eval(err: mlua::Error) -> Self {
        Self {
            kind: ErrorKind::Eval,
            msg: err.to_string(),
            span: None,
            source: Some(Box::new(err)),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message without any source location.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the span in the template source this error refers to.
    ///
    /// The offsets index into the template after include expansion.
    pub fn span(&self) -> Option<(usize, usize)> {
        self.span.as_ref().map(|(_, span)| (span.m, span.n))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::io("failed to read template", err)
    }
}

impl From<mlua::Error> for Error {
    fn from(err: mlua::Error) -> Self {
        Self::eval(err)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn StdError + 'static))
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => fmt_pretty(&self.msg, source, *span, f),
            None => f
                .debug_struct("Error")
                .field("kind", &self.kind)
                .field("msg", &self.msg)
                .finish(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => {
                if f.alternate() {
                    fmt_pretty(&self.msg, source, *span, f)
                } else {
                    write!(f, "{} between bytes {} and {}", self.msg, span.m, span.n)
                }
            }
            None => match &self.source {
                Some(err) if self.kind == ErrorKind::Io => write!(f, "{}: {}", self.msg, err),
                _ => write!(f, "{}", self.msg),
            },
        }
    }
}

fn fmt_pretty(msg: &str, source: &str, span: Span, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let lines: Vec<_> = source.split_terminator('\n').collect();
    let (line, col) = to_line_col(&lines, span.m);
    let len = max(1, width(&source[span]));
    let code = lines.get(line).or(lines.last()).copied().unwrap_or_default();

    let num = (line + 1).to_string();
    let pad = width(&num);
    let pipe = "|";
    let underline = "^".repeat(len);

    write!(
        f,
        "\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$} {msg}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + len,
        msg = msg
    )
}

fn to_line_col(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            return (i, width(&line[..offset - n]));
        }
        n += len;
    }
    (lines.len(), lines.last().map(|l| width(l)).unwrap_or(0))
}

#[cfg(feature = "unicode")]
fn width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn width(s: &str) -> usize {
    s.chars().count()
}
