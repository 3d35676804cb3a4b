use crate::types::program::{Instr, Keyword};
use crate::types::span::Span;
use crate::{Engine, Error, Result};

/// A single pass state machine over the template source that produces the
/// instruction stream.
///
/// The source is owned and growable because `{% include %}` splices the
/// resolved template text in directly after the tag, so that it is scanned
/// next as if it had been written inline.
#[cfg_attr(internal_debug, derive(Debug))]
pub struct Lexer<'engine, 'origin> {
    /// A reference to the engine containing the resolver chain.
    engine: &'engine Engine,

    /// The identifier of the template being compiled.
    origin: Option<&'origin str>,

    /// The template source, including any spliced includes.
    source: String,

    /// A byte cursor over the template source.
    cursor: usize,

    /// The stack of parse states, never empty while scanning.
    stack: Vec<State>,

    /// The instructions produced so far.
    instrs: Vec<Instr>,
}

/// A parse state on the lexer stack.
#[cfg_attr(internal_debug, derive(Debug))]
struct State {
    scope: Scope,
    /// The text accumulated in this scope.
    buf: String,
    /// The offset at which this scope started.
    begin: usize,
}

/// How the characters being scanned are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Raw template text.
    Verbatim,
    /// The name of a tag directly after `{%`.
    TagName,
    /// The header expression of an `if`, `for` or `while` tag.
    BlockExpr(Keyword),
    /// An expression between `{{` and `}}`.
    EchoedExpr,
    /// A statement between `{$` and `$}`.
    NonEchoedExpr,
    /// The path of an `include` tag.
    IncludePath,
    /// The name of a `block` tag.
    BlockName,
    /// Only whitespace is allowed until `%}`.
    EndBlock(EndTag),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndTag {
    Else,
    EndIf,
    EndFor,
    EndWhile,
    EndBlock,
}

impl<'engine, 'origin> Lexer<'engine, 'origin> {
    /// Construct a new lexer.
    pub fn new(engine: &'engine Engine, source: &str, origin: Option<&'origin str>) -> Self {
        Self {
            engine,
            origin,
            source: source.to_owned(),
            cursor: 0,
            stack: vec![State::new(Scope::Verbatim, 0)],
            instrs: Vec::new(),
        }
    }

    /// Scans the whole source and returns the instruction stream.
    pub fn lex(mut self) -> Result<Vec<Instr>> {
        loop {
            match self.peek(self.cursor) {
                Some(c) => self.step(c)?,
                None => {
                    if !self.flush()? {
                        break;
                    }
                }
            }
        }
        Ok(self.instrs)
    }

    /// Handles the character `c` at the cursor.
    fn step(&mut self, c: char) -> Result<()> {
        let i = self.cursor;
        let next = self.peek(i + c.len_utf8());
        let scope = self.state().scope;

        match c {
            '{' => {
                if scope.is_end_tag() {
                    return Err(self.err_expected_end(i, "{"));
                }
                if let Some(scope) = next.and_then(Scope::from_begin) {
                    // Both characters of the begin tag are ASCII.
                    self.cursor = i + 2;
                    self.push(scope, i)?;
                    if self.peek(self.cursor) == Some('-') {
                        self.cursor += 1;
                        self.instrs.push(Instr::Trim);
                    }
                    return Ok(());
                }
                self.state_mut().buf.push(c);
            }

            '$' | '}' => {
                if scope.is_end_tag() {
                    return Err(self.err_expected_end(i, &c.to_string()));
                }
                let closes = match c {
                    '$' => scope == Scope::NonEchoedExpr,
                    _ => scope == Scope::EchoedExpr,
                };
                if closes && next == Some('}') {
                    self.cursor = i + 2;
                    return self.pop();
                }
                self.state_mut().buf.push(c);
            }

            '%' => {
                if next == Some('}') {
                    self.cursor = i + 2;
                    return match scope {
                        Scope::Verbatim | Scope::EchoedExpr | Scope::NonEchoedExpr => {
                            self.state_mut().buf.push_str("%}");
                            Ok(())
                        }
                        Scope::TagName => self.dispatch(i).and_then(|()| self.pop()),
                        _ => self.pop(),
                    };
                }
                if scope.is_end_tag() {
                    let token: String = ['%'].into_iter().chain(next).collect();
                    return Err(self.err_expected_end(i, &token));
                }
                self.state_mut().buf.push(c);
            }

            c if c.is_whitespace() && scope == Scope::TagName => {
                if !self.state().buf.trim().is_empty() {
                    self.dispatch(i)?;
                }
            }

            c if scope.is_end_tag() => {
                if !c.is_whitespace() {
                    return Err(self.err_expected_end(i, &c.to_string()));
                }
            }

            c => self.state_mut().buf.push(c),
        }

        self.cursor = i + c.len_utf8();
        Ok(())
    }

    /// Flushes the top of the stack at the end of the input as if its scope
    /// had been closed normally.
    ///
    /// Returns whether there is more input to scan, which is only the case if
    /// the flush spliced in an include.
    fn flush(&mut self) -> Result<bool> {
        let state = self.state();
        if state.buf.is_empty() && !state.scope.is_end_tag() {
            return Ok(false);
        }
        let len = self.source.len();
        if state.scope == Scope::TagName {
            self.dispatch(len)?;
        }
        self.pop()?;
        Ok(self.source.len() > len)
    }

    /// Resolves the tag name on the top of the stack into the scope that
    /// collects the rest of the tag.
    fn dispatch(&mut self, i: usize) -> Result<()> {
        let State { buf, begin, .. } = self.pop_state();
        let name = buf.trim();
        let scope = match name {
            "if" => Scope::BlockExpr(Keyword::If),
            "for" => Scope::BlockExpr(Keyword::For),
            "while" => Scope::BlockExpr(Keyword::While),
            "include" => Scope::IncludePath,
            "block" => Scope::BlockName,
            "else" => Scope::EndBlock(EndTag::Else),
            "endif" => Scope::EndBlock(EndTag::EndIf),
            "endfor" => Scope::EndBlock(EndTag::EndFor),
            "endwhile" => Scope::EndBlock(EndTag::EndWhile),
            "endblock" => Scope::EndBlock(EndTag::EndBlock),
            _ => {
                let m = i
                    .checked_sub(name.len())
                    .filter(|&m| self.source.get(m..i) == Some(name))
                    .unwrap_or(begin);
                return Err(Error::syntax(
                    format!("unknown tag: `{name}`"),
                    &self.source,
                    m..i,
                ));
            }
        };
        self.push(scope, begin)
    }

    /// Pushes a new scope, flushing any raw text collected before it.
    fn push(&mut self, scope: Scope, begin: usize) -> Result<()> {
        if self.state().scope == Scope::Verbatim {
            self.pop()?;
        }
        self.stack.push(State::new(scope, begin));
        Ok(())
    }

    /// Pops the top of the stack and emits the instruction for its scope.
    fn pop(&mut self) -> Result<()> {
        let State { scope, buf, begin } = self.pop_state();
        match scope {
            Scope::Verbatim => {
                if !buf.is_empty() {
                    self.instrs.push(Instr::EmitRaw(buf));
                }
            }
            Scope::TagName => {}
            Scope::BlockExpr(keyword) => {
                self.instrs.push(Instr::Begin(keyword, buf.trim().to_owned()));
            }
            Scope::EchoedExpr => {
                self.instrs.push(Instr::Emit(buf.trim().to_owned()));
            }
            Scope::NonEchoedExpr => {
                self.instrs.push(Instr::Exec(buf.trim().to_owned()));
            }
            Scope::IncludePath => {
                self.include(buf.trim(), begin)?;
            }
            Scope::BlockName => {
                let name = buf.trim();
                if name.is_empty() {
                    let end = self.cursor.max(begin);
                    return Err(Error::syntax("expected block name", &self.source, begin..end));
                }
                self.instrs.push(Instr::OpenBlock(name.to_owned()));
            }
            Scope::EndBlock(tag) => {
                let instr = match tag {
                    EndTag::Else => Instr::Else,
                    EndTag::EndIf | EndTag::EndFor | EndTag::EndWhile => Instr::End,
                    EndTag::EndBlock => Instr::CloseBlock,
                };
                self.instrs.push(instr);
            }
        }
        Ok(())
    }

    /// Resolves the include path and splices the result in at the cursor.
    fn include(&mut self, path: &str, begin: usize) -> Result<()> {
        match self.engine.resolve(path, self.origin) {
            Some(text) => {
                tracing::debug!(
                    path,
                    origin = self.origin,
                    len = text.len(),
                    "splicing include"
                );
                self.source.insert_str(self.cursor, &text);
                Ok(())
            }
            None => {
                let end = self.cursor.max(begin);
                Err(Error::resolve(path, &self.source, begin..end))
            }
        }
    }

    /// Removes the top of the stack, keeping a fresh verbatim scope in place
    /// so that there is always somewhere to collect raw text.
    fn pop_state(&mut self) -> State {
        let state = self
            .stack
            .pop()
            .unwrap_or_else(|| State::new(Scope::Verbatim, self.cursor));
        if self.stack.is_empty() {
            self.stack.push(State::new(Scope::Verbatim, self.cursor));
        }
        state
    }

    fn state(&self) -> &State {
        self.stack.last().expect("lexer stack is never empty")
    }

    fn state_mut(&mut self) -> &mut State {
        self.stack.last_mut().expect("lexer stack is never empty")
    }

    fn peek(&self, i: usize) -> Option<char> {
        self.source.get(i..).and_then(|s| s.chars().next())
    }

    fn err_expected_end(&self, i: usize, got: &str) -> Error {
        let span = Span::char_at(&self.source, i);
        Error::syntax(format!("expected `%}}` but got `{got}`"), &self.source, span)
    }
}

impl State {
    fn new(scope: Scope, begin: usize) -> Self {
        Self {
            scope,
            buf: String::new(),
            begin,
        }
    }
}

impl Scope {
    /// Returns the scope opened by `{` followed by `c`.
    fn from_begin(c: char) -> Option<Self> {
        match c {
            '{' => Some(Self::EchoedExpr),
            '$' => Some(Self::NonEchoedExpr),
            '%' => Some(Self::TagName),
            _ => None,
        }
    }

    fn is_end_tag(&self) -> bool {
        matches!(self, Self::EndBlock(_))
    }
}
