//! Defines the [`Instr`] stream produced by the lexer and the compiled
//! [`Program`] holding the Lua chunk assembled from it.

/// The output of compilation.
#[cfg_attr(internal_debug, derive(Debug))]
pub struct Program {
    /// The identifier of the template this program was compiled from, if any.
    pub origin: Option<String>,
    /// The Lua chunk assembled from the instruction stream.
    pub chunk: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// Append raw template text to the open block
    EmitRaw(String),

    /// Evaluate an expression and append its string form to the open block
    Emit(String),

    /// Execute a statement, nothing is appended
    Exec(String),

    /// Start a control flow construct with the given header expression
    Begin(Keyword, String),

    /// Switch to the alternative branch of an `if`
    Else,

    /// End the innermost control flow construct
    End,

    /// Open a named block, a leading `+` appends instead of replacing
    OpenBlock(String),

    /// Close the open block
    CloseBlock,

    /// Trim trailing whitespace from the open block
    Trim,
}

/// A tag keyword that starts a control flow construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    For,
    While,
}

#[cfg(not(internal_debug))]
impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<compiled>")
    }
}
