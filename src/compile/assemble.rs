//! Assembles the instruction stream into a Lua chunk.
//!
//! The chunk receives the block tree operations, the render function and the
//! options value as arguments and keeps them in locals, so that nothing is
//! shared between compiled templates. The data scope is not part of the chunk,
//! it is installed as the chunk environment by the renderer.
//!
//! The instructions run inside a local function, so a `return` in a statement
//! tag only ends the template body early and the root block is still
//! rendered. Every embedded expression is followed by a line break, so a Lua
//! line comment inside a tag can't swallow the generated code after it.

use std::fmt::Write;

use mlua::Lua;

use crate::render::tree::ROOT;
use crate::types::program::{Instr, Keyword};
use crate::{Error, Result};

/// The locals the chunk binds its arguments to, in argument order.
pub const PREAMBLE: &str = "local __append, __open, __close, __trim, __render, _OPTIONS = ...\n";

/// Returns the Lua chunk for the given instructions.
pub fn chunk(instrs: &[Instr]) -> String {
    let mut s = String::from(PREAMBLE);
    s.push_str("__open(");
    quote(&mut s, ROOT);
    s.push_str(");\n");
    s.push_str("local function __body()\n");

    for instr in instrs {
        match instr {
            Instr::EmitRaw(raw) => {
                s.push_str("__append(");
                quote(&mut s, raw);
                s.push_str(");\n");
            }
            Instr::Emit(expr) => {
                let _ = write!(s, "__append({expr}\n);\n");
            }
            Instr::Exec(stmt) => {
                s.push_str(stmt);
                s.push('\n');
            }
            Instr::Begin(Keyword::If, expr) => {
                let _ = write!(s, "if ({expr}\n) then\n");
            }
            Instr::Begin(Keyword::While, expr) => {
                let _ = write!(s, "while ({expr}\n) do\n");
            }
            // Lua `for` headers bind names so they can't be parenthesized.
            Instr::Begin(Keyword::For, expr) => {
                let _ = write!(s, "for {expr}\ndo\n");
            }
            Instr::Else => s.push_str("else\n"),
            Instr::End => s.push_str("end\n"),
            Instr::OpenBlock(name) => {
                s.push_str("__open(");
                quote(&mut s, name);
                s.push_str(");\n");
            }
            Instr::CloseBlock => s.push_str("__close();\n"),
            Instr::Trim => s.push_str("__trim();\n"),
        }
    }

    s.push_str("end\n__body()\nreturn __render()\n");
    s
}

/// Loads the chunk into a throwaway Lua state to surface syntax errors in the
/// embedded expressions at compile time.
pub fn check(chunk: &str, name: &str) -> Result<()> {
    let lua = Lua::new();
    lua.load(chunk)
        .set_name(name)
        .into_function()
        .map_err(Error::lua_syntax)?;
    Ok(())
}

/// Writes `raw` as a double quoted Lua string literal.
fn quote(s: &mut String, raw: &str) {
    s.push('"');
    for c in raw.chars() {
        match c {
            '"' => s.push_str("\\\""),
            '\\' => s.push_str("\\\\"),
            '\n' => s.push_str("\\n"),
            '\r' => s.push_str("\\r"),
            '\t' => s.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(s, "\\x{:02X}", c as u32);
            }
            c => s.push(c),
        }
    }
    s.push('"');
}
