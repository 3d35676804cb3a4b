//! Compile the template into a program that can be executed by the renderer.
//!
//! This process has two stages:
//! - The lexer scans the template source in a single pass and produces the
//!   instruction stream, splicing in includes as they are encountered.
//! - The assembler wraps the instructions into a Lua chunk which is loaded
//!   once so that invalid embedded Lua fails compilation.

mod assemble;
mod lex;

use crate::compile::lex::Lexer;
use crate::types::program::Program;
use crate::{Engine, Result};

/// The chunk name used when a template has no origin.
const ANONYMOUS: &str = "template";

/// Compile a template into a program.
pub fn template(engine: &Engine, source: &str, origin: Option<&str>) -> Result<Program> {
    tracing::debug!(len = source.len(), origin, "compiling template");

    let instrs = Lexer::new(engine, source, origin).lex()?;
    let chunk = assemble::chunk(&instrs);
    tracing::trace!(%chunk, "assembled chunk");

    assemble::check(&chunk, &chunk_name(origin))?;
    tracing::debug!(instrs = instrs.len(), origin, "compiled template");

    Ok(Program {
        origin: origin.map(String::from),
        chunk,
    })
}

/// Returns the name Lua uses for the chunk in error messages.
pub fn chunk_name(origin: Option<&str>) -> String {
    format!("={}", origin.unwrap_or(ANONYMOUS))
}
