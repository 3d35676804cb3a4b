#![allow(clippy::wrong_self_convention)]

mod core;
pub(crate) mod tree;

use std::io;

use crate::render::core::{empty_input, execute, input, Input};
use crate::types::program::Program;
use crate::{Error, Result};

/// A renderer that executes a compiled [`Procedure`][crate::Procedure].
///
/// This struct is created by [`Procedure::render`][crate::Procedure::render].
/// Every call to [`.to_string()`][Renderer::to_string] or
/// [`.to_writer(..)`][Renderer::to_writer] runs the template in its own Lua
/// state with its own block tree, so renders never observe each other.
#[must_use = "must call `.to_string()` or `.to_writer(..)` on the renderer"]
pub struct Renderer<'render> {
    program: &'render Program,
    data: Input<'render>,
    options: Option<Input<'render>>,
}

impl<'render> Renderer<'render> {
    pub(crate) fn with_serde<S>(program: &'render Program, data: S) -> Self
    where
        S: serde::Serialize + 'render,
    {
        Self {
            program,
            data: input(data),
            options: None,
        }
    }

    /// Set the options value.
    ///
    /// Unlike the data, the keys of the options are not brought into scope.
    /// The whole value is available to the template as `_OPTIONS`. Defaults to
    /// an empty table.
    pub fn with_options<O>(mut self, options: O) -> Self
    where
        O: serde::Serialize + 'render,
    {
        self.options = Some(input(options));
        self
    }

    /// Render the template to a string.
    pub fn to_string(self) -> Result<String> {
        let options = self.options.unwrap_or_else(empty_input);
        execute(self.program, self.data, options)
    }

    /// Render the template to the given writer.
    pub fn to_writer<W>(self, mut w: W) -> Result<()>
    where
        W: io::Write,
    {
        let s = self.to_string()?;
        w.write_all(s.as_bytes())
            .map_err(|err| Error::io("failed to write rendered template", err))
    }
}
