use std::cell::RefCell;

use mlua::{Function, Lua, LuaSerdeExt, SerializeOptions, Table, Value as LuaValue};
use serde::Serialize;

use crate::compile::chunk_name;
use crate::render::tree::BlockTree;
use crate::types::program::Program;
use crate::Result;

/// A value that is converted into Lua once the state for a render exists.
pub(crate) type Input<'render> = Box<dyn FnOnce(&Lua) -> mlua::Result<LuaValue> + 'render>;

/// Builds the chunk environment. Reads fall back to the data scope and then to
/// the Lua globals, writes stay in the environment so the data is never
/// modified.
const ENVIRONMENT: &str = r#"
local data, globals = ...
if data == nil then
    data = {}
elseif type(data) ~= "table" then
    error("expected template data to be a map, found " .. type(data), 0)
end
return setmetatable({}, {
    __index = function(_, key)
        local value = data[key]
        if value == nil then
            return globals[key]
        end
        return value
    end,
})
"#;

pub(crate) fn input<'render, S>(value: S) -> Input<'render>
where
    S: Serialize + 'render,
{
    Box::new(move |lua| lua.to_value_with(&value, serialize_options()))
}

pub(crate) fn empty_input<'render>() -> Input<'render> {
    Box::new(|lua| lua.create_table().map(LuaValue::Table))
}

fn serialize_options() -> SerializeOptions {
    SerializeOptions::new()
        .serialize_none_to_null(false)
        .serialize_unit_to_null(false)
}

/// Runs the program in a fresh Lua state against a fresh block tree and
/// returns the flattened root block.
pub(crate) fn execute(program: &Program, data: Input<'_>, options: Input<'_>) -> Result<String> {
    let lua = Lua::new();
    let data = data(&lua)?;
    let options = options(&lua)?;

    let env: Table = lua
        .load(ENVIRONMENT)
        .set_name("=environment")
        .call((data, lua.globals()))?;
    let tostring: Function = lua.globals().get("tostring")?;

    let chunk = lua
        .load(program.chunk.as_str())
        .set_name(chunk_name(program.origin.as_deref()))
        .set_environment(env);

    let tree = RefCell::new(BlockTree::new());
    let output = lua.scope(|scope| {
        // Lua strings are bytes, invalid UTF-8 is replaced rather than failing.
        let append = scope.create_function(|_, value: LuaValue| {
            let s: mlua::String = tostring.call(value)?;
            tree.borrow_mut().append(s.to_string_lossy());
            Ok(())
        })?;
        let open = scope.create_function(|_, name: String| {
            tree.borrow_mut().open(&name);
            Ok(())
        })?;
        let close = scope.create_function(|_, ()| {
            tree.borrow_mut().close();
            Ok(())
        })?;
        let trim = scope.create_function(|_, ()| {
            tree.borrow_mut().trim();
            Ok(())
        })?;
        let render = scope.create_function(|_, ()| Ok(tree.borrow().render_root()))?;
        chunk.call::<String>((append, open, close, trim, render, options))
    })?;

    Ok(output)
}
