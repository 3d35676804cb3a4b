//! The block tree that a running template writes its output into.
//!
//! Blocks are stored in an arena and refer to each other by [`BlockId`]. A
//! block is keyed by its name within the namespace of the block that was open
//! when it was first opened, so the same name nested under different parents
//! denotes different blocks.

use std::collections::HashMap;

/// The name of the block that every render starts in.
pub const ROOT: &str = "root";

/// Prefix on a block name that appends to the existing content instead of
/// replacing it.
pub const APPEND_SIGIL: char = '+';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(usize);

#[cfg_attr(internal_debug, derive(Debug))]
#[derive(Default)]
pub struct BlockTree {
    blocks: Vec<Block>,
    names: HashMap<(Option<BlockId>, String), BlockId>,
    root: Option<BlockId>,
    current: Option<BlockId>,
}

#[cfg_attr(internal_debug, derive(Debug))]
struct Block {
    parent: Option<BlockId>,
    content: Vec<Entry>,
}

#[derive(Debug, PartialEq)]
enum Entry {
    Literal(String),
    Block(BlockId),
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the named block within the currently open block.
    ///
    /// The block is created on first use and its content is cleared unless the
    /// name carries the append sigil. The block is referenced from its parent
    /// at the position it was first opened; opening it again never moves it.
    pub fn open(&mut self, name: &str) -> BlockId {
        let (append, name) = match name.strip_prefix(APPEND_SIGIL) {
            Some(name) => (true, name),
            None => (false, name),
        };

        let parent = self.current;
        let id = match self.names.get(&(parent, name.to_owned())) {
            Some(&id) => id,
            None => {
                let id = BlockId(self.blocks.len());
                self.blocks.push(Block {
                    parent,
                    content: Vec::new(),
                });
                self.names.insert((parent, name.to_owned()), id);
                id
            }
        };

        if !append {
            self.blocks[id.0].content.clear();
        }

        match parent {
            Some(parent) => {
                let content = &mut self.blocks[parent.0].content;
                if !content.contains(&Entry::Block(id)) {
                    content.push(Entry::Block(id));
                }
            }
            None => {
                self.root.get_or_insert(id);
            }
        }

        self.current = Some(id);
        id
    }

    /// Closes the currently open block, making its parent the open block.
    ///
    /// Closing a block without a parent does nothing.
    pub fn close(&mut self) {
        if let Some(parent) = self.current.and_then(|id| self.blocks[id.0].parent) {
            self.current = Some(parent);
        }
    }

    /// Appends a literal to the currently open block.
    pub fn append(&mut self, value: String) {
        let id = self.current();
        self.blocks[id.0].content.push(Entry::Literal(value));
    }

    /// Strips trailing whitespace from the most recent literals of the
    /// currently open block.
    ///
    /// Walks backwards until a literal with non-whitespace content remains or
    /// a nested block is reached. Nested blocks are never modified.
    pub fn trim(&mut self) {
        let id = self.current();
        for entry in self.blocks[id.0].content.iter_mut().rev() {
            match entry {
                Entry::Literal(s) => {
                    s.truncate(s.trim_end().len());
                    if !s.is_empty() {
                        break;
                    }
                }
                Entry::Block(_) => break,
            }
        }
    }

    /// Flattens the root block into a string.
    pub fn render_root(&self) -> String {
        match self.root {
            Some(root) => self.render(root),
            None => String::new(),
        }
    }

    /// Flattens the given block into a string.
    pub fn render(&self, id: BlockId) -> String {
        let mut buf = String::new();
        self.render_into(id, &mut buf);
        buf
    }

    fn render_into(&self, id: BlockId, buf: &mut String) {
        for entry in &self.blocks[id.0].content {
            match entry {
                Entry::Literal(s) => buf.push_str(s),
                Entry::Block(child) => self.render_into(*child, buf),
            }
        }
    }

    /// Returns the currently open block, opening the root if nothing is open.
    fn current(&mut self) -> BlockId {
        match self.current {
            Some(id) => id,
            None => self.open(ROOT),
        }
    }
}
