// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Abstract syntax tree for parsed commands
//!
//! The tree is intentionally small: a simple command is a
//! [`Command`](NodeKind::Command) node whose ordered children are
//! [`Word`](NodeKind::Word) leaves carrying the raw token text. Words stay
//! unexpanded until the executor pushes them through the word-expansion
//! pipeline.

/// Type of an AST node
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeKind {
    /// Simple command; children are the words of the command line.
    Command,
    /// One raw word of a command.
    Word,
}

/// Node of the command tree
///
/// Each node owns its string value and its children. Children keep their
/// insertion order, which for a command is the order of the words on the
/// command line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    /// Type of this node
    pub kind: NodeKind,
    /// String value of this node, if any
    ///
    /// Word leaves carry the raw token text; command nodes have no value.
    pub value: Option<String>,
    /// Child nodes in insertion order
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a node with no value and no children.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            value: None,
            children: Vec::new(),
        }
    }

    /// Creates a word leaf carrying the given text.
    #[must_use]
    pub fn word<S: Into<String>>(text: S) -> Self {
        Node {
            kind: NodeKind::Word,
            value: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// Appends a child after the existing children.
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Returns the string value, if any.
    #[must_use]
    pub fn str_value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}
