// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Symbol tables
//!
//! Shell variables live in a stack of scopes. Each [`Scope`] is an
//! insertion-ordered sequence of [`Entry`]s with unique names; the stack
//! bottom (index 0) is the global scope and the top is the local scope.
//! Lookup walks the stack from the top down and returns the first binding,
//! so a local binding hides a global one of the same name.

use bitflags::bitflags;
use rush_syntax::syntax::Node;
use std::fmt::Write;
use thiserror::Error;

/// Maximum number of scopes on the stack
pub const MAX_SCOPES: usize = 256;

bitflags! {
    /// Attribute flags of a symbol-table entry
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct EntryFlags: u32 {
        /// The entry is passed to the environment of executed commands.
        const EXPORT = 1 << 0;
    }
}

/// Value of a symbol-table entry
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntryValue {
    /// Plain string value
    Scalar(String),
    /// Body of a shell function
    Function(Node),
}

/// Named entry in a scope
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    name: String,
    /// Current value; `None` when the entry exists but has no value
    pub value: Option<EntryValue>,
    /// Attribute flags
    pub flags: EntryFlags,
}

impl Entry {
    fn new<S: Into<String>>(name: S) -> Self {
        Entry {
            name: name.into(),
            value: None,
            flags: EntryFlags::empty(),
        }
    }

    /// Name of the entry, unique within its scope.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the value with a copy of the given string, or clears it.
    pub fn set_value(&mut self, value: Option<&str>) {
        self.value = value.map(|v| EntryValue::Scalar(v.to_owned()));
    }

    /// The scalar value, if the entry has one.
    #[must_use]
    pub fn str_value(&self) -> Option<&str> {
        match &self.value {
            Some(EntryValue::Scalar(value)) => Some(value),
            _ => None,
        }
    }
}

/// One scope: an insertion-ordered sequence of entries
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Scope {
    level: usize,
    entries: Vec<Entry>,
}

impl Scope {
    fn new(level: usize) -> Self {
        Scope {
            level,
            entries: Vec::new(),
        }
    }

    /// Nesting level of this scope; the global scope is level 0.
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Finds an entry in this scope only.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    /// Unlinks the named entry. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.entries.iter().position(|e| e.name == name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Renders the scope as the table printed by the `dump` builtin.
    #[must_use]
    pub fn format_table(&self) -> String {
        let indent = self.level * 4;
        let mut out = String::new();
        let pad = "";
        writeln!(out, "{pad:indent$}Symbol table [Level {}]:", self.level).unwrap();
        writeln!(out, "{pad:indent$}===========================").unwrap();
        writeln!(out, "{pad:indent$}  No               Symbol                    Val").unwrap();
        writeln!(
            out,
            "{pad:indent$}------ -------------------------------- ------------"
        )
        .unwrap();
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(
                out,
                "{pad:indent$}[{i:04}] {:<32} '{}'",
                entry.name,
                entry.str_value().unwrap_or(""),
            )
            .unwrap();
        }
        writeln!(
            out,
            "{pad:indent$}------ -------------------------------- ------------"
        )
        .unwrap();
        out
    }
}

/// Error returned when the scope stack is full
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
#[error("too many nested variable scopes")]
pub struct PushScopeError;

/// Stack of scopes
///
/// The stack starts with a single global scope. Further scopes can be
/// pushed and popped; popping the last scope leaves the stack empty, in
/// which case there is neither a local nor a global scope.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SymtabStack {
    scopes: Vec<Scope>,
}

impl SymtabStack {
    /// Creates a stack holding the global scope.
    #[must_use]
    pub fn new() -> Self {
        SymtabStack {
            scopes: vec![Scope::new(0)],
        }
    }

    /// The topmost scope.
    #[must_use]
    pub fn local(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    /// The bottom scope (index 0).
    #[must_use]
    pub fn global(&self) -> Option<&Scope> {
        self.scopes.first()
    }

    /// Pushes a new scope and makes it local.
    pub fn push_scope(&mut self) -> Result<(), PushScopeError> {
        if self.scopes.len() >= MAX_SCOPES {
            return Err(PushScopeError);
        }
        let level = self.scopes.last().map_or(0, |s| s.level + 1);
        self.scopes.push(Scope::new(level));
        Ok(())
    }

    /// Removes and returns the topmost scope.
    pub fn pop_scope(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    /// Finds the named entry, walking the stack from the top down.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.scopes.iter().rev().find_map(|s| s.lookup(name))
    }

    /// Like [`get`](Self::get) but returns a mutable reference.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.scopes.iter_mut().rev().find_map(|s| s.lookup_mut(name))
    }

    /// Returns the local-scope entry with the given name, creating an empty
    /// one if there is none.
    ///
    /// Returns `None` for an empty name or when the stack has no scopes.
    pub fn add(&mut self, name: &str) -> Option<&mut Entry> {
        if name.is_empty() {
            return None;
        }
        let scope = self.scopes.last_mut()?;
        match scope.entries.iter().position(|e| e.name == name) {
            Some(index) => Some(&mut scope.entries[index]),
            None => {
                scope.entries.push(Entry::new(name));
                scope.entries.last_mut()
            }
        }
    }
}

impl Default for SymtabStack {
    fn default() -> Self {
        Self::new()
    }
}
