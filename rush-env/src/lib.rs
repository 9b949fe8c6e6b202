// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Shell execution environment
//!
//! The [`Env`] struct bundles the state a running shell carries: the
//! [symbol-table stack](symtab) holding its variables and the
//! [builtin registry](builtin). It is created once at startup, seeded from
//! the process environment, and threaded mutably through parsing, expansion,
//! and execution.

pub mod builtin;
mod init;
pub mod symtab;

use builtin::Builtin;
use symtab::SymtabStack;

/// Shell execution environment
#[derive(Clone, Debug)]
pub struct Env {
    /// Shell variables
    pub variables: SymtabStack,
    /// Registered builtin utilities
    pub builtins: Vec<Builtin>,
}

impl Env {
    /// Creates an environment with an empty global scope and the default
    /// builtins.
    ///
    /// Call [`init_from_environment`](Self::init_from_environment) to import
    /// the process environment.
    #[must_use]
    pub fn new() -> Self {
        Env {
            variables: SymtabStack::new(),
            builtins: builtin::default_builtins(),
        }
    }

    /// Finds a registered builtin by name.
    #[must_use]
    pub fn builtin(&self, name: &str) -> Option<&Builtin> {
        self.builtins.iter().find(|b| b.name == name)
    }

    /// Convenience lookup of a variable's scalar value.
    #[must_use]
    pub fn variable_value(&self, name: &str) -> Option<&str> {
        self.variables.get(name)?.str_value()
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_env_has_default_builtins() {
        let env = Env::new();
        assert!(env.builtin("dump").is_some());
        assert!(env.builtin("missing").is_none());
    }

    #[test]
    fn variable_value_walks_the_stack() {
        let mut env = Env::new();
        env.variables.add("FOO").unwrap().set_value(Some("bar"));
        assert_eq!(env.variable_value("FOO"), Some("bar"));
        assert_eq!(env.variable_value("BAR"), None);

        env.variables.push_scope().unwrap();
        env.variables.add("FOO").unwrap().set_value(Some("baz"));
        assert_eq!(env.variable_value("FOO"), Some("baz"));
    }

    #[test]
    fn unset_entry_has_no_value() {
        let mut env = Env::new();
        env.variables.add("FOO").unwrap();
        assert_eq!(env.variable_value("FOO"), None);
    }
}
