// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Shell startup initialization

use crate::symtab::EntryFlags;
use crate::Env;

impl Env {
    /// Seeds the global scope from the process environment.
    ///
    /// Every `NAME=VALUE` pair becomes an exported entry. Afterwards the
    /// prompt variables `PS1` and `PS2` are set to their defaults,
    /// overriding any inherited values.
    pub fn init_from_environment(&mut self) {
        for (name, value) in std::env::vars() {
            if let Some(entry) = self.variables.add(&name) {
                entry.set_value(Some(&value));
                entry.flags |= EntryFlags::EXPORT;
            }
        }

        for (name, default) in [("PS1", "$ "), ("PS2", "> ")] {
            if let Some(entry) = self.variables.add(name) {
                entry.set_value(Some(default));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_get_defaults() {
        let mut env = Env::new();
        env.init_from_environment();
        assert_eq!(env.variable_value("PS1"), Some("$ "));
        assert_eq!(env.variable_value("PS2"), Some("> "));
    }

    #[test]
    fn environment_variables_are_imported_and_exported() {
        // PATH is about the only variable we can rely on in a test run
        if std::env::var("PATH").is_err() {
            return;
        }
        let mut env = Env::new();
        env.init_from_environment();
        let entry = env.variables.get("PATH").unwrap();
        assert!(entry.str_value().is_some());
        assert!(entry.flags.contains(EntryFlags::EXPORT));
    }
}
