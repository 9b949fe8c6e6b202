// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Builtin utilities
//!
//! A builtin is a command implemented in-process rather than by fork/exec.
//! The executor compares `argv[0]` against the names registered in
//! [`Env::builtins`](crate::Env) before looking for an external program.
//! The registry is an ordered list, open for extension.

use crate::Env;

/// Builtin utility: a name and the function that implements it
#[derive(Clone, Copy, Debug)]
pub struct Builtin {
    /// Name the executor matches against `argv[0]`
    pub name: &'static str,
    /// Implementation; receives the whole argv and returns an exit status
    pub execute: fn(env: &mut Env, args: &[String]) -> i32,
}

/// The builtins registered by default.
#[must_use]
pub fn default_builtins() -> Vec<Builtin> {
    vec![Builtin {
        name: "dump",
        execute: dump,
    }]
}

/// The `dump` builtin: prints the local scope's entries on standard error.
pub fn dump(env: &mut Env, _args: &[String]) -> i32 {
    if let Some(scope) = env.variables.local() {
        eprint!("{}", scope.format_table());
    }
    0
}
