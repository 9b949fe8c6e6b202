// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Arithmetic expansion
//!
//! This module bridges the evaluator in `rush-arith` to the shell's symbol
//! table: variables referenced in an expression resolve through the stack,
//! and assignments create or update entries in the local scope.

use rush_env::Env;
use std::convert::Infallible;

/// Adapter giving the arithmetic evaluator access to shell variables
pub struct SymtabEnv<'a>(pub &'a mut Env);

impl rush_arith::Env for SymtabEnv<'_> {
    type AssignVariableError = Infallible;

    fn get_variable(&self, name: &str) -> Option<&str> {
        self.0.variable_value(name)
    }

    fn assign_variable(&mut self, name: &str, value: String) -> Result<(), Infallible> {
        // update the visible binding if there is one, else create a local
        match self.0.variables.get_mut(name) {
            Some(entry) => entry.set_value(Some(&value)),
            None => {
                if let Some(entry) = self.0.variables.add(name) {
                    entry.set_value(Some(&value));
                }
            }
        }
        Ok(())
    }
}

/// Performs arithmetic expansion.
///
/// The expression may still be wrapped as `$((…))`; the wrapper is
/// stripped. The result is the value formatted as a decimal signed integer.
/// An empty expression or an evaluation error yields `None`; errors print a
/// diagnostic and leave the original text in place.
pub fn arithm_expand(env: &mut Env, orig: &str) -> Option<String> {
    let expression = match orig.strip_prefix("$((") {
        Some(inner) => inner.strip_suffix("))").unwrap_or(inner),
        None => orig,
    };

    match rush_arith::eval(expression, &mut SymtabEnv(env)) {
        Ok(Some(value)) => Some(value.to_string()),
        Ok(None) => None,
        Err(e) => {
            eprintln!("error: {e}");
            None
        }
    }
}
