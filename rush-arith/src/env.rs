// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Variable environment
//!
//! This crate does not implement any mechanism for storing variables. The
//! caller of [`eval`](crate::eval) provides an implementation of the [`Env`]
//! trait, which is used to access the variables that appear in the evaluated
//! expression.

use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;

/// Interface for accessing variables during evaluation
pub trait Env {
    /// Object returned on an assignment error
    type AssignVariableError;

    /// Returns the value of the specified variable, or `None` if the
    /// variable is not defined.
    fn get_variable(&self, name: &str) -> Option<&str>;

    /// Assigns a new value to the specified variable, creating it if
    /// necessary.
    fn assign_variable(
        &mut self,
        name: &str,
        value: String,
    ) -> Result<(), Self::AssignVariableError>;
}

impl Env for HashMap<String, String> {
    type AssignVariableError = Infallible;

    fn get_variable(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }

    fn assign_variable(&mut self, name: &str, value: String) -> Result<(), Infallible> {
        self.insert(name.to_owned(), value);
        Ok(())
    }
}

impl Env for BTreeMap<String, String> {
    type AssignVariableError = Infallible;

    fn get_variable(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }

    fn assign_variable(&mut self, name: &str, value: String) -> Result<(), Infallible> {
        self.insert(name.to_owned(), value);
        Ok(())
    }
}
