// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! This crate provides the pattern matching used by the shell's parameter
//! expansion and pathname expansion: a globbing pattern is compiled into a
//! regular expression that is then matched against candidate strings.
//!
//! The following syntax is supported in patterns:
//!
//! - Any single character (`?`)
//! - Any character sequence (`*`)
//! - Bracket expression (`[...]`)
//!     - Character literals
//!     - Character ranges (e.g. `a-z`)
//!     - Complement (`[!...]`)
//!     - Collating symbols (e.g. `[.ch.]`)
//!     - Equivalence classes (e.g. `[=a=]`)
//!     - Character classes (`[:alpha:]`)
//!
//! The implementation is not locale-aware. Collating symbols and equivalence
//! classes only match the specified character sequence itself, and character
//! classes only match ASCII characters. A match always covers the whole
//! candidate string, which is what both the parameter-expansion pattern
//! operators and pathname expansion need.

mod ast;

pub use self::ast::{Ast, Atom, Bracket, BracketAtom, BracketItem, PatternChar, PatternChars};

use regex::Regex;
use thiserror::Error;

/// Error in pattern parsing or compilation
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// A character class with an unsupported name, e.g. `[[:foo:]]`
    #[error("undefined character class [:{0}:]")]
    UndefinedCharClass(String),

    /// A collating symbol or equivalence class without content, e.g. `[[..]]`
    #[error("empty collating symbol or equivalence class")]
    EmptyCollatingSymbol,

    /// A character class used as a range endpoint, e.g. `[[:digit:]-9]`
    #[error("character class used in a range")]
    CharClassInRange,

    /// A bracket expression with no content
    #[error("empty bracket expression")]
    EmptyBracket,

    /// The translated regular expression was rejected by the regex engine,
    /// e.g. because the pattern exceeds the compiled size limit
    #[error("pattern could not be compiled: {0}")]
    CompileFailure(String),
}

/// Compiled globbing pattern
///
/// A `Pattern` is created from a sequence of [`PatternChar`]s, usually a
/// [`PatternChars`] decoder over the pattern string, and matches whole
/// strings.
///
/// ```
/// # use rush_fnmatch::{Pattern, PatternChars};
/// let p = Pattern::parse(PatternChars::with_escape("fo*")).unwrap();
/// assert!(p.is_match("foobar"));
/// assert!(!p.is_match("bar"));
/// ```
#[derive(Clone, Debug)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles a pattern.
    pub fn parse<I>(pattern: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        <I as IntoIterator>::IntoIter: Clone,
    {
        let ast = Ast::new(pattern)?;
        let regex = ast.to_regex()?;
        Ok(Pattern { regex })
    }

    /// Returns whether the whole of `text` matches the pattern.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}
