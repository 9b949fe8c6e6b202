// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! This crate defines the lexical and syntactic front end of the shell:
//! the [input source](source) that feeds characters to the
//! [tokenizer](lexer), and the [parser] that turns the resulting tokens
//! into a [command tree](syntax).
//!
//! The tokenizer is deliberately coarse: it splits the command line on
//! unquoted blanks while copying quoted spans, backslash escapes, and
//! `$`-introduced substitution spans into the token verbatim. Interpreting
//! that preserved structure is the job of the word-expansion pipeline, which
//! lives downstream of this crate.

pub mod lexer;
pub mod parser;
pub mod source;
pub mod syntax;
