// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! This crate provides a function that re-quotes a string so it can be fed
//! back into the shell's expansion pipeline as a single word.
//!
//! When the expansion pipeline substitutes the result of a tilde, parameter,
//! command, or arithmetic expansion into a word, the substituted text passes
//! through field splitting and quote removal along with the rest of the word.
//! Characters that are special to those later stages must therefore be
//! protected now. The [`quote`] function backslash-escapes every occurrence
//! of `\`, `` ` ``, `$`, and `"` and, when `add_quotes` is true, wraps the
//! whole result in double quotes so that whitespace in the substituted text
//! does not split the surrounding word.
//!
//! # Examples
//!
//! ```
//! # use rush_quote::quote;
//! assert_eq!(quote("foo", false), "foo");
//! assert_eq!(quote("", true), "\"\"");
//! assert_eq!(quote("a$b", false), "a\\$b");
//! assert_eq!(quote("home sweet home", true), "\"home sweet home\"");
//! ```

/// Quotes the argument for re-input to the shell.
///
/// Occurrences of `\`, `` ` ``, `$`, and `"` are backslash-escaped. If
/// `add_quotes` is true, the result is additionally wrapped in double quotes.
///
/// See the [module doc](self) for more details.
#[must_use]
pub fn quote(value: &str, add_quotes: bool) -> String {
    let mut result = String::with_capacity(value.len() + if add_quotes { 2 } else { 0 });
    if add_quotes {
        result.push('"');
    }
    for c in value.chars() {
        if matches!(c, '\\' | '`' | '$' | '"') {
            result.push('\\');
        }
        result.push(c);
    }
    if add_quotes {
        result.push('"');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_quoting_needed() {
        assert_eq!(quote("a", false), "a");
        assert_eq!(quote("!#%+,-./:@^~", false), "!#%+,-./:@^~");
        assert_eq!(quote("hello world", false), "hello world");
    }

    #[test]
    fn empty_value() {
        assert_eq!(quote("", false), "");
        assert_eq!(quote("", true), "\"\"");
    }

    #[test]
    fn escaped_characters() {
        assert_eq!(quote(r"\", false), r"\\");
        assert_eq!(quote("`date`", false), "\\`date\\`");
        assert_eq!(quote("$HOME", false), "\\$HOME");
        assert_eq!(quote("say \"hi\"", false), "say \\\"hi\\\"");
    }

    #[test]
    fn wrapped_in_double_quotes() {
        assert_eq!(quote("foo", true), "\"foo\"");
        assert_eq!(quote("a b", true), "\"a b\"");
        assert_eq!(quote("a\"b", true), "\"a\\\"b\"");
        assert_eq!(quote("x$y`z", true), "\"x\\$y\\`z\"");
    }
}
