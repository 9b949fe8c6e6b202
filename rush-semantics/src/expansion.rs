// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! The word-expansion pipeline
//!
//! [`word_expand`] takes one raw word from the parser and produces the list
//! of fields it expands to. The stages run in the POSIX order: tilde
//! expansion, parameter expansion, command substitution, and arithmetic
//! expansion happen in one left-to-right scan over the word; the result
//! then goes through field splitting (only if something was expanded or
//! unquoted whitespace was seen), pathname expansion, and quote removal.
//!
//! Substituted text is re-quoted on the way in (see [`rush_quote::quote`])
//! so that the later stages treat it literally.

pub mod arith;
pub mod command_subst;
pub mod field_split;
pub mod param;
pub mod pathname;
pub mod quote_removal;
pub mod tilde;

use itertools::Itertools;
use rush_env::Env;
use rush_syntax::lexer::{find_closing_brace, find_closing_quote};
use thiserror::Error;

/// Error that aborts an entire word expansion
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum ExpansionError {
    /// `${var:?message}` with the variable unset or empty
    #[error("{name}: {message}")]
    ParameterNotSet {
        /// Name of the offending variable
        name: String,
        /// Message after the `?`, or "parameter not set"
        message: String,
    },

    /// A `${…}` form with an unknown operator or misplaced `:`
    #[error("invalid variable substitution: {0}")]
    InvalidSubstitution(String),
}

/// Checks for a valid shell name: alphabetic or underscore first, then
/// alphanumerics and underscores.
fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Which expansion a substituted span goes through
enum SubstFn {
    Tilde,
    Var,
    Command,
    Arith,
}

/// Replaces `chars[start..start+len]` with its expansion.
///
/// The expansion result is re-quoted before splicing; `add_quotes`
/// additionally wraps it in double quotes. When the expansion declines
/// (`None`), the span is left in place. Returns the index just past the
/// substituted (or skipped) text.
fn substitute_word(
    env: &mut Env,
    chars: &mut Vec<char>,
    start: usize,
    len: usize,
    func: SubstFn,
    add_quotes: bool,
) -> Result<usize, ExpansionError> {
    let extracted: String = chars[start..start + len].iter().collect();

    let result = match func {
        SubstFn::Tilde => tilde::tilde_expand(env, &extracted),
        SubstFn::Var => param::var_expand(env, &extracted)?,
        SubstFn::Command => command_subst::command_substitute(&extracted),
        SubstFn::Arith => arith::arithm_expand(env, &extracted),
    };

    match result {
        None => Ok(start + len),
        Some(value) => {
            let quoted = rush_quote::quote(&value, add_quotes);
            let replacement: Vec<char> = quoted.chars().collect();
            let new_len = replacement.len();
            chars.splice(start..start + len, replacement);
            Ok(start + new_len)
        }
    }
}

/// Expands one raw word into a list of fields.
///
/// An empty input yields a single empty field. Field splitting only runs
/// when an expansion was performed or unquoted whitespace was seen; the
/// result then passes through pathname expansion and quote removal.
pub fn word_expand(env: &mut Env, orig_word: &str) -> Result<Vec<String>, ExpansionError> {
    if orig_word.is_empty() {
        return Ok(vec![String::new()]);
    }

    let mut chars: Vec<char> = orig_word.chars().collect();
    let mut in_double_quotes = false;
    let mut in_var_assign = false;
    let mut var_assign_eq = 0usize;
    let mut expanded = false;

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '~' => {
                // expand only at the start of the word, or after the first
                // `=` or a `:` of a variable assignment; never inside
                // double quotes
                let expandable = !in_double_quotes
                    && (i == 0
                        || (in_var_assign
                            && (chars[i - 1] == ':'
                                || (chars[i - 1] == '=' && var_assign_eq == 1))));
                if expandable {
                    let mut tilde_quoted = false;
                    let mut j = i + 1;
                    while j < chars.len() {
                        let mut stop = false;
                        match chars[j] {
                            '\\' => {
                                tilde_quoted = true;
                                j += 1;
                            }
                            '"' | '\'' => {
                                let close = find_closing_quote(&chars[j..]);
                                if close != 0 {
                                    tilde_quoted = true;
                                    j += close;
                                }
                            }
                            '/' => stop = true,
                            ':' if in_var_assign => stop = true,
                            _ => {}
                        }
                        if stop {
                            break;
                        }
                        j += 1;
                    }

                    if tilde_quoted {
                        // a quoted prefix is not expanded at all
                        i = j + 1;
                        continue;
                    }
                    i = substitute_word(env, &mut chars, i, j - i, SubstFn::Tilde, !in_double_quotes)?;
                    expanded = true;
                    continue;
                }
            }

            '"' => in_double_quotes = !in_double_quotes,

            '=' => {
                if !in_double_quotes {
                    let prefix: String = chars[..i].iter().collect();
                    if is_name(&prefix) {
                        in_var_assign = true;
                        var_assign_eq += 1;
                    }
                }
            }

            // skip the escaped character; quote removal deletes the backslash
            '\\' => i += 1,

            '\'' => {
                if !in_double_quotes {
                    i += find_closing_quote(&chars[i..]);
                }
            }

            '`' => {
                let close = find_closing_quote(&chars[i..]);
                if close != 0 {
                    i = substitute_word(env, &mut chars, i, close + 1, SubstFn::Command, false)?;
                    expanded = true;
                    continue;
                }
            }

            '$' => match chars.get(i + 1) {
                Some('{') => {
                    let close = find_closing_brace(&chars[i + 1..]);
                    if close != 0 {
                        i = substitute_word(env, &mut chars, i, close + 2, SubstFn::Var, false)?;
                        expanded = true;
                        continue;
                    }
                }
                Some('(') => {
                    // two opening parentheses mean arithmetic expansion
                    let func = if chars.get(i + 2) == Some(&'(') {
                        SubstFn::Arith
                    } else {
                        SubstFn::Command
                    };
                    let close = find_closing_brace(&chars[i + 1..]);
                    if close != 0 {
                        i = substitute_word(env, &mut chars, i, close + 2, func, false)?;
                        expanded = true;
                        continue;
                    }
                }
                Some(&c) if c.is_ascii_alphabetic() || c == '_' => {
                    let mut j = i + 1;
                    while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '_')
                    {
                        j += 1;
                    }
                    i = substitute_word(env, &mut chars, i, j - i, SubstFn::Var, false)?;
                    expanded = true;
                    continue;
                }
                _ => {}
            },

            c => {
                if c.is_whitespace() && !in_double_quotes {
                    expanded = true;
                }
            }
        }
        i += 1;
    }

    let text: String = chars.iter().collect();
    let words = if expanded {
        field_split::field_split(env, &text)
    } else {
        None
    };
    let words = words.unwrap_or_else(|| vec![text]);

    let mut words = pathname::pathnames_expand(words);
    quote_removal::remove_quotes(&mut words);
    Ok(words)
}

/// Expands a word and joins the resulting fields into a single string.
pub fn word_expand_to_str(env: &mut Env, word: &str) -> Result<String, ExpansionError> {
    let fields = word_expand(env, word)?;
    Ok(fields.iter().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(name: &str, value: &str) -> Env {
        let mut env = Env::new();
        env.variables.add(name).unwrap().set_value(Some(value));
        env
    }

    #[test]
    fn empty_word_is_a_single_empty_field() {
        let mut env = Env::new();
        assert_eq!(word_expand(&mut env, ""), Ok(vec![String::new()]));
    }

    #[test]
    fn plain_word_passes_through() {
        let mut env = Env::new();
        assert_eq!(word_expand(&mut env, "hello"), Ok(vec!["hello".to_string()]));
    }

    #[test]
    fn variable_expansion() {
        let mut env = env_with("FOO", "bar");
        assert_eq!(word_expand(&mut env, "$FOO"), Ok(vec!["bar".to_string()]));
        assert_eq!(word_expand(&mut env, "${FOO}"), Ok(vec!["bar".to_string()]));
        assert_eq!(
            word_expand(&mut env, "x${FOO}y"),
            Ok(vec!["xbary".to_string()])
        );
    }

    #[test]
    fn unset_variable_vanishes() {
        let mut env = Env::new();
        assert_eq!(word_expand(&mut env, "$FOO"), Ok(vec![String::new()]));
    }

    #[test]
    fn default_value_does_not_set() {
        let mut env = Env::new();
        assert_eq!(
            word_expand(&mut env, "${FOO:-baz}"),
            Ok(vec!["baz".to_string()])
        );
        assert_eq!(env.variable_value("FOO"), None);
    }

    #[test]
    fn assign_default_sets_the_variable() {
        let mut env = Env::new();
        assert_eq!(
            word_expand(&mut env, "${FOO:=qux}"),
            Ok(vec!["qux".to_string()])
        );
        assert_eq!(env.variable_value("FOO"), Some("qux"));
    }

    #[test]
    fn parameter_error_aborts_the_expansion() {
        let mut env = Env::new();
        assert_eq!(
            word_expand(&mut env, "${FOO:?}"),
            Err(ExpansionError::ParameterNotSet {
                name: "FOO".to_string(),
                message: "parameter not set".to_string(),
            })
        );
    }

    #[test]
    fn field_splitting_of_expanded_text() {
        let mut env = env_with("WORDS", "one two three");
        assert_eq!(
            word_expand(&mut env, "$WORDS"),
            Ok(vec![
                "one".to_string(),
                "two".to_string(),
                "three".to_string()
            ])
        );
    }

    #[test]
    fn quoted_text_is_not_split() {
        let mut env = Env::new();
        assert_eq!(
            word_expand(&mut env, "\"a b\""),
            Ok(vec!["a b".to_string()])
        );
    }

    #[test]
    fn single_quotes_suppress_expansion() {
        let mut env = env_with("FOO", "bar");
        assert_eq!(
            word_expand(&mut env, "'$FOO'"),
            Ok(vec!["$FOO".to_string()])
        );
    }

    #[test]
    fn backslash_suppresses_expansion() {
        let mut env = env_with("FOO", "bar");
        assert_eq!(
            word_expand(&mut env, r"\$FOO"),
            Ok(vec!["$FOO".to_string()])
        );
    }

    #[test]
    fn arithmetic_expansion() {
        let mut env = Env::new();
        assert_eq!(
            word_expand(&mut env, "$((2 + 3 * 4))"),
            Ok(vec!["14".to_string()])
        );
        assert_eq!(
            word_expand(&mut env, "$((0x10 + 010 + 0b11))"),
            Ok(vec!["27".to_string()])
        );
        assert_eq!(
            word_expand(&mut env, "$((16#ff))"),
            Ok(vec!["255".to_string()])
        );
    }

    #[test]
    fn arithmetic_error_keeps_the_original_text() {
        let mut env = Env::new();
        assert_eq!(
            word_expand(&mut env, "$((1/0))"),
            Ok(vec!["$((1/0))".to_string()])
        );
    }

    #[test]
    fn command_substitution_forms() {
        let mut env = Env::new();
        assert_eq!(
            word_expand(&mut env, "$(echo hi)"),
            Ok(vec!["hi".to_string()])
        );
        assert_eq!(
            word_expand(&mut env, "`echo hi`"),
            Ok(vec!["hi".to_string()])
        );
    }

    #[test]
    fn command_substitution_output_is_split() {
        let mut env = Env::new();
        assert_eq!(
            word_expand(&mut env, "$(echo one two)"),
            Ok(vec!["one".to_string(), "two".to_string()])
        );
    }

    #[test]
    fn tilde_expands_to_home() {
        let mut env = env_with("HOME", "/home/me");
        assert_eq!(word_expand(&mut env, "~"), Ok(vec!["/home/me".to_string()]));
        assert_eq!(
            word_expand(&mut env, "~/bin"),
            Ok(vec!["/home/me/bin".to_string()])
        );
    }

    #[test]
    fn tilde_not_at_start_is_literal() {
        let mut env = env_with("HOME", "/home/me");
        assert_eq!(word_expand(&mut env, "a~b"), Ok(vec!["a~b".to_string()]));
    }

    #[test]
    fn quoted_tilde_is_literal() {
        let mut env = env_with("HOME", "/home/me");
        assert_eq!(word_expand(&mut env, "\"~\""), Ok(vec!["~".to_string()]));
        assert_eq!(word_expand(&mut env, "'~'"), Ok(vec!["~".to_string()]));
    }

    #[test]
    fn tilde_in_variable_assignment() {
        let mut env = env_with("HOME", "/home/me");
        assert_eq!(
            word_expand(&mut env, "P=~/bin:~/sbin"),
            Ok(vec!["P=/home/me/bin:/home/me/sbin".to_string()])
        );
    }

    #[test]
    fn substituted_dollar_signs_stay_literal() {
        // the re-quoting protects the $ in the captured output
        let mut env = Env::new();
        assert_eq!(
            word_expand(&mut env, "$(echo '$x')"),
            Ok(vec!["$x".to_string()])
        );
    }

    #[test]
    fn word_expand_to_str_joins_fields() {
        let mut env = env_with("WORDS", "one two");
        assert_eq!(
            word_expand_to_str(&mut env, "$WORDS"),
            Ok("one two".to_string())
        );
    }

    #[test]
    fn ifs_driven_splitting() {
        let mut env = env_with("PATHS", "/a:/b:/c");
        env.variables.add("IFS").unwrap().set_value(Some(":"));
        assert_eq!(
            word_expand(&mut env, "$PATHS"),
            Ok(vec!["/a".to_string(), "/b".to_string(), "/c".to_string()])
        );
    }

    #[test]
    fn glob_expansion_of_matching_words() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["one.txt", "two.txt"] {
            std::fs::File::create(dir.path().join(name)).unwrap();
        }
        let mut env = Env::new();
        let fields = word_expand(&mut env, &format!("{}/*.txt", dir.path().display())).unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields[0].ends_with("one.txt"));
        assert!(fields[1].ends_with("two.txt"));
    }

    #[test]
    fn names_are_checked_for_assignment_context() {
        assert!(is_name("FOO"));
        assert!(is_name("_x1"));
        assert!(!is_name("1x"));
        assert!(!is_name(""));
        assert!(!is_name("a-b"));
    }
}
