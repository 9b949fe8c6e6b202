// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Parameter expansion
//!
//! Implements `$name` and the `${…}` operator forms:
//!
//! | syntax            | variable set and nonempty | variable unset or empty |
//! |-------------------|---------------------------|-------------------------|
//! | `$var`, `${var}`  | the value                 | empty                   |
//! | `${var:-word}`    | the value                 | `word`                  |
//! | `${var:=word}`    | the value                 | `word`, assigned to var |
//! | `${var:?word}`    | the value                 | error                   |
//! | `${var:+word}`    | `word`                    | empty                   |
//! | `${var%pat}`      | value minus shortest matching suffix | empty        |
//! | `${var%%pat}`     | value minus longest matching suffix  | empty        |
//! | `${var#pat}`      | value minus shortest matching prefix | empty        |
//! | `${var##pat}`     | value minus longest matching prefix  | empty        |
//! | `${#var}`         | length of the value       | 0                       |
//!
//! The colon is optional; with or without it, an empty value and an unset
//! variable take the same branch. The chosen string is itself word-expanded
//! before it is substituted (and before a `:=` assignment is stored), while
//! the patterns of `%` and `#` are used verbatim.

use crate::expansion::{word_expand_to_str, ExpansionError};
use crate::pattern;
use rush_env::Env;

/// Performs parameter expansion on one `$name` or `${…}` span.
///
/// Returns `Ok(None)` when the span is to be left in place (malformed input
/// such as an empty `${}`), `Ok(Some(_))` with the replacement text, or an
/// error that aborts the whole word expansion.
pub fn var_expand(env: &mut Env, orig: &str) -> Result<Option<String>, ExpansionError> {
    let Some(body) = orig.strip_prefix('$') else {
        return Ok(None);
    };
    let body = match body.strip_prefix('{') {
        Some(inner) => inner.strip_suffix('}').unwrap_or(inner),
        None => body,
    };
    if body.is_empty() {
        return Ok(None);
    }

    // a leading # requests the length of the expansion
    let mut get_length = false;
    let mut body = body;
    if let Some(rest) = body.strip_prefix('#') {
        if body.contains(':') {
            return Err(ExpansionError::InvalidSubstitution(body.to_owned()));
        }
        get_length = true;
        body = rest;
        if body.is_empty() {
            return Ok(None);
        }
    }

    // the name ends at the first colon, or at the first operator character
    let (name, sub) = match body.find(':') {
        Some(colon) => (&body[..colon], Some(&body[colon + 1..])),
        None => match body.find(['-', '=', '?', '+', '%', '#']) {
            Some(op) => (&body[..op], Some(&body[op..])),
            None => (body, None),
        },
    };

    let value = env
        .variables
        .get(name)
        .and_then(|e| e.str_value())
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned);

    let mut assign = false;
    let chosen: String;

    match &value {
        // variable unset or empty
        None => match sub {
            Some(sub) if !sub.is_empty() => {
                let op = sub.chars().next().unwrap_or_default();
                let rest = &sub[op.len_utf8()..];
                match op {
                    '-' => chosen = rest.to_owned(),
                    '=' => {
                        // assign the expansion of rest, not rest itself
                        chosen = rest.to_owned();
                        assign = true;
                    }
                    '?' => {
                        let message = if rest.is_empty() {
                            "parameter not set".to_owned()
                        } else {
                            rest.to_owned()
                        };
                        return Err(ExpansionError::ParameterNotSet {
                            name: name.to_owned(),
                            message,
                        });
                    }
                    '+' => chosen = String::new(),
                    // a pattern cannot match an empty value
                    '#' | '%' => chosen = String::new(),
                    _ => return Err(ExpansionError::InvalidSubstitution(body.to_owned())),
                }
            }
            _ => chosen = String::new(),
        },

        // variable set and nonempty
        Some(value) => match sub {
            Some(sub) if !sub.is_empty() => {
                let op = sub.chars().next().unwrap_or_default();
                let rest = &sub[op.len_utf8()..];
                match op {
                    '-' | '=' | '?' => chosen = value.clone(),
                    '+' => chosen = rest.to_owned(),
                    '%' => {
                        let expanded = word_expand_to_str(env, value)?;
                        let (longest, pat) = match rest.strip_prefix('%') {
                            Some(pat) => (true, pat),
                            None => (false, rest),
                        };
                        let index = pattern::match_suffix(pat, &expanded, longest);
                        return Ok(Some(if index == 0 {
                            expanded
                        } else {
                            expanded[..index].to_owned()
                        }));
                    }
                    '#' => {
                        let expanded = word_expand_to_str(env, value)?;
                        let (longest, pat) = match rest.strip_prefix('#') {
                            Some(pat) => (true, pat),
                            None => (false, rest),
                        };
                        let index = pattern::match_prefix(pat, &expanded, longest);
                        return Ok(Some(if index == 0 {
                            expanded
                        } else {
                            expanded[index..].to_owned()
                        }));
                    }
                    _ => return Err(ExpansionError::InvalidSubstitution(body.to_owned())),
                }
            }
            _ => chosen = value.clone(),
        },
    }

    // the chosen string is expanded recursively before use
    let expanded = word_expand_to_str(env, &chosen)?;

    if assign {
        match env.variables.get_mut(name) {
            Some(entry) => entry.set_value(Some(&expanded)),
            None => {
                if let Some(entry) = env.variables.add(name) {
                    entry.set_value(Some(&expanded));
                }
            }
        }
    }

    if get_length {
        return Ok(Some(expanded.chars().count().to_string()));
    }
    Ok(Some(expanded))
}
