// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Pathname expansion

use crate::pattern;

/// Expands glob patterns in a word list.
///
/// Each word containing glob metacharacters is replaced, in place in the
/// list, by its sorted filename matches. Matches named `.` or `..` or
/// starting like `./` are dropped. A word with no (surviving) matches is
/// kept verbatim.
pub fn pathnames_expand(words: Vec<String>) -> Vec<String> {
    let mut result = Vec::with_capacity(words.len());
    for word in words {
        if !pattern::has_glob_chars(&word) {
            result.push(word);
            continue;
        }
        let mut matches: Vec<String> = pattern::filename_matches(&word)
            .into_iter()
            .filter(|m| !is_dot_entry(m))
            .collect();
        if matches.is_empty() {
            result.push(word);
        } else {
            result.append(&mut matches);
        }
    }
    result
}

/// Whether a match is `.`, `..`, or starts with `./`-like dot noise.
fn is_dot_entry(path: &str) -> bool {
    let mut chars = path.chars();
    chars.next() == Some('.') && matches!(chars.next(), None | Some('.') | Some('/'))
}
