// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Pattern utilities
//!
//! Glob-character detection, shortest/longest prefix and suffix matching
//! (used by the `${var%pat}` family of parameter expansions), and filename
//! globbing for pathname expansion.

use glob::MatchOptions;
use rush_fnmatch::{Pattern, PatternChars};

/// Whether the string contains glob metacharacters.
///
/// True if the string contains `*` or `?`, or a matched number of `[` and
/// `]` (both nonzero).
#[must_use]
pub fn has_glob_chars(s: &str) -> bool {
    let mut opening = 0usize;
    let mut closing = 0usize;
    for c in s.chars() {
        match c {
            '*' | '?' => return true,
            '[' => opening += 1,
            ']' => closing += 1,
            _ => {}
        }
    }
    opening != 0 && opening == closing
}

/// Finds the shortest or longest prefix of `text` matching `pattern`.
///
/// Tries every split point from one character up to the whole string and
/// returns the end index of the first match (shortest) or of the largest
/// match (longest). Returns 0 when no prefix matches.
#[must_use]
pub fn match_prefix(pattern: &str, text: &str, longest: bool) -> usize {
    if text.is_empty() {
        return 0;
    }
    let Ok(pattern) = Pattern::parse(PatternChars::with_escape(pattern)) else {
        return 0;
    };
    let mut best = 0;
    let ends = text
        .char_indices()
        .map(|(i, _)| i)
        .skip(1)
        .chain([text.len()]);
    for end in ends {
        if pattern.is_match(&text[..end]) {
            if !longest {
                return end;
            }
            best = end;
        }
    }
    best
}

/// Finds the shortest or longest suffix of `text` matching `pattern`.
///
/// Tries every suffix from the last character outward and returns the start
/// index of the first match (shortest) or of the smallest start (longest).
/// Returns 0 when no suffix matches; index 0 is never a candidate since it
/// would be indistinguishable from that.
#[must_use]
pub fn match_suffix(pattern: &str, text: &str, longest: bool) -> usize {
    if text.is_empty() {
        return 0;
    }
    let Ok(pattern) = Pattern::parse(PatternChars::with_escape(pattern)) else {
        return 0;
    };
    let mut best = 0;
    let starts: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .filter(|&i| i > 0)
        .collect();
    for &start in starts.iter().rev() {
        if pattern.is_match(&text[start..]) {
            if !longest {
                return start;
            }
            best = start;
        }
    }
    best
}

/// Returns the pathnames matching the given glob pattern.
///
/// Like POSIX `glob`, results come back sorted and a leading dot must be
/// matched literally. An invalid pattern or an I/O failure yields an empty
/// list.
#[must_use]
pub fn filename_matches(pattern: &str) -> Vec<String> {
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::default()
    };
    match glob::glob_with(pattern, options) {
        Ok(paths) => paths
            .filter_map(Result::ok)
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}
