// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! IFS field splitting

use rush_env::Env;

/// Splits an expanded word into fields on `$IFS`.
///
/// An unset `IFS` means the default `" \t\n"`; an empty one disables
/// splitting. IFS whitespace and non-whitespace delimiters are handled
/// separately: fields are cut at runs of IFS whitespace around at most one
/// non-whitespace delimiter, quoted spans never split, and a backslash
/// outside single quotes protects the following character. Returns `None`
/// when splitting would produce a single field, so the caller can keep the
/// word intact.
pub fn field_split(env: &Env, input: &str) -> Option<Vec<String>> {
    let ifs = match env.variable_value("IFS") {
        None => " \t\n",
        Some("") => return None,
        Some(ifs) => ifs,
    };

    let ifs_space: Vec<char> = ifs.chars().filter(|c| c.is_whitespace()).collect();
    let ifs_delim: Vec<char> = ifs.chars().filter(|c| !c.is_whitespace()).collect();

    let all: Vec<char> = input.chars().collect();
    // leading IFS whitespace does not delimit an initial empty field
    let lead = all
        .iter()
        .take_while(|&c| ifs_space.contains(c))
        .count();
    let chars = &all[lead..];
    let len = chars.len();
    if len == 0 {
        return None;
    }

    // first pass: count prospective fields
    let mut fields = 1usize;
    let mut quote: Option<char> = None;
    let mut i = 0;
    while i < len {
        match chars[i] {
            '\\' => {
                if quote != Some('\'') {
                    i += 1;
                }
            }
            c @ ('\'' | '"' | '`') => {
                if quote == Some(c) {
                    quote = None;
                } else {
                    quote = Some(c);
                }
            }
            c => {
                if quote.is_none() && (ifs_space.contains(&c) || ifs_delim.contains(&c)) {
                    skip_ifs_delim(chars, &ifs_space, &ifs_delim, &mut i);
                    if i < len {
                        fields += 1;
                    }
                }
            }
        }
        i += 1;
    }

    if fields == 1 {
        return None;
    }

    // second pass: cut the fields
    let mut result = Vec::with_capacity(fields);
    let mut quote: Option<char> = None;
    let mut i = 0;
    let mut field_start = 0;
    while i <= len {
        if i == len {
            // the end of input delimits the final field
            if quote.is_none() {
                result.push(chars[field_start..i].iter().collect());
            }
            break;
        }
        match chars[i] {
            '\\' => {
                if quote != Some('\'') {
                    i += 1;
                }
            }
            '\'' => {
                let mut p = i + 1;
                while p < len && chars[p] != '\'' {
                    p += 1;
                }
                i = p;
            }
            c @ ('"' | '`') => {
                if quote == Some(c) {
                    quote = None;
                } else {
                    quote = Some(c);
                }
            }
            c => {
                if quote.is_none() && (ifs_space.contains(&c) || ifs_delim.contains(&c)) {
                    result.push(chars[field_start..i].iter().collect());
                    let before = i;
                    skip_ifs_delim(chars, &ifs_space, &ifs_delim, &mut i);
                    field_start = i;
                    if i != before && i < len {
                        // step back so the loop increment lands on the
                        // first character of the next field
                        i -= 1;
                    }
                }
            }
        }
        i += 1;
    }

    Some(result)
}

/// Advances past IFS whitespace, at most one IFS delimiter, and more IFS
/// whitespace.
fn skip_ifs_delim(chars: &[char], ifs_space: &[char], ifs_delim: &[char], i: &mut usize) {
    let len = chars.len();
    while *i < len && ifs_space.contains(&chars[*i]) {
        *i += 1;
    }
    if *i < len && ifs_delim.contains(&chars[*i]) {
        *i += 1;
    }
    while *i < len && ifs_space.contains(&chars[*i]) {
        *i += 1;
    }
}
