// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Quote removal, the last stage of word expansion

/// Removes quoting characters from each word of the list.
///
/// Bare `"`, `'`, and `` ` `` are deleted, as is the backslash of an
/// escaped character. Inside double quotes a backslash only escapes `$`,
/// `` ` ``, `"`, `\`, and newline; anywhere else it escapes the next
/// character outright. A single-quoted span outside double quotes is copied
/// literally with the quotes dropped. The double-quote state carries over
/// from one word to the next, as fields split out of one quoted word share
/// its quoting.
pub fn remove_quotes(words: &mut [String]) {
    let mut in_double_quotes = false;

    for word in words.iter_mut() {
        let mut chars: Vec<char> = word.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '"' => {
                    in_double_quotes = !in_double_quotes;
                    chars.remove(i);
                }
                '\'' => {
                    if in_double_quotes {
                        i += 1;
                    } else {
                        chars.remove(i);
                        while i < chars.len() && chars[i] != '\'' {
                            i += 1;
                        }
                        if i < chars.len() {
                            chars.remove(i);
                        }
                    }
                }
                '`' => {
                    chars.remove(i);
                }
                '\\' => {
                    if in_double_quotes {
                        match chars.get(i + 1) {
                            Some('$' | '`' | '"' | '\\' | '\n') => {
                                chars.remove(i);
                                i += 1;
                            }
                            _ => i += 1,
                        }
                    } else {
                        chars.remove(i);
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }
        *word = chars.into_iter().collect();
    }
}
