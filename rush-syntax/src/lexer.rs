// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Tokenizer
//!
//! [`Lexer::next_token`] produces one whitespace-delimited token per call.
//! Quoted spans, backslash escapes, and `$…` substitution spans are copied
//! into the token verbatim; they are interpreted later, by the
//! word-expansion pipeline. A lone newline is itself a token, which is how
//! the parser detects the end of a command.

use crate::source::Source;
use thiserror::Error;

/// Lexical token
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Token {
    /// A raw, unexpanded word, or a lone newline
    Text(String),
    /// End of input
    Eof,
}

impl Token {
    /// Whether this token is a newline token.
    #[must_use]
    pub fn is_newline(&self) -> bool {
        matches!(self, Token::Text(text) if text.starts_with('\n'))
    }
}

/// Error in tokenization
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum TokenError {
    /// A quoted span is missing its closing quote.
    #[error("missing closing quote '{0}'")]
    UnclosedQuote(char),

    /// A `${…}` or `$(…)` span is missing its closing brace.
    #[error("missing closing brace '{0}'")]
    UnclosedBrace(char),
}

/// Tokenizer over an input [`Source`]
///
/// The lexer owns the source and a scratch buffer that is reused across
/// calls. On an unclosed quote or brace the rest of the input is consumed
/// and an error is returned; the caller reports it and skips the line.
#[derive(Clone, Debug)]
pub struct Lexer {
    source: Source,
    buf: String,
}

impl Lexer {
    /// Creates a lexer reading from the given source.
    pub fn new(source: Source) -> Self {
        Lexer {
            source,
            buf: String::with_capacity(1024),
        }
    }

    /// Returns the next token.
    ///
    /// Leading blanks are skipped. A blank after at least one accumulated
    /// character ends the token; a newline ends the token and is given back
    /// to the source (or becomes the token itself when nothing has
    /// accumulated yet). When the source has no characters left, returns
    /// [`Token::Eof`].
    pub fn next_token(&mut self) -> Result<Token, TokenError> {
        self.buf.clear();

        let Some(mut c) = self.source.next_char() else {
            return Ok(Token::Eof);
        };

        loop {
            match c {
                '"' | '\'' | '`' => {
                    self.buf.push(c);
                    let close = find_closing_quote(self.source.tail());
                    if close == 0 {
                        self.source.skip_to_end();
                        return Err(TokenError::UnclosedQuote(c));
                    }
                    // copy everything through and including the closing quote
                    for _ in 0..close {
                        if let Some(q) = self.source.next_char() {
                            self.buf.push(q);
                        }
                    }
                }

                '\\' => match self.source.next_char() {
                    // drop a backslash-newline pair entirely (line continuation)
                    Some('\n') => {}
                    Some(escaped) => {
                        self.buf.push('\\');
                        self.buf.push(escaped);
                    }
                    None => self.buf.push('\\'),
                },

                '$' => {
                    self.buf.push('$');
                    match self.source.peek_char() {
                        Some(open @ ('{' | '(')) => {
                            let tail = self.source.tail();
                            let close = find_closing_brace(&tail[1..]);
                            if close == 0 {
                                self.source.skip_to_end();
                                return Err(TokenError::UnclosedBrace(open));
                            }
                            // copy the whole balanced span
                            for _ in 0..=close {
                                if let Some(b) = self.source.next_char() {
                                    self.buf.push(b);
                                }
                            }
                        }
                        // special or positional parameter: one more character
                        Some(p)
                            if p.is_alphanumeric()
                                || matches!(p, '*' | '@' | '#' | '!' | '?' | '$') =>
                        {
                            if let Some(p) = self.source.next_char() {
                                self.buf.push(p);
                            }
                        }
                        _ => {}
                    }
                }

                ' ' | '\t' => {
                    if !self.buf.is_empty() {
                        break;
                    }
                }

                '\n' => {
                    if self.buf.is_empty() {
                        self.buf.push('\n');
                    } else {
                        self.source.unget_char();
                    }
                    break;
                }

                _ => self.buf.push(c),
            }

            match self.source.next_char() {
                Some(next) => c = next,
                None => break,
            }
        }

        if self.buf.is_empty() {
            Ok(Token::Eof)
        } else {
            Ok(Token::Text(self.buf.clone()))
        }
    }
}

/// Finds the closing quote matching the quote that begins `data`.
///
/// `data[0]` must be `'`, `"`, or `` ` ``; any other first character means
/// there is nothing to match. Returns the index of the first unescaped
/// occurrence of the same quote, or 0 if there is none. A candidate close
/// preceded by a backslash does not count, except inside single quotes where
/// the backslash is an ordinary character.
#[must_use]
pub fn find_closing_quote(data: &[char]) -> usize {
    let Some(&quote) = data.first() else { return 0 };
    if quote != '\'' && quote != '"' && quote != '`' {
        return 0;
    }
    let mut i = 1;
    while i < data.len() {
        if data[i] == quote {
            if data[i - 1] == '\\' && quote != '\'' {
                i += 1;
                continue;
            }
            return i;
        }
        i += 1;
    }
    0
}

/// Finds the closing brace matching the brace that begins `data`.
///
/// `data[0]` must be `{` or `(`; the corresponding close is `}` or `)`.
/// Keeps a balance count of unescaped opens and closes, skipping quoted
/// spans wholesale. Returns the index of the matching close, or 0 when the
/// braces are unbalanced or an inner quote is unterminated.
#[must_use]
pub fn find_closing_brace(data: &[char]) -> usize {
    let Some(&opening) = data.first() else { return 0 };
    let closing = match opening {
        '{' => '}',
        '(' => ')',
        _ => return 0,
    };

    let mut open_count = 1usize;
    let mut close_count = 0usize;
    let mut i = 1;
    while i < data.len() {
        let c = data[i];
        if c == '"' || c == '\'' || c == '`' {
            if data[i - 1] == '\\' {
                i += 1;
                continue;
            }
            // skip the quoted span
            let quote = c;
            loop {
                i += 1;
                if i >= data.len() {
                    return 0;
                }
                if data[i] == quote && data[i - 1] != '\\' {
                    break;
                }
            }
            i += 1;
            continue;
        }
        if data[i - 1] != '\\' {
            if c == opening {
                open_count += 1;
            } else if c == closing {
                close_count += 1;
            }
        }
        if open_count == close_count {
            return i;
        }
        i += 1;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn tokens(code: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(Source::new(code));
        let mut result = Vec::new();
        loop {
            match lexer.next_token().unwrap() {
                Token::Eof => return result,
                token => result.push(token),
            }
        }
    }

    fn texts(code: &str) -> Vec<String> {
        tokens(code)
            .into_iter()
            .map(|t| match t {
                Token::Text(text) => text,
                Token::Eof => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokens(""), []);
    }

    #[test]
    fn blanks_only() {
        assert_eq!(tokens("  \t "), []);
    }

    #[test]
    fn simple_words() {
        assert_eq!(texts("echo   hello   world\n"), ["echo", "hello", "world", "\n"]);
    }

    #[test]
    fn newline_is_its_own_token() {
        assert_eq!(texts("a\nb"), ["a", "\n", "b"]);
        assert_eq!(texts("\n"), ["\n"]);
    }

    #[test]
    fn double_quoted_span_is_preserved() {
        assert_eq!(texts("echo \"a b\"  c"), ["echo", "\"a b\"", "c"]);
    }

    #[test]
    fn single_quoted_span_is_preserved() {
        assert_eq!(texts("'a  $b'"), ["'a  $b'"]);
    }

    #[test]
    fn backquoted_span_is_preserved() {
        assert_eq!(texts("`echo hi`"), ["`echo hi`"]);
    }

    #[test]
    fn quotes_join_adjacent_text() {
        assert_eq!(texts("a\"b c\"d"), ["a\"b c\"d"]);
    }

    #[test]
    fn backslash_escapes_blank() {
        assert_eq!(texts(r"a\ b"), [r"a\ b"]);
    }

    #[test]
    fn backslash_newline_is_dropped() {
        assert_eq!(texts("ab\\\ncd"), ["abcd"]);
    }

    #[test]
    fn trailing_backslash_is_kept() {
        assert_eq!(texts("a\\"), ["a\\"]);
    }

    #[test]
    fn parameter_expansion_span() {
        assert_eq!(texts("echo ${FOO:-bar baz}"), ["echo", "${FOO:-bar baz}"]);
    }

    #[test]
    fn command_substitution_span() {
        assert_eq!(texts("$(echo hi)"), ["$(echo hi)"]);
    }

    #[test]
    fn arithmetic_expansion_span() {
        assert_eq!(texts("$((2 + 3 * 4))"), ["$((2 + 3 * 4))"]);
    }

    #[test]
    fn special_parameter_takes_one_character() {
        assert_eq!(texts("$? $$ $1abc"), ["$?", "$$", "$1abc"]);
    }

    #[test]
    fn variable_name_is_scanned_as_plain_characters() {
        assert_eq!(texts("$FOO/bar"), ["$FOO/bar"]);
    }

    #[test]
    fn lone_dollar_is_kept() {
        assert_eq!(texts("$ x"), ["$", "x"]);
    }

    #[test]
    fn unclosed_quote_is_an_error() {
        let mut lexer = Lexer::new(Source::new("echo \"abc"));
        assert_eq!(lexer.next_token(), Ok(Token::Text("echo".to_string())));
        assert_eq!(lexer.next_token(), Err(TokenError::UnclosedQuote('"')));
        // the rest of the input was consumed
        assert_eq!(lexer.next_token(), Ok(Token::Eof));
    }

    #[test]
    fn unclosed_brace_is_an_error() {
        let mut lexer = Lexer::new(Source::new("${FOO"));
        assert_eq!(lexer.next_token(), Err(TokenError::UnclosedBrace('{')));
        assert_eq!(lexer.next_token(), Ok(Token::Eof));
    }

    #[test]
    fn newline_token_is_recognized() {
        assert_matches!(tokens("\n").first(), Some(t) => assert!(t.is_newline()));
        assert!(!Token::Text("a".to_string()).is_newline());
        assert!(!Token::Eof.is_newline());
    }

    #[test]
    fn find_closing_quote_basics() {
        let chars: Vec<char> = "\"abc\"".chars().collect();
        assert_eq!(find_closing_quote(&chars), 4);
        let chars: Vec<char> = "'ab'cd".chars().collect();
        assert_eq!(find_closing_quote(&chars), 3);
        let chars: Vec<char> = "\"abc".chars().collect();
        assert_eq!(find_closing_quote(&chars), 0);
        let chars: Vec<char> = "abc".chars().collect();
        assert_eq!(find_closing_quote(&chars), 0);
    }

    #[test]
    fn find_closing_quote_skips_escaped_quotes() {
        let chars: Vec<char> = r#""a\"b""#.chars().collect();
        assert_eq!(find_closing_quote(&chars), 5);
        // inside single quotes a backslash is an ordinary character
        let chars: Vec<char> = r"'a\'".chars().collect();
        assert_eq!(find_closing_quote(&chars), 3);
    }

    #[test]
    fn find_closing_brace_basics() {
        let chars: Vec<char> = "{abc}".chars().collect();
        assert_eq!(find_closing_brace(&chars), 4);
        let chars: Vec<char> = "((1+2))".chars().collect();
        assert_eq!(find_closing_brace(&chars), 6);
        let chars: Vec<char> = "(a(b)c)d".chars().collect();
        assert_eq!(find_closing_brace(&chars), 6);
        let chars: Vec<char> = "(abc".chars().collect();
        assert_eq!(find_closing_brace(&chars), 0);
        let chars: Vec<char> = "abc".chars().collect();
        assert_eq!(find_closing_brace(&chars), 0);
    }

    #[test]
    fn find_closing_brace_skips_quoted_spans() {
        let chars: Vec<char> = "(a')'b)".chars().collect();
        assert_eq!(find_closing_brace(&chars), 6);
        let chars: Vec<char> = "(\")\")".chars().collect();
        assert_eq!(find_closing_brace(&chars), 4);
        // unterminated inner quote means no match
        let chars: Vec<char> = "(a'b)".chars().collect();
        assert_eq!(find_closing_brace(&chars), 0);
    }

    #[test]
    fn find_closing_brace_ignores_escaped_braces() {
        let chars: Vec<char> = r"(a\)b)".chars().collect();
        assert_eq!(find_closing_brace(&chars), 5);
    }
}
