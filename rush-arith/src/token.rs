// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Tokenization of arithmetic expressions

use std::fmt::Display;
use std::iter::FusedIterator;
use std::ops::Range;
use thiserror::Error;

/// Operator
///
/// `++`, `--`, `+`, and `-` are ambiguous at the lexical level; the
/// tokenizer yields their default readings (postfix and binary) and the
/// evaluator reclassifies them from context, which is why the prefix and
/// unary variants exist here as well.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// `++` applied after an lvalue
    PostfixIncrement,
    /// `--` applied after an lvalue
    PostfixDecrement,
    /// `++` applied before an lvalue
    PrefixIncrement,
    /// `--` applied before an lvalue
    PrefixDecrement,
    /// Unary `+`
    UnaryPlus,
    /// Unary `-`
    UnaryMinus,
    /// `!`
    Bang,
    /// `~`
    Tilde,
    /// `**`
    AsteriskAsterisk,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// Binary `+`
    Plus,
    /// Binary `-`
    Minus,
    /// `<<`
    LessLess,
    /// `>>`
    GreaterGreater,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `&`
    And,
    /// `^`
    Caret,
    /// `|`
    Bar,
    /// `&&`
    AndAnd,
    /// `||`
    BarBar,
    /// `=`
    Equal,
    /// `+=`
    PlusEqual,
    /// `-=`
    MinusEqual,
    /// `*=`
    AsteriskEqual,
    /// `/=`
    SlashEqual,
    /// `%=`
    PercentEqual,
    /// `<<=`
    LessLessEqual,
    /// `>>=`
    GreaterGreaterEqual,
    /// `&=`
    AndEqual,
    /// `^=`
    CaretEqual,
    /// `|=`
    BarEqual,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
}

/// Operator associativity
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Associativity {
    Left,
    Right,
    None,
}

impl Operator {
    /// Binding strength of the operator; higher binds tighter.
    #[must_use]
    pub fn precedence(self) -> u8 {
        use Operator::*;
        match self {
            PostfixIncrement | PostfixDecrement => 20,
            PrefixIncrement | PrefixDecrement | UnaryPlus | UnaryMinus | Bang | Tilde => 19,
            AsteriskAsterisk => 18,
            Asterisk | Slash | Percent => 17,
            Plus | Minus => 16,
            LessLess | GreaterGreater => 15,
            Less | LessEqual | Greater | GreaterEqual => 14,
            EqualEqual | BangEqual => 13,
            And => 12,
            Caret => 11,
            Bar => 10,
            AndAnd => 9,
            BarBar => 8,
            Equal | PlusEqual | MinusEqual | AsteriskEqual | SlashEqual | PercentEqual
            | LessLessEqual | GreaterGreaterEqual | AndEqual | CaretEqual | BarEqual => 7,
            OpenParen | CloseParen => 0,
        }
    }

    /// Associativity of the operator.
    #[must_use]
    pub fn associativity(self) -> Associativity {
        use Operator::*;
        match self {
            PostfixIncrement | PostfixDecrement => Associativity::Left,
            PrefixIncrement | PrefixDecrement | UnaryPlus | UnaryMinus | Bang | Tilde
            | AsteriskAsterisk => Associativity::Right,
            Equal | PlusEqual | MinusEqual | AsteriskEqual | SlashEqual | PercentEqual
            | LessLessEqual | GreaterGreaterEqual | AndEqual | CaretEqual | BarEqual => {
                Associativity::Right
            }
            OpenParen | CloseParen => Associativity::None,
            _ => Associativity::Left,
        }
    }

    /// The operator as it is spelled in an expression.
    #[must_use]
    pub fn lexeme(self) -> &'static str {
        use Operator::*;
        match self {
            PostfixIncrement | PrefixIncrement => "++",
            PostfixDecrement | PrefixDecrement => "--",
            UnaryPlus | Plus => "+",
            UnaryMinus | Minus => "-",
            Bang => "!",
            Tilde => "~",
            AsteriskAsterisk => "**",
            Asterisk => "*",
            Slash => "/",
            Percent => "%",
            LessLess => "<<",
            GreaterGreater => ">>",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            EqualEqual => "==",
            BangEqual => "!=",
            And => "&",
            Caret => "^",
            Bar => "|",
            AndAnd => "&&",
            BarBar => "||",
            Equal => "=",
            PlusEqual => "+=",
            MinusEqual => "-=",
            AsteriskEqual => "*=",
            SlashEqual => "/=",
            PercentEqual => "%=",
            LessLessEqual => "<<=",
            GreaterGreaterEqual => ">>=",
            AndEqual => "&=",
            CaretEqual => "^=",
            BarEqual => "|=",
            OpenParen => "(",
            CloseParen => ")",
        }
    }

    /// Whether the operator takes a single operand.
    #[must_use]
    pub fn is_unary(self) -> bool {
        use Operator::*;
        matches!(
            self,
            PostfixIncrement
                | PostfixDecrement
                | PrefixIncrement
                | PrefixDecrement
                | UnaryPlus
                | UnaryMinus
                | Bang
                | Tilde
        )
    }
}

/// Operand: either a constant or a named variable (lvalue)
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Term<'a> {
    /// Constant value
    Value(i64),
    /// Variable
    Variable {
        /// Variable name (without a leading `$`)
        name: &'a str,
        /// Range of the substring where the variable occurs in the parsed
        /// expression
        location: Range<usize>,
    },
}

/// Value of a [`Token`]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TokenValue<'a> {
    /// Term
    Term(Term<'a>),
    /// Operator
    Operator(Operator),
}

/// Atomic lexical element of an expression
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Token<'a> {
    /// Token value
    pub value: TokenValue<'a>,
    /// Range of the substring where the token occurs in the parsed expression
    pub location: Range<usize>,
}

/// Cause of a tokenization error
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum TokenError {
    /// A digit exceeds the value of the active numeric base.
    #[error("invalid digit '{digit}' for base {base}")]
    InvalidDigit {
        /// Offending character
        digit: char,
        /// Active base
        base: i64,
    },

    /// A `base#digits` constant names a base outside 2..=64.
    #[error("invalid base {0}: must be between 2 and 64")]
    InvalidBase(i64),

    /// An expression contains a character that is not a whitespace,
    /// operator, number, or name.
    #[error("invalid character")]
    InvalidCharacter,
}

/// Description of an error that occurred during tokenization
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Error {
    /// Cause of the error
    pub cause: TokenError,
    /// Range of the substring in the evaluated expression string where the
    /// error occurred
    pub location: Range<usize>,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.cause.fmt(f)
    }
}

/// List of all the operator lexemes.
///
/// If a prefix of a valid operator is another operator, the prefix (the
/// shorter operator) must appear after the longer. With this ordering, we
/// can short-circuit unnecessary matching on finding a first match.
const OPERATORS: &[(&str, Operator)] = &[
    ("<<=", Operator::LessLessEqual),
    ("<<", Operator::LessLess),
    ("<=", Operator::LessEqual),
    ("<", Operator::Less),
    (">>=", Operator::GreaterGreaterEqual),
    (">>", Operator::GreaterGreater),
    (">=", Operator::GreaterEqual),
    (">", Operator::Greater),
    ("++", Operator::PostfixIncrement),
    ("+=", Operator::PlusEqual),
    ("+", Operator::Plus),
    ("--", Operator::PostfixDecrement),
    ("-=", Operator::MinusEqual),
    ("-", Operator::Minus),
    ("**", Operator::AsteriskAsterisk),
    ("*=", Operator::AsteriskEqual),
    ("*", Operator::Asterisk),
    ("/=", Operator::SlashEqual),
    ("/", Operator::Slash),
    ("%=", Operator::PercentEqual),
    ("%", Operator::Percent),
    ("==", Operator::EqualEqual),
    ("=", Operator::Equal),
    ("!=", Operator::BangEqual),
    ("!", Operator::Bang),
    ("&&", Operator::AndAnd),
    ("&=", Operator::AndEqual),
    ("&", Operator::And),
    ("||", Operator::BarBar),
    ("|=", Operator::BarEqual),
    ("|", Operator::Bar),
    ("^=", Operator::CaretEqual),
    ("^", Operator::Caret),
    ("~", Operator::Tilde),
    ("(", Operator::OpenParen),
    (")", Operator::CloseParen),
];

/// Whether the character may appear in a variable name.
///
/// Besides the usual alphanumerics and underscore, the special-parameter
/// characters `@ # $ ?` count as name characters in arithmetic context.
#[must_use]
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '#' | '$' | '?')
}

/// Numeric value of a digit character, if any.
///
/// Returns `None` when the character cannot be part of a number at all,
/// `Some(Err(()))` when it is a digit character whose value is out of range
/// for `base`.
fn digit_value(c: char, base: i64) -> Option<Result<i64, ()>> {
    let value = match c {
        '0'..='9' => c as i64 - '0' as i64,
        'a'..='z' => c as i64 - 'a' as i64 + 10,
        'A'..='Z' => {
            if base <= 36 {
                c as i64 - 'A' as i64 + 10
            } else {
                c as i64 - 'A' as i64 + 36
            }
        }
        '@' => 62,
        '_' => 63,
        _ => return None,
    };
    Some(if value < base { Ok(value) } else { Err(()) })
}

/// Iterator extracting tokens from a string
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Tokens<'a> {
    source: &'a str,
    index: usize,
}

impl<'a> Tokens<'a> {
    /// Creates a tokenizer.
    pub fn new(source: &'a str) -> Self {
        Tokens { source, index: 0 }
    }

    /// Scans a numeric constant beginning at `start`.
    ///
    /// Supports `0x`/`0X` (hex), `0b`/`0B` (binary), a leading `0` (octal),
    /// plain decimal, and the `base#digits` form with bases 2..=64.
    fn scan_number(&mut self, start: usize) -> Result<Token<'a>, Error> {
        let rest = &self.source[start..];
        let (base, prefix_len) = if rest.starts_with("0x") || rest.starts_with("0X") {
            (16, 2)
        } else if rest.starts_with("0b") || rest.starts_with("0B") {
            (2, 2)
        } else if rest.starts_with('0') {
            (8, 1)
        } else {
            (10, 0)
        };

        let mut end = start + prefix_len;
        let mut value = self.scan_digits(&mut end, base)?;

        // the base#digits form is only reachable from a decimal prefix
        if base == 10 && self.source[end..].starts_with('#') {
            let digits_base = value;
            if !(2..=64).contains(&digits_base) {
                return Err(Error {
                    cause: TokenError::InvalidBase(digits_base),
                    location: start..end + 1,
                });
            }
            end += 1;
            value = self.scan_digits(&mut end, digits_base)?;
        }

        self.index = end;
        Ok(Token {
            value: TokenValue::Term(Term::Value(value)),
            location: start..end,
        })
    }

    /// Accumulates digits in the given base, advancing `*end`.
    fn scan_digits(&self, end: &mut usize, base: i64) -> Result<i64, Error> {
        let mut value = 0i64;
        for (offset, c) in self.source[*end..].char_indices() {
            match digit_value(c, base) {
                Some(Ok(digit)) => value = value.wrapping_mul(base).wrapping_add(digit),
                Some(Err(())) => {
                    let at = *end + offset;
                    return Err(Error {
                        cause: TokenError::InvalidDigit { digit: c, base },
                        location: at..at + c.len_utf8(),
                    });
                }
                None => {
                    *end += offset;
                    return Ok(value);
                }
            }
        }
        *end = self.source.len();
        Ok(value)
    }

    /// Consumes and returns the next token, or `None` at the end of input.
    pub fn next_token(&mut self) -> Option<Result<Token<'a>, Error>> {
        let trimmed = self.source[self.index..].trim_start();
        let start = self.source.len() - trimmed.len();
        self.index = start;
        let first_char = trimmed.chars().next()?;

        if let Some(&(lexeme, operator)) = OPERATORS
            .iter()
            .find(|&&(lexeme, _)| trimmed.starts_with(lexeme))
        {
            let end = start + lexeme.len();
            self.index = end;
            return Some(Ok(Token {
                value: TokenValue::Operator(operator),
                location: start..end,
            }));
        }

        if first_char.is_ascii_digit() {
            return Some(self.scan_number(start));
        }

        if is_name_char(first_char) {
            // a variable name may begin with `$`, which is not part of it
            let name_start = if first_char == '$' { start + 1 } else { start };
            let name_rest = self.source[name_start..].trim_start_matches(is_name_char);
            let end = self.source.len() - name_rest.len();
            if end == name_start {
                return Some(Err(Error {
                    cause: TokenError::InvalidCharacter,
                    location: start..start + 1,
                }));
            }
            self.index = end;
            let location = start..end;
            return Some(Ok(Token {
                value: TokenValue::Term(Term::Variable {
                    name: &self.source[name_start..end],
                    location: location.clone(),
                }),
                location,
            }));
        }

        Some(Err(Error {
            cause: TokenError::InvalidCharacter,
            location: start..start + first_char.len_utf8(),
        }))
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, Error>;

    fn next(&mut self) -> Option<Result<Token<'a>, Error>> {
        self.next_token()
    }
}

impl FusedIterator for Tokens<'_> {}
