// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Globbing-pattern syntax: the pattern character decoder, the abstract
//! syntax tree, and its conversion to a regular expression

use crate::Error;
use regex::Regex;
use regex::RegexBuilder;
use regex_syntax::ast::ClassAsciiKind;
use std::fmt::Write;
use std::ops::RangeInclusive;
use std::str::Chars;

/// Characters that must be escaped outside bracket expressions
const SPECIAL_CHARS: &str = r"\.+*?()|[]{}^$";
/// Characters that must additionally be escaped inside bracket expressions
const BRACKET_SPECIAL_CHARS: &str = "-&~";

/// One decoded pattern character
///
/// A quoted character always matches itself; `?`, `*`, `[`, and `]` keep
/// their special meaning only while unquoted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PatternChar {
    /// The character itself
    pub value: char,
    /// Whether the character was backslash-quoted in the pattern
    pub quoted: bool,
}

impl PatternChar {
    fn unquoted(value: char) -> Self {
        PatternChar {
            value,
            quoted: false,
        }
    }
}

/// Iterator decoding a pattern string into [`PatternChar`]s
///
/// Whether a backslash in the pattern quotes the character after it is
/// decided by the constructor: [`with_escape`](Self::with_escape) treats
/// backslash as the quoting character, as `fnmatch` does by default, while
/// [`without_escape`](Self::without_escape) passes it through untouched.
#[derive(Clone, Debug)]
pub struct PatternChars<'a> {
    rest: Chars<'a>,
    backslash_quotes: bool,
}

impl<'a> PatternChars<'a> {
    /// Decodes a pattern in which a backslash quotes the next character.
    ///
    /// A lone backslash at the end of the pattern is dropped.
    #[must_use]
    pub fn with_escape(pattern: &'a str) -> Self {
        PatternChars {
            rest: pattern.chars(),
            backslash_quotes: true,
        }
    }

    /// Decodes a pattern in which a backslash is an ordinary character.
    #[must_use]
    pub fn without_escape(pattern: &'a str) -> Self {
        PatternChars {
            rest: pattern.chars(),
            backslash_quotes: false,
        }
    }
}

impl Iterator for PatternChars<'_> {
    type Item = PatternChar;

    fn next(&mut self) -> Option<PatternChar> {
        match self.rest.next()? {
            '\\' if self.backslash_quotes => {
                let value = self.rest.next()?;
                Some(PatternChar {
                    value,
                    quoted: true,
                })
            }
            value => Some(PatternChar {
                value,
                quoted: false,
            }),
        }
    }
}

/// Bracket expression component
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketAtom {
    /// Literal character
    Char(char),
    /// Collating symbol (`[.x.]`)
    CollatingSymbol(String),
    /// Equivalence class (`[=x=]`)
    EquivalenceClass(String),
    /// Character class (`[:digit:]`)
    CharClass(String),
}

impl From<char> for BracketAtom {
    fn from(c: char) -> Self {
        BracketAtom::Char(c)
    }
}

/// Bracket expression item: an atom or a character range
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketItem {
    /// Atom
    Atom(BracketAtom),
    /// Character range
    Range(RangeInclusive<BracketAtom>),
}

impl<T: Into<BracketAtom>> From<T> for BracketItem {
    fn from(value: T) -> Self {
        BracketItem::Atom(value.into())
    }
}
impl From<RangeInclusive<BracketAtom>> for BracketItem {
    fn from(range: RangeInclusive<BracketAtom>) -> Self {
        BracketItem::Range(range)
    }
}

/// Bracket expression
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bracket {
    /// Whether there is an initial `!`
    ///
    /// When the bracket expression starts with an `!` (or `^`), the set of
    /// matching characters is inverted.
    pub complement: bool,

    /// Content of the bracket expression
    pub items: Vec<BracketItem>,
}

/// Pattern component
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Atom {
    /// Literal character
    Char(char),
    /// Pattern that matches a single character (`?`)
    AnyChar,
    /// Pattern that matches any string (`*`)
    AnyString,
    /// Bracket expression
    Bracket(Bracket),
}

/// Abstract syntax tree for a whole pattern
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ast {
    /// Content of the pattern
    pub atoms: Vec<Atom>,
}

impl BracketAtom {
    /// Parses an inner bracket expression (except the initial `[`).
    ///
    /// This function parses a collating symbol, equivalence class, or
    /// character class. If successful, returns the result as well as an
    /// iterator that yields characters following the closing bracket.
    /// Returns `Ok(None)` if the inner bracket expression is not valid.
    fn parse_inner<I>(mut i: I) -> Result<Option<(Self, I)>, Error>
    where
        I: Iterator<Item = PatternChar>,
    {
        let (delimiter, make): (char, fn(String) -> Self) = match i.next() {
            Some(PatternChar {
                value: '.',
                quoted: false,
            }) => ('.', BracketAtom::CollatingSymbol),
            Some(PatternChar {
                value: '=',
                quoted: false,
            }) => ('=', BracketAtom::EquivalenceClass),
            Some(PatternChar {
                value: ':',
                quoted: false,
            }) => (':', BracketAtom::CharClass),
            _ => return Ok(None),
        };
        let mut value = Vec::new();
        while let Some(pc) = i.next() {
            value.push(pc);
            if value.ends_with(&[PatternChar::unquoted(delimiter), PatternChar::unquoted(']')]) {
                value.truncate(value.len() - 2);
                let value: String = value.into_iter().map(|pc| pc.value).collect();
                if delimiter == ':' && ClassAsciiKind::from_name(&value).is_none() {
                    return Err(Error::UndefinedCharClass(value));
                }
                return Ok(Some((make(value), i)));
            }
        }
        Ok(None)
    }

    fn matches_multi_character(&self) -> bool {
        match self {
            BracketAtom::CollatingSymbol(value) | BracketAtom::EquivalenceClass(value) => {
                value.chars().count() > 1
            }
            _ => false,
        }
    }

    fn fmt_regex_char(c: char, regex: &mut String) {
        if BRACKET_SPECIAL_CHARS.contains(c) || SPECIAL_CHARS.contains(c) {
            regex.push('\\');
        }
        regex.push(c);
    }

    /// Writes the class-body regex for this atom.
    fn fmt_regex(&self, regex: &mut String) -> Result<(), Error> {
        match self {
            BracketAtom::Char(c) => BracketAtom::fmt_regex_char(*c, regex),
            BracketAtom::CollatingSymbol(value) | BracketAtom::EquivalenceClass(value) => {
                if value.is_empty() {
                    return Err(Error::EmptyCollatingSymbol);
                }
                regex.push_str(value);
            }
            BracketAtom::CharClass(class) => {
                write!(regex, "[:{class}:]").unwrap();
            }
        }
        Ok(())
    }

    /// Writes the regex for this atom when it stands for a single character,
    /// as required at a range endpoint.
    fn fmt_regex_single(&self, regex: &mut String) -> Result<(), Error> {
        match self {
            BracketAtom::Char(c) => {
                BracketAtom::fmt_regex_char(*c, regex);
                Ok(())
            }
            BracketAtom::CollatingSymbol(value) | BracketAtom::EquivalenceClass(value) => {
                let c = value.chars().next().ok_or(Error::EmptyCollatingSymbol)?;
                BracketAtom::fmt_regex_char(c, regex);
                Ok(())
            }
            BracketAtom::CharClass(_) => Err(Error::CharClassInRange),
        }
    }
}

/// Converts the last three items into a range if applicable.
fn make_range(items: &mut Vec<BracketItem>) {
    use BracketAtom::Char;
    use BracketItem::{Atom, Range};

    let n = items.len();
    if n < 3 {
        return;
    }
    let is_range = matches!(
        (&items[n - 3], &items[n - 2], &items[n - 1]),
        (Atom(_), Atom(Char('-')), Atom(_))
    );
    if !is_range {
        return;
    }
    let Some(Atom(end)) = items.pop() else { unreachable!() };
    items.pop();
    let Some(Atom(start)) = items.pop() else { unreachable!() };
    items.push(Range(start..=end));
}

impl BracketItem {
    fn matches_multi_character(&self) -> bool {
        match self {
            BracketItem::Atom(a) => a.matches_multi_character(),
            BracketItem::Range(_) => false,
        }
    }

    fn fmt_regex(&self, regex: &mut String) -> Result<(), Error> {
        match self {
            BracketItem::Atom(a) => a.fmt_regex(regex),
            BracketItem::Range(range) => {
                range.start().fmt_regex_single(regex)?;
                regex.push('-');
                range.end().fmt_regex_single(regex)
            }
        }
    }
}

impl Bracket {
    /// Parses a bracket expression (except the initial `[`).
    ///
    /// If successful, returns the result as well as an iterator that yields
    /// characters following the bracket expression. Returns `Ok(None)` if a
    /// bracket expression is not found.
    fn parse<I>(mut i: I) -> Result<Option<(Self, I)>, Error>
    where
        I: Iterator<Item = PatternChar> + Clone,
    {
        use BracketAtom::Char;
        use BracketItem::Atom;

        let mut bracket = Bracket {
            complement: false,
            items: Vec::new(),
        };
        while let Some(pc) = i.next() {
            match pc {
                PatternChar {
                    value: ']',
                    quoted: false,
                } if !bracket.items.is_empty() => return Ok(Some((bracket, i))),
                PatternChar {
                    value: '!' | '^',
                    quoted: false,
                } if !bracket.complement && bracket.items.is_empty() => {
                    bracket.complement = true
                }
                PatternChar {
                    value: '[',
                    quoted: false,
                } => {
                    if let Some((atom, j)) = BracketAtom::parse_inner(i.clone())? {
                        bracket.items.push(atom.into());
                        i = j;
                    } else {
                        bracket.items.push(Atom(Char('[')));
                    }
                }
                pc => bracket.items.push(Atom(Char(pc.value))),
            }
            make_range(&mut bracket.items);
        }
        Ok(None)
    }

    fn matches_multi_character(&self) -> bool {
        self.items.iter().any(BracketItem::matches_multi_character)
    }

    fn fmt_regex(&self, regex: &mut String) -> Result<(), Error> {
        if self.items.is_empty() {
            return Err(Error::EmptyBracket);
        }
        if !self.matches_multi_character() {
            regex.push('[');
            if self.complement {
                regex.push('^');
            }
            for item in &self.items {
                item.fmt_regex(regex)?;
            }
            regex.push(']');
        } else if !self.complement {
            // A multi-character collating symbol cannot go inside a character
            // class; render the bracket as an alternation instead.
            regex.push_str("(?:");
            let mut first = true;
            for item in &self.items {
                if first {
                    first = false;
                } else {
                    regex.push('|');
                }
                if !item.matches_multi_character() {
                    regex.push('[');
                    item.fmt_regex(regex)?;
                    regex.push(']');
                } else {
                    item.fmt_regex(regex)?;
                }
            }
            regex.push(')');
        } else {
            regex.push_str("[^");
            for item in &self.items {
                if !item.matches_multi_character() {
                    item.fmt_regex(regex)?;
                }
            }
            regex.push(']');
        }
        Ok(())
    }
}

impl Atom {
    /// Parses one pattern component.
    pub(crate) fn parse<I>(mut i: I) -> Result<Option<(Self, I)>, Error>
    where
        I: Iterator<Item = PatternChar> + Clone,
    {
        if let Some(pc) = i.next() {
            let atom = match pc {
                PatternChar {
                    value: '?',
                    quoted: false,
                } => Atom::AnyChar,
                PatternChar {
                    value: '*',
                    quoted: false,
                } => Atom::AnyString,
                PatternChar {
                    value: '[',
                    quoted: false,
                } => {
                    if let Some((bracket, j)) = Bracket::parse(i.clone())? {
                        i = j;
                        Atom::Bracket(bracket)
                    } else {
                        Atom::Char('[')
                    }
                }
                pc => Atom::Char(pc.value),
            };
            Ok(Some((atom, i)))
        } else {
            Ok(None)
        }
    }

    fn fmt_regex(&self, regex: &mut String) -> Result<(), Error> {
        match self {
            Atom::Char(c) => {
                if SPECIAL_CHARS.contains(*c) {
                    regex.push('\\');
                }
                regex.push(*c);
            }
            Atom::AnyChar => regex.push('.'),
            Atom::AnyString => regex.push_str(".*"),
            Atom::Bracket(bracket) => bracket.fmt_regex(regex)?,
        }
        Ok(())
    }
}

impl Ast {
    /// Parses a pattern into an AST.
    pub fn new<I>(pattern: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        <I as IntoIterator>::IntoIter: Clone,
    {
        let mut atoms = Vec::new();
        let mut i = pattern.into_iter();
        while let Some((atom, j)) = Atom::parse(i)? {
            atoms.push(atom);
            i = j;
        }
        Ok(Ast { atoms })
    }

    /// Compiles the AST into an anchored regular expression.
    ///
    /// `?` and `*` match every character including the newline, like
    /// `fnmatch` called without flags.
    pub fn to_regex(&self) -> Result<Regex, Error> {
        let mut body = String::new();
        for atom in &self.atoms {
            atom.fmt_regex(&mut body)?;
        }
        RegexBuilder::new(&format!(r"\A(?:{body})\z"))
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| Error::CompileFailure(e.to_string()))
    }
}
