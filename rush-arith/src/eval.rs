// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! The Shunting-Yard evaluation machine
//!
//! The evaluator keeps two bounded stacks: one for pending operators and one
//! for operands. Operands are [`Term`]s, so a variable stays an lvalue until
//! an operator actually needs its numeric value, which is what lets the
//! assignment and increment operators write back through the [`Env`].

use crate::env::Env;
use crate::token::{is_name_char, Associativity, Operator, Term, Token, TokenValue, Tokens};
use crate::{Error, ErrorCause};
use std::ops::Range;

/// Capacity of the operator and operand stacks
pub const MAX_STACK: usize = 64;

/// What the previous significant token was
///
/// Needed to tell unary `+`/`-` from their binary readings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Prev {
    Start,
    Operand,
    Operator(Operator),
}

/// Parses a variable value like C `atol`: optional leading whitespace and
/// sign, then the longest run of decimal digits. Anything else yields 0.
fn parse_long(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let mut value = 0i64;
    for c in digits.chars() {
        match c.to_digit(10) {
            Some(d) => value = value.wrapping_mul(10).wrapping_add(d as i64),
            None => break,
        }
    }
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Exponentiation. A negative exponent yields 0, a zero exponent 1, and
/// the result wraps like every other operation.
fn power(base: i64, exponent: i64) -> i64 {
    if exponent < 0 {
        return 0;
    }
    let mut result = 1i64;
    let mut base = base;
    let mut exponent = exponent as u64;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exponent >>= 1;
    }
    result
}

struct Stacks<'a> {
    operators: Vec<(Operator, Range<usize>)>,
    operands: Vec<Term<'a>>,
}

impl<'a> Stacks<'a> {
    fn new() -> Self {
        Stacks {
            operators: Vec::new(),
            operands: Vec::new(),
        }
    }

    fn push_operator<E>(&mut self, op: Operator, location: Range<usize>) -> Result<(), Error<E>> {
        if self.operators.len() >= MAX_STACK {
            return Err(Error {
                cause: ErrorCause::StackOverflow,
                location,
            });
        }
        self.operators.push((op, location));
        Ok(())
    }

    fn push_operand<E>(&mut self, term: Term<'a>, location: &Range<usize>) -> Result<(), Error<E>> {
        if self.operands.len() >= MAX_STACK {
            return Err(Error {
                cause: ErrorCause::StackOverflow,
                location: location.clone(),
            });
        }
        self.operands.push(term);
        Ok(())
    }

    fn pop_operand<E>(&mut self, location: &Range<usize>) -> Result<Term<'a>, Error<E>> {
        self.operands.pop().ok_or_else(|| Error {
            cause: ErrorCause::StackUnderflow,
            location: location.clone(),
        })
    }
}

/// Reads a term's numeric value.
fn value_of<E: Env>(term: &Term, env: &E) -> i64 {
    match term {
        Term::Value(value) => *value,
        Term::Variable { name, .. } => parse_long(env.get_variable(name).unwrap_or("")),
    }
}

/// Writes a value back if the term is an lvalue. Assigning to a plain
/// value is not an error; the value is simply not stored anywhere.
fn write_back<E: Env>(
    term: &Term,
    value: i64,
    env: &mut E,
) -> Result<(), Error<E::AssignVariableError>> {
    if let Term::Variable { name, location } = term {
        env.assign_variable(name, value.to_string())
            .map_err(|e| Error {
                cause: ErrorCause::AssignVariableError(e),
                location: location.clone(),
            })?;
    }
    Ok(())
}

/// Applies a unary operator to a term.
fn apply_unary<'a, E: Env>(
    op: Operator,
    term: Term<'a>,
    env: &mut E,
) -> Result<i64, Error<E::AssignVariableError>> {
    use Operator::*;
    let old = value_of(&term, env);
    match op {
        UnaryMinus => Ok(old.wrapping_neg()),
        UnaryPlus => Ok(old),
        Bang => Ok((old == 0) as i64),
        Tilde => Ok(!old),
        PrefixIncrement | PrefixDecrement => {
            let new = if op == PrefixIncrement {
                old.wrapping_add(1)
            } else {
                old.wrapping_sub(1)
            };
            write_back(&term, new, env)?;
            Ok(new)
        }
        PostfixIncrement | PostfixDecrement => {
            let new = if op == PostfixIncrement {
                old.wrapping_add(1)
            } else {
                old.wrapping_sub(1)
            };
            write_back(&term, new, env)?;
            Ok(old)
        }
        _ => panic!("not a unary operator: {op:?}"),
    }
}

/// Applies a binary operator to two terms.
fn apply_binary<'a, E: Env>(
    op: Operator,
    lhs: Term<'a>,
    rhs: Term<'a>,
    op_location: &Range<usize>,
    env: &mut E,
) -> Result<i64, Error<E::AssignVariableError>> {
    use Operator::*;
    let l = value_of(&lhs, env);
    let r = value_of(&rhs, env);
    let result = match op {
        AsteriskAsterisk => power(l, r),
        Asterisk | AsteriskEqual => l.wrapping_mul(r),
        Slash | SlashEqual | Percent | PercentEqual => {
            if r == 0 {
                return Err(Error {
                    cause: ErrorCause::DivisionByZero,
                    location: op_location.clone(),
                });
            }
            if matches!(op, Slash | SlashEqual) {
                l.wrapping_div(r)
            } else {
                l.wrapping_rem(r)
            }
        }
        Plus | PlusEqual => l.wrapping_add(r),
        Minus | MinusEqual => l.wrapping_sub(r),
        LessLess | LessLessEqual => l.wrapping_shl(r as u32),
        GreaterGreater | GreaterGreaterEqual => l.wrapping_shr(r as u32),
        Less => (l < r) as i64,
        LessEqual => (l <= r) as i64,
        Greater => (l > r) as i64,
        GreaterEqual => (l >= r) as i64,
        EqualEqual => (l == r) as i64,
        BangEqual => (l != r) as i64,
        And | AndEqual => l & r,
        Caret | CaretEqual => l ^ r,
        Bar | BarEqual => l | r,
        AndAnd => (l != 0 && r != 0) as i64,
        BarBar => (l != 0 || r != 0) as i64,
        Equal => r,
        _ => panic!("not a binary operator: {op:?}"),
    };
    if matches!(
        op,
        Equal
            | PlusEqual
            | MinusEqual
            | AsteriskEqual
            | SlashEqual
            | PercentEqual
            | LessLessEqual
            | GreaterGreaterEqual
            | AndEqual
            | CaretEqual
            | BarEqual
    ) {
        write_back(&lhs, result, env)?;
    }
    Ok(result)
}

impl<'a> Stacks<'a> {
    /// Pops one operator and applies it to the operand stack.
    fn apply<E: Env>(
        &mut self,
        op: Operator,
        location: Range<usize>,
        env: &mut E,
    ) -> Result<(), Error<E::AssignVariableError>> {
        if op.is_unary() {
            let term = self.pop_operand(&location)?;
            let value = apply_unary(op, term, env)?;
            self.push_operand(Term::Value(value), &location)
        } else {
            // the right operand is popped first
            let rhs = self.pop_operand(&location)?;
            let lhs = self.pop_operand(&location)?;
            let value = apply_binary(op, lhs, rhs, &location, env)?;
            self.push_operand(Term::Value(value), &location)
        }
    }

    /// Shunts a new operator against the operator stack.
    fn shunt<E: Env>(
        &mut self,
        op: Operator,
        location: Range<usize>,
        env: &mut E,
    ) -> Result<(), Error<E::AssignVariableError>> {
        match op {
            Operator::OpenParen => self.push_operator(op, location),
            Operator::CloseParen => loop {
                match self.operators.last() {
                    None => {
                        return Err(Error {
                            cause: ErrorCause::UnmatchedParenthesis,
                            location,
                        });
                    }
                    Some(&(Operator::OpenParen, _)) => {
                        self.operators.pop();
                        return Ok(());
                    }
                    Some(_) => {
                        let (top, top_location) =
                            self.operators.pop().expect("operator stack checked above");
                        self.apply(top, top_location, env)?;
                    }
                }
            },
            _ => {
                while let Some((top, top_location)) = self.operators.last().cloned() {
                    let pops = match op.associativity() {
                        Associativity::Right => top.precedence() > op.precedence(),
                        _ => top.precedence() >= op.precedence(),
                    };
                    if !pops {
                        break;
                    }
                    self.operators.pop();
                    self.apply(top, top_location, env)?;
                }
                self.push_operator(op, location)
            }
        }
    }
}

/// Returns whether the nearest non-whitespace character before `index` is a
/// name character, which is what makes a `++`/`--` there postfix.
fn follows_name_char(expression: &str, index: usize) -> bool {
    expression[..index]
        .trim_end()
        .chars()
        .next_back()
        .is_some_and(is_name_char)
}

/// Evaluates an expression.
///
/// Returns `Ok(None)` for an expression with no operands at all (the caller
/// decides what an empty expansion means).
pub fn eval_expression<'a, E: Env>(
    expression: &'a str,
    env: &mut E,
) -> Result<Option<i64>, Error<E::AssignVariableError>> {
    let mut stacks = Stacks::new();
    let mut prev = Prev::Start;

    for token in Tokens::new(expression) {
        let Token { value, location } = token?;
        match value {
            TokenValue::Term(term) => {
                stacks.push_operand(term, &location)?;
                prev = Prev::Operand;
            }
            TokenValue::Operator(op) => {
                let mut op = op;

                // a +/- after another operator (other than `)`) or at the
                // start of the expression is unary; other binary operators
                // there are misplaced
                let unary_context = match prev {
                    Prev::Start => true,
                    Prev::Operator(o) => o != Operator::CloseParen,
                    Prev::Operand => false,
                };
                if unary_context {
                    op = match op {
                        Operator::Plus => Operator::UnaryPlus,
                        Operator::Minus => Operator::UnaryMinus,
                        o if o == Operator::OpenParen || o.is_unary() => o,
                        o => {
                            return Err(Error {
                                cause: ErrorCause::MisplacedOperator(o),
                                location,
                            });
                        }
                    };
                }

                // `++`/`--` bind as postfix only right after a name
                op = match op {
                    Operator::PostfixIncrement if !follows_name_char(expression, location.start) => {
                        Operator::PrefixIncrement
                    }
                    Operator::PostfixDecrement if !follows_name_char(expression, location.start) => {
                        Operator::PrefixDecrement
                    }
                    o => o,
                };

                stacks.shunt(op, location.clone(), env)?;
                prev = Prev::Operator(op);
            }
        }
    }

    while let Some((op, location)) = stacks.operators.pop() {
        if op == Operator::OpenParen {
            return Err(Error {
                cause: ErrorCause::UnmatchedParenthesis,
                location,
            });
        }
        stacks.apply(op, location, env)?;
    }

    match stacks.operands.as_slice() {
        [] => Ok(None),
        [term] => Ok(Some(value_of(term, env))),
        _ => Err(Error {
            cause: ErrorCause::ExtraOperands,
            location: 0..expression.len(),
        }),
    }
}
