// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! This crate implements the shell's arithmetic expansion.
//!
//! [`eval`] evaluates one expression with the classic two-stack
//! Shunting-Yard machine: signed 64-bit integers, the full C-family
//! operator set including assignment and pre/post increment and decrement,
//! and numeric constants in hexadecimal (`0x…`), binary (`0b…`), octal
//! (`0…`), and explicit-base (`base#digits`, bases 2 to 64) notation.
//!
//! Variables are resolved through the [`Env`] trait, which the shell
//! implements on top of its symbol table; tests can use a plain `HashMap`.
//! An operand that names a variable stays an lvalue on the operand stack,
//! so assignment operators can store the result back: the new value is
//! formatted in decimal and written through [`Env::assign_variable`].
//!
//! Arithmetic wraps on overflow. Division or remainder by zero is an error.
//!
//! # Examples
//!
//! ```
//! # use std::collections::HashMap;
//! let env = &mut HashMap::new();
//! assert_eq!(rush_arith::eval("2 + 3 * 4", env), Ok(Some(14)));
//! assert_eq!(rush_arith::eval("x = 5", env), Ok(Some(5)));
//! assert_eq!(env["x"], "5");
//! ```

use std::fmt::Display;
use std::ops::Range;

mod env;
mod eval;
mod token;

pub use env::Env;
pub use eval::MAX_STACK;
pub use token::{Operator, Term, Token, TokenError, TokenValue, Tokens};

/// Cause of an arithmetic expansion error
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ErrorCause<E> {
    /// Error in tokenization
    TokenError(TokenError),
    /// A binary operator where an operand was expected
    MisplacedOperator(Operator),
    /// More than [`MAX_STACK`] pending operators or operands
    StackOverflow,
    /// An operator with too few operands
    StackUnderflow,
    /// A parenthesis without its counterpart
    UnmatchedParenthesis,
    /// Division or remainder by zero
    DivisionByZero,
    /// Operands left over after all operators were applied
    ExtraOperands,
    /// Error assigning a variable value
    AssignVariableError(E),
}

impl<E: Display> Display for ErrorCause<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorCause::*;
        match self {
            TokenError(e) => e.fmt(f),
            MisplacedOperator(op) => write!(f, "misplaced operator '{}'", op.lexeme()),
            StackOverflow => "expression too complex".fmt(f),
            StackUnderflow => "operator is missing an operand".fmt(f),
            UnmatchedParenthesis => "unmatched parenthesis".fmt(f),
            DivisionByZero => "division by zero".fmt(f),
            ExtraOperands => "malformed expression".fmt(f),
            AssignVariableError(e) => e.fmt(f),
        }
    }
}

impl<E> From<TokenError> for ErrorCause<E> {
    fn from(e: TokenError) -> Self {
        ErrorCause::TokenError(e)
    }
}

/// Description of an error that occurred during expansion
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Error<E> {
    /// Cause of the error
    pub cause: ErrorCause<E>,
    /// Range of the substring in the evaluated expression string where the
    /// error occurred
    pub location: Range<usize>,
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.cause.fmt(f)
    }
}

impl<E: std::fmt::Debug + Display> std::error::Error for Error<E> {}

impl<E> From<token::Error> for Error<E> {
    fn from(e: token::Error) -> Self {
        Error {
            cause: e.cause.into(),
            location: e.location,
        }
    }
}

/// Performs arithmetic expansion.
///
/// Returns the value of the expression, or `Ok(None)` when the expression
/// contains no operands at all.
pub fn eval<E: Env>(
    expression: &str,
    env: &mut E,
) -> Result<Option<i64>, Error<E::AssignVariableError>> {
    eval::eval_expression(expression, env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ok(expression: &str, env: &mut HashMap<String, String>) -> i64 {
        match eval(expression, env) {
            Ok(Some(value)) => value,
            other => panic!("eval({expression:?}) = {other:?}"),
        }
    }

    #[test]
    fn integer_constants() {
        let env = &mut HashMap::new();
        assert_eq!(ok("1", env), 1);
        assert_eq!(ok("42", env), 42);
        assert_eq!(ok("0123", env), 0o123);
        assert_eq!(ok("0x10", env), 16);
        assert_eq!(ok("0b101", env), 5);
        assert_eq!(ok("16#ff", env), 255);
        assert_eq!(ok("64#_", env), 63);
    }

    #[test]
    fn empty_expression() {
        let env = &mut HashMap::new();
        assert_eq!(eval("", env), Ok(None));
        assert_eq!(eval("   ", env), Ok(None));
    }

    #[test]
    fn unset_variable_is_zero() {
        let env = &mut HashMap::new();
        assert_eq!(ok("foo", env), 0);
        assert_eq!(ok("foo + 3", env), 3);
    }

    #[test]
    fn variable_values() {
        let env = &mut HashMap::new();
        env.insert("foo".to_string(), "42".to_string());
        env.insert("junk".to_string(), "12abc".to_string());
        env.insert("empty".to_string(), String::new());
        assert_eq!(ok("foo", env), 42);
        assert_eq!(ok("junk", env), 12);
        assert_eq!(ok("empty", env), 0);
    }

    #[test]
    fn additive_operators() {
        let env = &mut HashMap::new();
        assert_eq!(ok("1+2", env), 3);
        assert_eq!(ok(" 12 + 34 ", env), 46);
        assert_eq!(ok("10 - 7 - 5", env), -2);
        assert_eq!(ok("2+5-3", env), 4);
    }

    #[test]
    fn multiplicative_operators() {
        let env = &mut HashMap::new();
        assert_eq!(ok("3*6", env), 18);
        assert_eq!(ok("120 / 24", env), 5);
        assert_eq!(ok("17 % 5", env), 2);
        assert_eq!(ok("120/10/5", env), 2);
    }

    #[test]
    fn precedence_of_additive_and_multiplicative() {
        let env = &mut HashMap::new();
        assert_eq!(ok("2+3*4", env), 14);
        assert_eq!(ok("2*3+4", env), 10);
    }

    #[test]
    fn exponent_operator() {
        let env = &mut HashMap::new();
        assert_eq!(ok("2**10", env), 1024);
        assert_eq!(ok("7**0", env), 1);
        assert_eq!(ok("2**-1", env), 0);
        // right-associative
        assert_eq!(ok("2**3**2", env), 512);
    }

    #[test]
    fn unary_operators() {
        let env = &mut HashMap::new();
        assert_eq!(ok("-0", env), 0);
        assert_eq!(ok(" - 12 ", env), -12);
        assert_eq!(ok("- - 49", env), 49);
        assert_eq!(ok("+10", env), 10);
        assert_eq!(ok("-3 + 4", env), 1);
        assert_eq!(ok("!0", env), 1);
        assert_eq!(ok("!7", env), 0);
        assert_eq!(ok("~0", env), -1);
        assert_eq!(ok("~~42", env), 42);
    }

    #[test]
    fn shift_operators() {
        let env = &mut HashMap::new();
        assert_eq!(ok("5<<3", env), 40);
        assert_eq!(ok("64>>3", env), 8);
        assert_eq!(ok("2 << 2 << 2", env), 32);
    }

    #[test]
    fn comparison_operators() {
        let env = &mut HashMap::new();
        assert_eq!(ok("1<2", env), 1);
        assert_eq!(ok("2<1", env), 0);
        assert_eq!(ok("5<=5", env), 1);
        assert_eq!(ok("5>5", env), 0);
        assert_eq!(ok("5>=5", env), 1);
        assert_eq!(ok("5==5", env), 1);
        assert_eq!(ok("1!=2", env), 1);
    }

    #[test]
    fn bitwise_operators() {
        let env = &mut HashMap::new();
        assert_eq!(ok("3|5", env), 7);
        assert_eq!(ok("3^5", env), 6);
        assert_eq!(ok("3&5", env), 1);
        assert_eq!(ok("4 | ( ( 2 && 2 ) & 3 )", env), 5);
    }

    #[test]
    fn logical_operators() {
        let env = &mut HashMap::new();
        assert_eq!(ok("0||0", env), 0);
        assert_eq!(ok("2 || 0", env), 1);
        assert_eq!(ok("0&&1", env), 0);
        assert_eq!(ok("2 && 3", env), 1);
    }

    #[test]
    fn parentheses() {
        let env = &mut HashMap::new();
        assert_eq!(ok("(42)", env), 42);
        assert_eq!(ok("(2+3)*4", env), 20);
        assert_eq!(ok("2*(3+4)", env), 14);
        assert_eq!(ok("( 6 - ( 7 - 3 ) ) * 2", env), 4);
    }

    #[test]
    fn simple_assignment() {
        let env = &mut HashMap::new();
        assert_eq!(ok("a=1", env), 1);
        assert_eq!(ok(" foo = 42 ", env), 42);
        assert_eq!(env["a"], "1");
        assert_eq!(env["foo"], "42");
    }

    #[test]
    fn assignment_is_right_associative() {
        let env = &mut HashMap::new();
        assert_eq!(ok("x = y = 3", env), 3);
        assert_eq!(env["x"], "3");
        assert_eq!(env["y"], "3");
    }

    #[test]
    fn compound_assignments() {
        let env = &mut HashMap::new();
        env.insert("x".to_string(), "10".to_string());
        assert_eq!(ok("x += 5", env), 15);
        assert_eq!(env["x"], "15");
        assert_eq!(ok("x -= 5", env), 10);
        assert_eq!(ok("x *= 3", env), 30);
        assert_eq!(ok("x /= 4", env), 7);
        assert_eq!(ok("x %= 4", env), 3);
        assert_eq!(ok("x <<= 4", env), 48);
        assert_eq!(ok("x >>= 2", env), 12);
        assert_eq!(ok("x &= 6", env), 4);
        assert_eq!(ok("x ^= 5", env), 1);
        assert_eq!(ok("x |= 8", env), 9);
        assert_eq!(env["x"], "9");
    }

    #[test]
    fn assignment_to_constant_yields_the_value() {
        let env = &mut HashMap::new();
        assert_eq!(ok("7 = 3", env), 3);
        assert!(env.is_empty());
    }

    #[test]
    fn postfix_increment_and_decrement() {
        let env = &mut HashMap::new();
        env.insert("x".to_string(), "5".to_string());
        assert_eq!(ok("x++", env), 5);
        assert_eq!(env["x"], "6");
        assert_eq!(ok("x--", env), 6);
        assert_eq!(env["x"], "5");
    }

    #[test]
    fn prefix_increment_and_decrement() {
        let env = &mut HashMap::new();
        env.insert("x".to_string(), "5".to_string());
        assert_eq!(ok("++x", env), 6);
        assert_eq!(env["x"], "6");
        assert_eq!(ok("--x", env), 5);
        assert_eq!(env["x"], "5");
    }

    #[test]
    fn increment_of_unset_variable() {
        let env = &mut HashMap::new();
        assert_eq!(ok("n++", env), 0);
        assert_eq!(env["n"], "1");
    }

    #[test]
    fn increment_in_larger_expression() {
        let env = &mut HashMap::new();
        env.insert("x".to_string(), "5".to_string());
        assert_eq!(ok("10 + x++", env), 15);
        assert_eq!(env["x"], "6");
        assert_eq!(ok("++x * 2", env), 14);
        assert_eq!(env["x"], "7");
    }

    #[test]
    fn wrapping_arithmetic() {
        let env = &mut HashMap::new();
        assert_eq!(ok("9223372036854775807 + 1", env), i64::MIN);
        assert_eq!(ok("-9223372036854775807 - 2", env), i64::MAX);
    }

    #[test]
    fn division_by_zero() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("1/0", env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 1..2,
            })
        );
        assert_eq!(
            eval("10%0", env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 2..3,
            })
        );
    }

    #[test]
    fn unmatched_parentheses() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("(1+2", env),
            Err(Error {
                cause: ErrorCause::UnmatchedParenthesis,
                location: 0..1,
            })
        );
        assert_eq!(
            eval("1+2)", env),
            Err(Error {
                cause: ErrorCause::UnmatchedParenthesis,
                location: 3..4,
            })
        );
    }

    #[test]
    fn misplaced_binary_operator() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("* 2", env),
            Err(Error {
                cause: ErrorCause::MisplacedOperator(Operator::Asterisk),
                location: 0..1,
            })
        );
        assert_eq!(
            eval("1 + * 2", env),
            Err(Error {
                cause: ErrorCause::MisplacedOperator(Operator::Asterisk),
                location: 4..5,
            })
        );
    }

    #[test]
    fn operand_missing() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("1+", env),
            Err(Error {
                cause: ErrorCause::StackUnderflow,
                location: 1..2,
            })
        );
    }

    #[test]
    fn extra_operands() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("1 2", env),
            Err(Error {
                cause: ErrorCause::ExtraOperands,
                location: 0..3,
            })
        );
    }

    #[test]
    fn deeply_nested_expression_overflows() {
        let env = &mut HashMap::new();
        let expression = format!("{}1{}", "(".repeat(70), ")".repeat(70));
        assert_eq!(
            eval(&expression, env).unwrap_err().cause,
            ErrorCause::StackOverflow
        );
    }

    #[test]
    fn invalid_token_location_is_reported() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("1 + 08", env),
            Err(Error {
                cause: ErrorCause::TokenError(TokenError::InvalidDigit {
                    digit: '8',
                    base: 8
                }),
                location: 5..6,
            })
        );
    }

    #[test]
    fn special_parameter_style_names() {
        let env = &mut HashMap::new();
        env.insert("?".to_string(), "1".to_string());
        assert_eq!(ok("? + 1", env), 2);
        assert_eq!(ok("$x + 0", env), 0);
    }
}
