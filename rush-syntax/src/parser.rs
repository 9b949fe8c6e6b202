// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Syntax parser
//!
//! The only construct this shell parses is the simple command: a sequence of
//! words terminated by a newline or the end of input.

use crate::lexer::{Lexer, Token, TokenError};
use crate::syntax::{Node, NodeKind};

/// Parses one simple command.
///
/// `first` is the token that begins the command; further tokens are pulled
/// from `lexer` until a newline token (consumed) or [`Token::Eof`] ends the
/// command. Every word becomes one child of the returned `Command` node, in
/// order. A tokenization error mid-command abandons the command.
pub fn parse_simple_command(lexer: &mut Lexer, first: Token) -> Result<Node, TokenError> {
    let mut command = Node::new(NodeKind::Command);
    let mut token = first;

    loop {
        match token {
            Token::Eof => break,
            Token::Text(text) => {
                if text.starts_with('\n') {
                    break;
                }
                command.add_child(Node::word(text));
                token = lexer.next_token()?;
            }
        }
    }

    Ok(command)
}
