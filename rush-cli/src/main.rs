// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! The `rush` binary: a line-oriented read-eval loop.
//!
//! Prompts are written to standard error (`PS1` for a new command, `PS2`
//! for backslash-newline continuation lines). An empty line does nothing;
//! end of input exits the shell.

use rush_env::Env;
use rush_semantics::parse_and_execute;
use rush_syntax::source::Source;
use std::io::{self, BufRead};

/// Prints the named prompt variable, with a fallback, on standard error.
fn print_prompt(env: &Env, name: &str, fallback: &str) {
    let prompt = env.variable_value(name).unwrap_or(fallback);
    eprint!("{prompt}");
}

/// Reads one command, following backslash-newline continuations.
///
/// The continuation lines are appended verbatim; the tokenizer discards
/// the backslash-newline pairs. Returns `None` at end of input.
fn read_command<R: BufRead>(env: &Env, input: &mut R) -> io::Result<Option<String>> {
    let mut command = String::new();
    if input.read_line(&mut command)? == 0 {
        return Ok(None);
    }
    while command.ends_with("\\\n") {
        print_prompt(env, "PS2", "> ");
        if input.read_line(&mut command)? == 0 {
            break;
        }
    }
    Ok(Some(command))
}

fn main() {
    let mut env = Env::new();
    env.init_from_environment();

    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        print_prompt(&env, "PS1", "$ ");
        match read_command(&env, &mut input) {
            Err(e) => {
                eprintln!("error: failed to read input: {e}");
                break;
            }
            Ok(None) => break,
            Ok(Some(command)) => {
                if command.is_empty() || command == "\n" {
                    continue;
                }
                parse_and_execute(&mut env, Source::new(&command));
            }
        }
    }
}
