// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Simple-command execution
//!
//! The executor turns a parsed command node into an argument vector by
//! word-expanding every word, then either runs a builtin in-process or
//! forks and execs an external program found through `$PATH`.

use crate::expansion::{word_expand, ExpansionError};
use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{execv, fork, ForkResult};
use rush_env::Env;
use rush_syntax::lexer::{Lexer, Token};
use rush_syntax::parser::parse_simple_command;
use rush_syntax::source::Source;
use rush_syntax::syntax::Node;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

/// Upper bound on the number of arguments of one command
pub const MAX_ARGS: usize = 255;

/// Searches the given `PATH` value for an executable file.
///
/// Components are separated by colons; an empty component means the
/// current directory. Only regular files count. Returns the first hit.
#[must_use]
pub fn search_path(path: &str, file: &str) -> Option<PathBuf> {
    for component in path.split(':') {
        let dir = if component.is_empty() { "." } else { component };
        let candidate = PathBuf::from(dir).join(file);
        match std::fs::metadata(&candidate) {
            Ok(metadata) if metadata.is_file() => return Some(candidate),
            _ => {}
        }
    }
    None
}

/// Replaces the current process image with the given command.
///
/// `argv[0]` containing a slash is exec'd directly; otherwise it is
/// resolved through `$PATH`. Only returns on failure, with the error that
/// prevented the exec.
fn exec_command(argv: &[String]) -> Errno {
    let args: Vec<CString> = match argv
        .iter()
        .map(|a| CString::new(a.as_str()))
        .collect::<Result<_, _>>()
    {
        Ok(args) => args,
        Err(_) => return Errno::EINVAL,
    };

    let path = if argv[0].contains('/') {
        PathBuf::from(&argv[0])
    } else {
        let path_var = std::env::var("PATH").unwrap_or_default();
        match search_path(&path_var, &argv[0]) {
            Some(path) => path,
            None => return Errno::ENOENT,
        }
    };

    let Ok(path) = CString::new(path.as_os_str().as_bytes()) else {
        return Errno::EINVAL;
    };
    // execv only returns on failure
    execv(&path, &args).err().unwrap_or(Errno::EINVAL)
}

/// Executes one simple command.
///
/// Every word of the command is expanded and each resulting field becomes
/// one argv element, up to [`MAX_ARGS`]. If `argv[0]` names a builtin it
/// runs in-process; otherwise the command is forked and exec'd, and the
/// parent waits for it. Returns whether a command was dispatched; a fork
/// failure reports and returns `false`, an expansion error aborts the
/// command.
pub fn do_simple_command(env: &mut Env, command: &Node) -> Result<bool, ExpansionError> {
    let mut argv: Vec<String> = Vec::new();
    'words: for child in &command.children {
        let Some(text) = child.str_value() else {
            continue;
        };
        for field in word_expand(env, text)? {
            if argv.len() >= MAX_ARGS {
                break 'words;
            }
            argv.push(field);
        }
    }

    if argv.is_empty() {
        return Ok(false);
    }

    if let Some(&builtin) = env.builtin(&argv[0]) {
        (builtin.execute)(env, &argv);
        return Ok(true);
    }

    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            let errno = exec_command(&argv);
            eprintln!("error: failed to execute command: {errno}");
            let code = match errno {
                Errno::ENOEXEC => 126,
                Errno::ENOENT => 127,
                _ => 1,
            };
            std::process::exit(code);
        }
        Ok(ForkResult::Parent { child }) => {
            let _ = waitpid(child, None);
            Ok(true)
        }
        Err(e) => {
            eprintln!("error: failed to fork command: {e}");
            Ok(false)
        }
    }
}

/// Parses and executes every command in the given source.
///
/// Tokenization and expansion errors print a diagnostic; a failed command
/// is skipped and the loop resumes with the next one.
pub fn parse_and_execute(env: &mut Env, source: Source) -> bool {
    let mut lexer = Lexer::new(source);
    loop {
        let token = match lexer.next_token() {
            Ok(Token::Eof) => break,
            Ok(token) => token,
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        };
        match parse_simple_command(&mut lexer, token) {
            Ok(command) => {
                if let Err(e) = do_simple_command(env, &command) {
                    eprintln!("error: {e}");
                }
            }
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rush_syntax::syntax::NodeKind;
    use std::fs::File;

    fn command_of(words: &[&str]) -> Node {
        let mut command = Node::new(NodeKind::Command);
        for word in words {
            command.add_child(Node::word(*word));
        }
        command
    }

    #[test]
    fn search_path_finds_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("prog")).unwrap();
        let path = format!("/nonexistent:{}", dir.path().display());

        let found = search_path(&path, "prog").unwrap();
        assert_eq!(found, dir.path().join("prog"));
        assert_eq!(search_path(&path, "missing"), None);
    }

    #[test]
    fn search_path_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let path = dir.path().display().to_string();
        assert_eq!(search_path(&path, "sub"), None);
    }

    #[test]
    fn empty_path_component_means_current_directory() {
        // tests run in the package root, which has a Cargo.toml
        assert_eq!(
            search_path("", "Cargo.toml").unwrap(),
            PathBuf::from("./Cargo.toml")
        );
    }

    #[test]
    fn empty_command_is_not_dispatched() {
        let mut env = Env::new();
        let command = command_of(&[]);
        assert_eq!(do_simple_command(&mut env, &command), Ok(false));
    }

    #[test]
    fn builtin_dispatch() {
        let mut env = Env::new();
        let command = command_of(&["dump"]);
        assert_eq!(do_simple_command(&mut env, &command), Ok(true));
    }

    #[test]
    fn words_are_expanded_before_dispatch() {
        let mut env = Env::new();
        env.variables.add("CMD").unwrap().set_value(Some("dump"));
        let command = command_of(&["$CMD"]);
        assert_eq!(do_simple_command(&mut env, &command), Ok(true));
    }

    #[test]
    fn expansion_errors_abort_the_command() {
        let mut env = Env::new();
        let command = command_of(&["dump", "${X:?}"]);
        assert!(do_simple_command(&mut env, &command).is_err());
    }

    #[test]
    fn external_command_is_run_and_reaped() {
        let mut env = Env::new();
        env.init_from_environment();
        let command = command_of(&["true"]);
        assert_eq!(do_simple_command(&mut env, &command), Ok(true));
    }

    #[test]
    fn parse_and_execute_runs_builtins() {
        let mut env = Env::new();
        assert!(parse_and_execute(&mut env, Source::new("dump\n")));
    }

    #[test]
    fn parse_and_execute_recovers_from_errors() {
        let mut env = Env::new();
        // unterminated quote: diagnosed, nothing executed
        assert!(parse_and_execute(&mut env, Source::new("dump \"oops")));
    }
}
