// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Command substitution

use std::process::{Command, Stdio};

/// Runs a command and captures its standard output.
///
/// Accepts either the backquoted form `` `cmd` `` or the POSIX form
/// `$(cmd)`, with the surrounding syntax still attached. In the backquoted
/// form, `\$`, `` \` ``, and `\\` are unescaped first. Trailing newlines
/// and carriage returns are stripped from the captured output. Returns
/// `None` when the command cannot be run or produces no output, leaving the
/// original text in place.
pub fn command_substitute(orig: &str) -> Option<String> {
    let backquoted = orig.starts_with('`');

    let command = if backquoted {
        let inner = orig.strip_prefix('`')?;
        let inner = inner.strip_suffix('`').unwrap_or(inner);
        unescape_backquoted(inner)
    } else {
        let inner = orig.strip_prefix("$(").unwrap_or(orig);
        let inner = inner.strip_suffix(')').unwrap_or(inner);
        inner.to_owned()
    };

    let child = Command::new("/bin/sh")
        .arg("-c")
        .arg(&command)
        .stdout(Stdio::piped())
        .spawn();
    let output = match child.and_then(|c| c.wait_with_output()) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: failed to open pipe: {e}");
            return None;
        }
    };

    let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
    while captured.ends_with('\n') || captured.ends_with('\r') {
        captured.pop();
    }
    if captured.is_empty() {
        None
    } else {
        Some(captured)
    }
}

/// Removes the backslash from `\$`, `` \` ``, and `\\` sequences.
fn unescape_backquoted(command: &str) -> String {
    let mut result = String::with_capacity(command.len());
    let mut chars = command.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some('$' | '`' | '\\')) {
            continue;
        }
        result.push(c);
    }
    result
}
