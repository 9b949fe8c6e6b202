// This file is part of rush, a minimal POSIX shell.
// Copyright (C) 2025 the rush authors

//! Tilde expansion

use nix::unistd::{self, User};
use rush_env::Env;

/// Expands a tilde prefix.
///
/// The input is `~` followed by a possibly empty login name. An empty name
/// expands to `$HOME` when that is set and nonempty, falling back to the
/// password-database home directory of the current user; a nonempty name
/// expands to that user's home directory. Returns `None` when no home
/// directory can be found, in which case the prefix is left in place.
pub fn tilde_expand(env: &Env, prefix: &str) -> Option<String> {
    let name = prefix.strip_prefix('~')?;

    if name.is_empty() {
        if let Some(home) = env.variable_value("HOME") {
            if !home.is_empty() {
                return Some(home.to_owned());
            }
        }
        let user = User::from_uid(unistd::getuid()).ok().flatten()?;
        Some(user.dir.to_string_lossy().into_owned())
    } else {
        let user = User::from_name(name).ok().flatten()?;
        Some(user.dir.to_string_lossy().into_owned())
    }
}
