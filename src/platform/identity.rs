//! Who is running the cleaner: username, home directory, privilege level.
//!
//! Every lookup is best-effort and infallible from the caller's point of view.

use std::path::PathBuf;

/// Name of the current user: `$USER`, else the passwd entry, else `"unknown"`.
#[must_use]
pub fn current_username() -> String {
    if let Some(name) = std::env::var_os("USER").filter(|value| !value.is_empty()) {
        return name.to_string_lossy().into_owned();
    }
    passwd_name().unwrap_or_else(|| String::from("unknown"))
}

/// Home directory: `$HOME`, else the passwd entry, else the current directory.
#[must_use]
pub fn home_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME").filter(|value| !value.is_empty()) {
        return PathBuf::from(home);
    }
    passwd_home().unwrap_or_else(|| PathBuf::from("."))
}

/// Whether the process runs with an effective uid of root.
#[must_use]
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        nix::unistd::geteuid().is_root()
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(unix)]
fn passwd_name() -> Option<String> {
    let uid = nix::unistd::geteuid();
    nix::unistd::User::from_uid(uid).ok().flatten().map(|u| u.name)
}

#[cfg(unix)]
fn passwd_home() -> Option<PathBuf> {
    let uid = nix::unistd::geteuid();
    nix::unistd::User::from_uid(uid).ok().flatten().map(|u| u.dir)
}

#[cfg(not(unix))]
fn passwd_name() -> Option<String> {
    None
}

#[cfg(not(unix))]
fn passwd_home() -> Option<PathBuf> {
    None
}
