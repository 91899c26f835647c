use std::fmt;

use serde::Serialize;

/// Which installation locations to query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// Query every location: the current user plus both machine views.
    #[default]
    Unspecified,
    /// Programs installed for the current user only.
    CurrentUser,
    /// Programs installed machine-wide (both registry views on 64-bit hosts).
    Machine,
}

/// A top-level registry partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hive {
    CurrentUser,
    LocalMachine,
}

/// The registry view to read. The local-machine hive is split into 32-bit
/// and 64-bit views on 64-bit systems; the current-user hive is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Default,
    View32,
    View64,
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hive::CurrentUser => write!(f, "HKEY_CURRENT_USER"),
            Hive::LocalMachine => write!(f, "HKEY_LOCAL_MACHINE"),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Default => write!(f, "default"),
            View::View32 => write!(f, "32-bit"),
            View::View64 => write!(f, "64-bit"),
        }
    }
}

#[cfg(windows)]
impl Hive {
    pub(crate) fn root(self) -> winreg::RegKey {
        use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

        winreg::RegKey::predef(match self {
            Hive::CurrentUser => HKEY_CURRENT_USER,
            Hive::LocalMachine => HKEY_LOCAL_MACHINE,
        })
    }
}

#[cfg(windows)]
impl View {
    pub(crate) fn access_flags(self) -> u32 {
        use winreg::enums::{KEY_WOW64_32KEY, KEY_WOW64_64KEY};

        match self {
            View::Default => 0,
            View::View32 => KEY_WOW64_32KEY,
            View::View64 => KEY_WOW64_64KEY,
        }
    }
}

/// Resolves a requested scope into the hive/view pairs to enumerate.
/// On a 32-bit OS there is no 64-bit registry, so that view is dropped.
pub(crate) fn hive_view_pairs(scope: Scope, is_64bit_os: bool) -> Vec<(Hive, View)> {
    let mut pairs = Vec::new();
    if matches!(scope, Scope::Unspecified | Scope::CurrentUser) {
        pairs.push((Hive::CurrentUser, View::Default));
    }
    if matches!(scope, Scope::Unspecified | Scope::Machine) {
        if is_64bit_os {
            pairs.push((Hive::LocalMachine, View::View64));
        }
        pairs.push((Hive::LocalMachine, View::View32));
    }
    pairs
}

/// True on a 64-bit OS, even from a 32-bit process (detected via the
/// ProgramW6432 marker the WOW64 layer sets).
#[cfg(windows)]
pub(crate) fn is_64bit_os() -> bool {
    cfg!(target_pointer_width = "64") || std::env::var_os("ProgramW6432").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_user_scope_uses_the_default_view_only() {
        assert_eq!(
            hive_view_pairs(Scope::CurrentUser, true),
            vec![(Hive::CurrentUser, View::Default)]
        );
        assert_eq!(
            hive_view_pairs(Scope::CurrentUser, false),
            vec![(Hive::CurrentUser, View::Default)]
        );
    }

    #[test]
    fn machine_scope_queries_both_views_on_64bit() {
        assert_eq!(
            hive_view_pairs(Scope::Machine, true),
            vec![
                (Hive::LocalMachine, View::View64),
                (Hive::LocalMachine, View::View32),
            ]
        );
    }

    #[test]
    fn machine_scope_skips_the_64bit_view_on_32bit() {
        assert_eq!(
            hive_view_pairs(Scope::Machine, false),
            vec![(Hive::LocalMachine, View::View32)]
        );
    }

    #[test]
    fn unspecified_scope_queries_everything() {
        assert_eq!(
            hive_view_pairs(Scope::Unspecified, true),
            vec![
                (Hive::CurrentUser, View::Default),
                (Hive::LocalMachine, View::View64),
                (Hive::LocalMachine, View::View32),
            ]
        );
        assert_eq!(
            hive_view_pairs(Scope::Unspecified, false),
            vec![
                (Hive::CurrentUser, View::Default),
                (Hive::LocalMachine, View::View32),
            ]
        );
    }
}
