use std::io;

use thiserror::Error;

use crate::scope::{Hive, View};

/// Result type alias for registry inventory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the inventory. Per-entry anomalies during enumeration
/// (a vanished subkey, a missing optional value) are absorbed and logged at
/// debug level; only the conditions below reach the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// The Uninstall root could not be opened for a hive/view pair. The
    /// subtree exists on any real Windows install, so this is fatal.
    #[error(r"unable to open {hive}\Software\Microsoft\Windows\CurrentVersion\Uninstall ({view} view)")]
    UninstallRoot {
        hive: Hive,
        view: View,
        #[source]
        source: io::Error,
    },

    /// Querying a key's last-write timestamp failed. There is no further
    /// fallback for the install date, so the OS error propagates.
    #[error("querying registry key information failed")]
    KeyInfo(#[source] io::Error),

    /// A field was read from a program record after its registry handle
    /// was released.
    #[error("program record has been released")]
    Disposed,

    /// A name pattern could not be compiled.
    #[error("invalid name pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
