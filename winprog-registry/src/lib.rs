//! Inventory of installed programs, read live from the Windows registry
//! Uninstall subtrees (per-user and per-machine, 32-bit and 64-bit views).
//!
//! [`list_programs`] walks the requested hive/view pairs, filters out system
//! components and nameless entries, and returns lazily-populated
//! [`ProgramRecord`]s sorted by name. Optional wildcard patterns narrow the
//! result by program name.
//!
//! The registry-facing modules only exist on Windows; the pure pieces
//! (scopes, patterns, version and date parsing) compile everywhere.

mod error;
mod install_date;
mod pattern;
mod scope;
mod version;

#[cfg(windows)]
mod enumerate;
#[cfg(windows)]
mod metadata;
#[cfg(windows)]
mod record;

pub use error::{Error, Result};
pub use install_date::parse_install_date;
pub use pattern::NamePattern;
pub use scope::{Hive, Scope, View};
pub use version::{ParseVersionError, ProgramVersion};

#[cfg(windows)]
pub use enumerate::EnumerationPolicy;
#[cfg(windows)]
pub use record::ProgramRecord;

/// Lists installed programs for `scope`, filtered by wildcard `patterns`
/// (empty slice = no name filter), with the default enumeration policy.
#[cfg(windows)]
pub fn list_programs(scope: Scope, patterns: &[String]) -> Result<Vec<ProgramRecord>> {
    list_programs_with(scope, patterns, EnumerationPolicy::default())
}

/// Same as [`list_programs`] with an explicit [`EnumerationPolicy`].
///
/// Records from different hive/view pairs are merged as-is: an entry present
/// in both machine views is two distinct registry keys and stays two
/// records. The merged set is filtered, then sorted by name (ascending,
/// stable) for deterministic output.
#[cfg(windows)]
pub fn list_programs_with(
    scope: Scope,
    patterns: &[String],
    policy: EnumerationPolicy,
) -> Result<Vec<ProgramRecord>> {
    let patterns = pattern::compile_patterns(patterns)?;

    let mut records = Vec::new();
    for (hive, view) in scope::hive_view_pairs(scope, scope::is_64bit_os()) {
        records.extend(enumerate::enumerate_programs(hive, view, policy)?);
    }

    if !patterns.is_empty() {
        records.retain(|record| patterns.iter().any(|p| p.matches(record.name_unchecked())));
    }
    records.sort_by(|a, b| a.name_unchecked().cmp(b.name_unchecked()));
    Ok(records)
}
