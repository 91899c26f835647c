use winreg::enums::KEY_READ;
use winreg::RegKey;

use crate::error::{Error, Result};
use crate::record::ProgramRecord;
use crate::scope::{Hive, View};

pub(crate) const UNINSTALL_PATH: &str = r"Software\Microsoft\Windows\CurrentVersion\Uninstall";

/// Entry-level filtering knobs.
///
/// Installer conventions are not uniform: some entries carry a ParentKeyName
/// value marking them as sub-components of another entry (hotfixes, language
/// packs). Whether those should be listed is a policy choice, so it is a
/// switch here rather than baked-in behavior. The default keeps them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerationPolicy {
    pub exclude_child_entries: bool,
}

/// Walks the Uninstall subtree of one hive/view pair and returns a record
/// per qualifying entry.
///
/// An unopenable root is the one fatal condition; an unopenable child entry
/// only skips that entry. Each emitted record takes ownership of its open
/// subkey; handles of skipped entries are dropped before moving on.
pub(crate) fn enumerate_programs(
    hive: Hive,
    view: View,
    policy: EnumerationPolicy,
) -> Result<Vec<ProgramRecord>> {
    let uninstall = hive
        .root()
        .open_subkey_with_flags(UNINSTALL_PATH, KEY_READ | view.access_flags())
        .map_err(|source| Error::UninstallRoot { hive, view, source })?;

    let mut records = Vec::new();
    for entry_name in uninstall.enum_keys() {
        let entry_name = match entry_name {
            Ok(name) => name,
            Err(err) => {
                tracing::debug!(%hive, %view, error = %err, "failed to enumerate a subkey name");
                continue;
            }
        };
        let entry = match uninstall.open_subkey_with_flags(&entry_name, KEY_READ | view.access_flags())
        {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(%hive, %view, entry = %entry_name, error = %err, "failed to open entry");
                continue;
            }
        };
        if let Some(record) = qualify_entry(&entry_name, entry, policy) {
            records.push(record);
        }
    }
    Ok(records)
}

/// Applies the per-entry filtering rules, consuming the entry's handle
/// unless a record is produced from it.
fn qualify_entry(entry_name: &str, entry: RegKey, policy: EnumerationPolicy) -> Option<ProgramRecord> {
    if entry.get_value::<u32, _>("SystemComponent").unwrap_or(0) == 1 {
        tracing::debug!(entry = %entry_name, "skipping system component");
        return None;
    }

    if policy.exclude_child_entries && entry.get_raw_value("ParentKeyName").is_ok() {
        tracing::debug!(entry = %entry_name, "skipping sub-component of another entry");
        return None;
    }

    match entry.get_value::<String, _>("DisplayName") {
        Ok(name) if !name.is_empty() => Some(ProgramRecord::new(name, entry)),
        _ => {
            tracing::debug!(entry = %entry_name, "skipping entry without a display name");
            None
        }
    }
}
