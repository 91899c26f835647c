//! Last-write timestamp of an open registry key.
//!
//! This is the one inherently native piece of the install-date fallback:
//! `RegKey::query_info` wraps `RegQueryInfoKeyW`, and only its FILETIME
//! output is consumed here.

use chrono::{DateTime, Local};
use winreg::RegKey;

use crate::error::{Error, Result};

/// 100 ns ticks per second in a FILETIME.
const FILETIME_TICKS_PER_SEC: u64 = 10_000_000;
/// Seconds between the FILETIME epoch (1601-01-01) and the Unix epoch.
const FILETIME_UNIX_EPOCH_SECS: i64 = 11_644_473_600;

/// Returns the last time `key` was written, as a local timestamp.
pub(crate) fn last_write_time(key: &RegKey) -> Result<DateTime<Local>> {
    let info = key.query_info().map_err(Error::KeyInfo)?;

    let ticks = (u64::from(info.last_write_time.dwHighDateTime) << 32)
        | u64::from(info.last_write_time.dwLowDateTime);
    let secs = (ticks / FILETIME_TICKS_PER_SEC) as i64 - FILETIME_UNIX_EPOCH_SECS;
    let nanos = (ticks % FILETIME_TICKS_PER_SEC) as u32 * 100;

    // A FILETIME written by the kernel is always within chrono's range.
    let utc = DateTime::from_timestamp(secs, nanos).unwrap_or_default();
    Ok(utc.with_timezone(&Local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use winreg::enums::HKEY_CURRENT_USER;

    #[test]
    fn reports_a_recent_timestamp_for_a_freshly_written_key() {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let path = format!(r"Software\winprog-tests\metadata-{}", std::process::id());
        let (key, _) = hkcu.create_subkey(&path).unwrap();
        key.set_value("Touched", &1u32).unwrap();

        let stamp = last_write_time(&key).unwrap();
        let age = Local::now().signed_duration_since(stamp);
        assert!(age.num_seconds().abs() < 60, "unexpected timestamp {stamp}");

        hkcu.delete_subkey_all(&path).unwrap();
    }
}
