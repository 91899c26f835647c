use chrono::{DateTime, Local, TimeZone};

/// Parses an InstallDate registry value into a local midnight timestamp.
///
/// Installers write the value as exactly eight ASCII digits (`YYYYMMDD`).
/// Anything else, including calendar-invalid dates like day 32, yields
/// `None`; the caller then falls back to the key's last-write time.
pub fn parse_install_date(raw: &str) -> Option<DateTime<Local>> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = raw[0..4].parse().ok()?;
    let month: u32 = raw[4..6].parse().ok()?;
    let day: u32 = raw[6..8].parse().ok()?;

    Local.with_ymd_and_hms(year, month, day, 0, 0, 0).earliest()
}
