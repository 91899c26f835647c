use std::cell::OnceCell;
use std::fmt;

use chrono::{DateTime, Local};
use url::Url;
use winreg::RegKey;

use crate::error::{Error, Result};
use crate::install_date;
use crate::metadata;
use crate::version::ProgramVersion;

/// One installed program, backed by its open Uninstall subkey.
///
/// The record owns the key handle for as long as it lives. Only the name is
/// read eagerly (the enumerator needs it to qualify the entry); every other
/// field is resolved from the registry on first access and memoized, so
/// repeated reads never re-query. A missing or malformed value degrades to
/// `None`/`false` for that field alone.
///
/// Calling [`release`](Self::release) drops the handle; any field access
/// afterwards fails with [`Error::Disposed`].
pub struct ProgramRecord {
    key: Option<RegKey>,
    name: String,
    publisher: OnceCell<Option<String>>,
    comments: OnceCell<Option<String>>,
    install_location: OnceCell<Option<String>>,
    install_source: OnceCell<Option<String>>,
    modify_path: OnceCell<Option<String>>,
    uninstall_string: OnceCell<Option<String>>,
    install_date: OnceCell<DateTime<Local>>,
    size_kb: OnceCell<Option<u32>>,
    version: OnceCell<Option<ProgramVersion>>,
    no_modify: OnceCell<bool>,
    no_remove: OnceCell<bool>,
    no_repair: OnceCell<bool>,
    help_link: OnceCell<Option<Url>>,
    url_info_about: OnceCell<Option<Url>>,
    url_update_info: OnceCell<Option<Url>>,
}

impl ProgramRecord {
    pub(crate) fn new(name: String, key: RegKey) -> Self {
        ProgramRecord {
            key: Some(key),
            name,
            publisher: OnceCell::new(),
            comments: OnceCell::new(),
            install_location: OnceCell::new(),
            install_source: OnceCell::new(),
            modify_path: OnceCell::new(),
            uninstall_string: OnceCell::new(),
            install_date: OnceCell::new(),
            size_kb: OnceCell::new(),
            version: OnceCell::new(),
            no_modify: OnceCell::new(),
            no_remove: OnceCell::new(),
            no_repair: OnceCell::new(),
            help_link: OnceCell::new(),
            url_info_about: OnceCell::new(),
            url_update_info: OnceCell::new(),
        }
    }

    fn key(&self) -> Result<&RegKey> {
        self.key.as_ref().ok_or(Error::Disposed)
    }

    /// Name access without the disposed check, for sorting and filtering
    /// inside the pipeline where the handle is known to be live.
    pub(crate) fn name_unchecked(&self) -> &str {
        &self.name
    }

    /// The program's display name. Always non-empty.
    pub fn name(&self) -> Result<&str> {
        self.key()?;
        Ok(&self.name)
    }

    pub fn publisher(&self) -> Result<Option<&str>> {
        let key = self.key()?;
        Ok(self
            .publisher
            .get_or_init(|| read_string(key, "Publisher"))
            .as_deref())
    }

    pub fn comments(&self) -> Result<Option<&str>> {
        let key = self.key()?;
        Ok(self
            .comments
            .get_or_init(|| read_string(key, "Comments"))
            .as_deref())
    }

    pub fn install_location(&self) -> Result<Option<&str>> {
        let key = self.key()?;
        Ok(self
            .install_location
            .get_or_init(|| read_string(key, "InstallLocation"))
            .as_deref())
    }

    pub fn install_source(&self) -> Result<Option<&str>> {
        let key = self.key()?;
        Ok(self
            .install_source
            .get_or_init(|| read_string(key, "InstallSource"))
            .as_deref())
    }

    pub fn modify_path(&self) -> Result<Option<&str>> {
        let key = self.key()?;
        Ok(self
            .modify_path
            .get_or_init(|| read_string(key, "ModifyPath"))
            .as_deref())
    }

    pub fn uninstall_string(&self) -> Result<Option<&str>> {
        let key = self.key()?;
        Ok(self
            .uninstall_string
            .get_or_init(|| read_string(key, "UninstallString"))
            .as_deref())
    }

    /// When the program was installed.
    ///
    /// Resolved from the InstallDate value when it holds a well-formed
    /// `YYYYMMDD` date; otherwise from the subkey's own last-write
    /// timestamp, which always exists while the handle is live. The latter
    /// query is the one field read that can fail hard ([`Error::KeyInfo`]).
    pub fn install_date(&self) -> Result<DateTime<Local>> {
        let key = self.key()?;
        if let Some(date) = self.install_date.get() {
            return Ok(*date);
        }

        let date = match read_string(key, "InstallDate") {
            Some(raw) => match install_date::parse_install_date(&raw) {
                Some(date) => date,
                None => {
                    tracing::debug!(value = %raw, "InstallDate is not a usable YYYYMMDD date");
                    metadata::last_write_time(key)?
                }
            },
            None => metadata::last_write_time(key)?,
        };
        Ok(*self.install_date.get_or_init(|| date))
    }

    /// Estimated on-disk size in kilobytes, as declared by the installer.
    pub fn size_kb(&self) -> Result<Option<u32>> {
        let key = self.key()?;
        Ok(*self
            .size_kb
            .get_or_init(|| key.get_value("EstimatedSize").ok()))
    }

    /// The declared version, when DisplayVersion parses as dotted numerals.
    pub fn version(&self) -> Result<Option<&ProgramVersion>> {
        let key = self.key()?;
        Ok(self
            .version
            .get_or_init(|| read_string(key, "DisplayVersion").and_then(|raw| raw.parse().ok()))
            .as_ref())
    }

    pub fn no_modify(&self) -> Result<bool> {
        let key = self.key()?;
        Ok(*self.no_modify.get_or_init(|| read_flag(key, "NoModify")))
    }

    pub fn no_remove(&self) -> Result<bool> {
        let key = self.key()?;
        Ok(*self.no_remove.get_or_init(|| read_flag(key, "NoRemove")))
    }

    pub fn no_repair(&self) -> Result<bool> {
        let key = self.key()?;
        Ok(*self.no_repair.get_or_init(|| read_flag(key, "NoRepair")))
    }

    pub fn help_link(&self) -> Result<Option<&Url>> {
        let key = self.key()?;
        Ok(self
            .help_link
            .get_or_init(|| read_url(key, "HelpLink"))
            .as_ref())
    }

    pub fn url_info_about(&self) -> Result<Option<&Url>> {
        let key = self.key()?;
        Ok(self
            .url_info_about
            .get_or_init(|| read_url(key, "URLInfoAbout"))
            .as_ref())
    }

    pub fn url_update_info(&self) -> Result<Option<&Url>> {
        let key = self.key()?;
        Ok(self
            .url_update_info
            .get_or_init(|| read_url(key, "URLUpdateInfo"))
            .as_ref())
    }

    /// Releases the backing registry handle. Idempotent; every field access
    /// after the first call fails with [`Error::Disposed`].
    pub fn release(&mut self) {
        self.key = None;
    }

    pub fn is_released(&self) -> bool {
        self.key.is_none()
    }
}

impl fmt::Debug for ProgramRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramRecord")
            .field("name", &self.name)
            .field("released", &self.key.is_none())
            .finish()
    }
}

fn read_string(key: &RegKey, name: &str) -> Option<String> {
    key.get_value(name).ok()
}

fn read_flag(key: &RegKey, name: &str) -> bool {
    key.get_value::<u32, _>(name).unwrap_or(0) == 1
}

fn read_url(key: &RegKey, name: &str) -> Option<Url> {
    let raw: String = key.get_value(name).ok()?;
    Url::parse(&raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use winreg::enums::HKEY_CURRENT_USER;

    struct TempKey {
        hkcu: RegKey,
        path: String,
        key: Option<RegKey>,
    }

    impl TempKey {
        fn new(label: &str) -> Self {
            let hkcu = RegKey::predef(HKEY_CURRENT_USER);
            let path = format!(
                r"Software\winprog-tests\record-{}-{}",
                label,
                std::process::id()
            );
            let (key, _) = hkcu.create_subkey(&path).unwrap();
            TempKey {
                hkcu,
                path,
                key: Some(key),
            }
        }

        fn take(&mut self) -> RegKey {
            self.key.take().unwrap()
        }
    }

    impl Drop for TempKey {
        fn drop(&mut self) {
            self.key = None;
            let _ = self.hkcu.delete_subkey_all(&self.path);
        }
    }

    #[test]
    fn fields_resolve_lazily_and_default_when_absent() {
        let mut temp = TempKey::new("fields");
        {
            let key = temp.key.as_ref().unwrap();
            key.set_value("DisplayName", &"Fixture App").unwrap();
            key.set_value("Publisher", &"Fixture Corp").unwrap();
            key.set_value("EstimatedSize", &2048u32).unwrap();
            key.set_value("DisplayVersion", &"1.2.3").unwrap();
            key.set_value("NoRemove", &1u32).unwrap();
            key.set_value("HelpLink", &"https://example.com/help").unwrap();
            key.set_value("URLInfoAbout", &"not a url").unwrap();
        }

        let record = ProgramRecord::new("Fixture App".to_string(), temp.take());
        assert_eq!(record.name().unwrap(), "Fixture App");
        assert_eq!(record.publisher().unwrap(), Some("Fixture Corp"));
        assert_eq!(record.size_kb().unwrap(), Some(2048));
        assert_eq!(record.version().unwrap().map(|v| v.to_string()), Some("1.2.3".to_string()));
        assert!(record.no_remove().unwrap());
        assert!(!record.no_modify().unwrap());
        assert_eq!(
            record.help_link().unwrap().map(Url::as_str),
            Some("https://example.com/help")
        );
        assert_eq!(record.url_info_about().unwrap(), None);
        assert_eq!(record.comments().unwrap(), None);
        assert_eq!(record.uninstall_string().unwrap(), None);

        // Memoized: a second read returns the same values.
        assert_eq!(record.publisher().unwrap(), Some("Fixture Corp"));
        assert_eq!(record.size_kb().unwrap(), Some(2048));
    }

    #[test]
    fn declared_install_date_wins_over_key_timestamp() {
        let mut temp = TempKey::new("date");
        temp.key
            .as_ref()
            .unwrap()
            .set_value("InstallDate", &"20230415")
            .unwrap();

        let record = ProgramRecord::new("Fixture App".to_string(), temp.take());
        let date = record.install_date().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2023, 4, 15));
        assert_eq!((date.hour(), date.minute(), date.second()), (0, 0, 0));
    }

    #[test]
    fn malformed_install_date_falls_back_to_last_write_time() {
        let mut temp = TempKey::new("badDate");
        temp.key
            .as_ref()
            .unwrap()
            .set_value("InstallDate", &"20231332")
            .unwrap();

        let record = ProgramRecord::new("Fixture App".to_string(), temp.take());
        let date = record.install_date().unwrap();
        let age = Local::now().signed_duration_since(date);
        assert!(age.num_seconds().abs() < 60, "unexpected fallback date {date}");
    }

    #[test]
    fn absent_install_date_falls_back_to_last_write_time() {
        let mut temp = TempKey::new("noDate");
        let record = ProgramRecord::new("Fixture App".to_string(), temp.take());
        let age = Local::now().signed_duration_since(record.install_date().unwrap());
        assert!(age.num_seconds().abs() < 60);
    }

    #[test]
    fn released_record_rejects_every_access() {
        let mut temp = TempKey::new("release");
        let mut record = ProgramRecord::new("Fixture App".to_string(), temp.take());
        assert!(!record.is_released());

        record.release();
        assert!(record.is_released());
        assert!(matches!(record.name(), Err(Error::Disposed)));
        assert!(matches!(record.publisher(), Err(Error::Disposed)));
        assert!(matches!(record.install_date(), Err(Error::Disposed)));
        // Repeated accesses keep failing; release stays idempotent.
        record.release();
        assert!(matches!(record.no_repair(), Err(Error::Disposed)));
    }
}
