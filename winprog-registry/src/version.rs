use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A dotted numeric program version, as declared by the installer in the
/// DisplayVersion value: `major.minor[.build[.revision]]`.
///
/// Parsing is strict about shape (two to four decimal components) but the
/// callers treat failures as "no version declared" rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramVersion {
    pub major: u64,
    pub minor: u64,
    pub build: Option<u64>,
    pub revision: Option<u64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("not a dotted numeric version")]
pub struct ParseVersionError;

impl FromStr for ProgramVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components: Vec<&str> = s.split('.').collect();
        if components.len() < 2 || components.len() > 4 {
            return Err(ParseVersionError);
        }

        let mut numbers = [None; 4];
        for (slot, component) in numbers.iter_mut().zip(&components) {
            *slot = Some(component.trim().parse::<u64>().map_err(|_| ParseVersionError)?);
        }

        Ok(ProgramVersion {
            major: numbers[0].unwrap_or(0),
            minor: numbers[1].unwrap_or(0),
            build: numbers[2],
            revision: numbers[3],
        })
    }
}

impl fmt::Display for ProgramVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
        }
        if let Some(revision) = self.revision {
            write!(f, ".{revision}")?;
        }
        Ok(())
    }
}

impl Serialize for ProgramVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_to_four_components() {
        assert_eq!(
            "1.2".parse(),
            Ok(ProgramVersion { major: 1, minor: 2, build: None, revision: None })
        );
        assert_eq!(
            "1.2.3".parse(),
            Ok(ProgramVersion { major: 1, minor: 2, build: Some(3), revision: None })
        );
        assert_eq!(
            "10.0.19041.1".parse(),
            Ok(ProgramVersion { major: 10, minor: 0, build: Some(19041), revision: Some(1) })
        );
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!("1".parse::<ProgramVersion>().is_err());
        assert!("".parse::<ProgramVersion>().is_err());
        assert!("1.2.3.4.5".parse::<ProgramVersion>().is_err());
        assert!("1.2-beta".parse::<ProgramVersion>().is_err());
        assert!("one.two".parse::<ProgramVersion>().is_err());
        assert!("1..2".parse::<ProgramVersion>().is_err());
    }

    #[test]
    fn tolerates_component_whitespace() {
        assert_eq!(
            " 1 . 2 ".parse(),
            Ok(ProgramVersion { major: 1, minor: 2, build: None, revision: None })
        );
    }

    #[test]
    fn display_mirrors_the_parsed_shape() {
        for raw in ["1.2", "1.2.3", "1.2.3.4"] {
            assert_eq!(raw.parse::<ProgramVersion>().unwrap().to_string(), raw);
        }
    }

    #[test]
    fn orders_numerically_with_missing_components_lowest() {
        let narrow: ProgramVersion = "1.2".parse().unwrap();
        let wide: ProgramVersion = "1.2.0".parse().unwrap();
        let newer: ProgramVersion = "1.10".parse().unwrap();
        assert!(narrow < wide);
        assert!(wide < newer);
    }
}
