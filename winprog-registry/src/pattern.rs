use regex::Regex;

use crate::error::{Error, Result};

/// A case-insensitive wildcard over program names: `*` matches any run of
/// characters, `?` matches any single character, everything else is literal.
/// A pattern may match anywhere in the name, so `Chrome*` finds
/// "Google Chrome" as well as "Chrome Remote Desktop".
#[derive(Debug, Clone)]
pub struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&glob_to_regex(pattern)).map_err(|source| Error::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(NamePattern { regex })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

pub fn compile_patterns(patterns: &[String]) -> Result<Vec<NamePattern>> {
    patterns.iter().map(|p| NamePattern::new(p)).collect()
}

/// Translates the wildcard into a regex, escaping every literal run so that
/// no regex metacharacter in a program name ("Notepad++", "C++ Runtime")
/// changes the match.
fn glob_to_regex(pattern: &str) -> String {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push_str("(?is)");

    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '*' | '?' => {
                if !literal.is_empty() {
                    expr.push_str(&regex::escape(&literal));
                    literal.clear();
                }
                expr.push_str(if ch == '*' { ".*" } else { "." });
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        expr.push_str(&regex::escape(&literal));
    }
    expr
}
