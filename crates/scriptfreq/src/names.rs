use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Main and recurring characters plus common names and honorifics.
const BASE_NAMES: &[&str] = &[
    "ross", "rachel", "monica", "chandler", "joey", "phoebe", "janice", "carol", "susan", "ben",
    "emma", "gunther", "richard", "barry", "paolo", "julie", "emily", "kathy", "mike", "david",
    "tag", "charlie", "nora", "frank", "alice", "ursula", "erica", "estelle", "joshua", "mark",
    "amy", "paul", "katie", "gary", "pete", "tom", "bob", "steve", "eddie", "roger", "ken",
    "jack", "judy", "mr", "mrs", "barney", "barneys",
];

const SURNAMES: &[&str] = &["geller", "greene", "bing", "tribbiani", "buffay"];

/// Immutable set of lowercase given names and surnames excluded from counts.
#[derive(Clone, Debug)]
pub struct NameRegistry {
    names: HashSet<String>,
}

impl NameRegistry {
    /// The built-in names only.
    pub fn builtin() -> Self {
        Self::from_names(BASE_NAMES.iter().chain(SURNAMES))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .filter_map(|n| normalize_name(n.as_ref()))
            .collect();
        Self { names }
    }

    /// Built-in names merged with one-name-per-line files. Files that do not
    /// exist are skipped; unreadable ones are logged and skipped.
    pub fn load<P: AsRef<Path>>(name_files: &[P]) -> Self {
        let mut registry = Self::builtin();
        for path in name_files {
            let path = path.as_ref();
            match registry.merge_file(path) {
                Ok(0) => {}
                Ok(added) => info!("merged {added} names from {}", path.display()),
                Err(err) => warn!("failed to merge name list {}: {err:#}", path.display()),
            }
        }
        registry
    }

    fn merge_file(&mut self, path: &Path) -> Result<usize> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => {
                return Err(err).with_context(|| format!("read name list {}", path.display()));
            }
        };
        let before = self.names.len();
        self.names.extend(text.lines().filter_map(normalize_name));
        Ok(self.names.len() - before)
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        if word.bytes().any(|b| b.is_ascii_uppercase()) {
            return self.names.contains(&word.to_ascii_lowercase());
        }
        self.names.contains(word)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lowercase, drop a trailing possessive and trim non-letters from both ends.
fn normalize_name(raw: &str) -> Option<String> {
    let lower = raw.trim().to_lowercase();
    let base = lower.strip_suffix("'s").unwrap_or(&lower);
    let trimmed = base.trim_matches(|c: char| !c.is_ascii_lowercase());
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
