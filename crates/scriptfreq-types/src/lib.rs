//! Shared types for transcript frequency statistics.
//!
//! These are the records exchanged between the lemmatizer, the aggregation
//! pipeline and whatever consumes the generated artifacts: parts of speech,
//! frequency entries and their stats, citation sentences, and the vocabulary
//! of episode ranges (`All`, `1-8`, `9-16`, `17-last`, `E<n>`).
//!
//! ```rust
//! use scriptfreq_types::{EpisodeRange, Segment};
//!
//! let range: EpisodeRange = "9-16".parse().unwrap();
//! assert_eq!(range, EpisodeRange::Segment(Segment::Middle));
//! assert!(range.contains(12));
//! assert_eq!(Segment::of(17), Segment::Late);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Label used for corpus-wide seasons and whole-season ranges.
pub const ALL_LABEL: &str = "All";

/// Part of speech understood by the lemmatizer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Pos {
    Noun,
    Verb,
    Adj,
    Adv,
}

impl Pos {
    /// Order in which lemmas are tried when normalizing a surface word.
    pub const LEMMA_PRIORITY: [Pos; 3] = [Pos::Verb, Pos::Noun, Pos::Adj];

    /// Suffix used by WordNet dictionary file names (`index.noun`, `verb.exc`).
    pub fn file_suffix(self) -> &'static str {
        match self {
            Pos::Noun => "noun",
            Pos::Verb => "verb",
            Pos::Adj => "adj",
            Pos::Adv => "adv",
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_suffix())
    }
}

/// One of the three fixed episode-ordinal ranges that partition a season.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Segment {
    /// Episodes up to and including 8.
    Early,
    /// Episodes 9 through 16.
    Middle,
    /// Episode 17 and everything after it.
    Late,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Early, Segment::Middle, Segment::Late];

    /// Segment owning an episode ordinal. Every ordinal maps to exactly one.
    pub fn of(ordinal: u32) -> Self {
        match ordinal {
            0..=8 => Segment::Early,
            9..=16 => Segment::Middle,
            _ => Segment::Late,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Segment::Early => "1-8",
            Segment::Middle => "9-16",
            Segment::Late => "17-last",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Episode filter used for scope lookups and citation queries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EpisodeRange {
    All,
    Segment(Segment),
    Episode(u32),
}

impl EpisodeRange {
    pub fn contains(self, ordinal: u32) -> bool {
        match self {
            EpisodeRange::All => true,
            EpisodeRange::Segment(segment) => Segment::of(ordinal) == segment,
            EpisodeRange::Episode(n) => n == ordinal,
        }
    }
}

impl From<Segment> for EpisodeRange {
    fn from(segment: Segment) -> Self {
        EpisodeRange::Segment(segment)
    }
}

impl fmt::Display for EpisodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeRange::All => f.write_str(ALL_LABEL),
            EpisodeRange::Segment(segment) => f.write_str(segment.label()),
            EpisodeRange::Episode(n) => write!(f, "E{n}"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeParseError {
    #[error("unknown episode range: {0:?}")]
    Unknown(String),
}

impl FromStr for EpisodeRange {
    type Err = RangeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(ALL_LABEL) {
            return Ok(EpisodeRange::All);
        }
        if let Some(segment) = Segment::ALL.into_iter().find(|s| s.label() == trimmed) {
            return Ok(EpisodeRange::Segment(segment));
        }
        let digits = trimmed
            .strip_prefix('E')
            .or_else(|| trimmed.strip_prefix('e'))
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .map(EpisodeRange::Episode)
            .map_err(|_| RangeParseError::Unknown(raw.to_string()))
    }
}

impl Serialize for EpisodeRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EpisodeRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A frequency-table row: a word or bigram key and its occurrence count.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub key: String,
    pub count: u64,
}

/// Totals and distinct-key counts for the word and phrase tables of one scope.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeStats {
    pub words_total: u64,
    pub words_distinct: usize,
    pub phrases_total: u64,
    pub phrases_distinct: usize,
}

/// A citation sentence from one season's transcript.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// Unique within a season, increasing in episode then sentence order.
    pub id: u64,
    /// Ordinal of the owning episode.
    #[serde(rename = "ep")]
    pub episode: u32,
    pub text: String,
    pub lemmas: BTreeSet<String>,
}

impl Sentence {
    pub fn has_lemma(&self, lemma: &str) -> bool {
        self.lemmas.contains(lemma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_partition_ordinals() {
        for ordinal in 0..40 {
            let owners = Segment::ALL
                .iter()
                .filter(|s| EpisodeRange::Segment(**s).contains(ordinal))
                .count();
            assert_eq!(owners, 1, "ordinal {ordinal}");
        }
        assert_eq!(Segment::of(8), Segment::Early);
        assert_eq!(Segment::of(9), Segment::Middle);
        assert_eq!(Segment::of(16), Segment::Middle);
        assert_eq!(Segment::of(250), Segment::Late);
    }

    #[test]
    fn parses_range_labels() {
        assert_eq!("All".parse(), Ok(EpisodeRange::All));
        assert_eq!("all".parse(), Ok(EpisodeRange::All));
        assert_eq!("17-last".parse(), Ok(EpisodeRange::Segment(Segment::Late)));
        assert_eq!("E5".parse(), Ok(EpisodeRange::Episode(5)));
        assert_eq!("12".parse(), Ok(EpisodeRange::Episode(12)));
        assert!("8-9".parse::<EpisodeRange>().is_err());
        assert!("".parse::<EpisodeRange>().is_err());
    }

    #[test]
    fn range_display_round_trips() {
        for range in [
            EpisodeRange::All,
            EpisodeRange::Segment(Segment::Middle),
            EpisodeRange::Episode(3),
        ] {
            assert_eq!(range.to_string().parse(), Ok(range));
        }
    }

    #[test]
    fn sentence_serializes_with_short_episode_key() {
        let sentence = Sentence {
            id: 7,
            episode: 2,
            text: "We were on a break.".into(),
            lemmas: ["be".to_string(), "break".to_string()].into_iter().collect(),
        };
        let json = serde_json::to_value(&sentence).unwrap();
        assert_eq!(json["ep"], 2);
        assert_eq!(json["lemmas"], serde_json::json!(["be", "break"]));
    }

    #[test]
    fn stats_use_camel_case_keys() {
        let json = serde_json::to_value(ScopeStats {
            words_total: 3,
            words_distinct: 2,
            phrases_total: 1,
            phrases_distinct: 1,
        })
        .unwrap();
        assert_eq!(json["wordsTotal"], 3);
        assert_eq!(json["phrasesDistinct"], 1);
    }
}
