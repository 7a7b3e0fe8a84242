//! Word and bigram frequency tables and their fold from episode up to corpus.
//!
//! Tables are built once from lemma sequences or by summing child tables and
//! never change afterwards. Only totals add up across the hierarchy; distinct
//! counts are always recomputed from the merged keys.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use scriptfreq_types::{ALL_LABEL, EpisodeRange, FrequencyEntry, ScopeStats, Segment};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    #[default]
    Words,
    Phrases,
}

impl TableKind {
    /// Words list rare entries first, phrases common entries first; equal
    /// counts are ordered by key in both.
    fn compare(self, a: &FrequencyEntry, b: &FrequencyEntry) -> Ordering {
        let by_count = match self {
            TableKind::Words => a.count.cmp(&b.count),
            TableKind::Phrases => b.count.cmp(&a.count),
        };
        by_count.then_with(|| a.key.cmp(&b.key))
    }
}

#[derive(Clone, Debug)]
pub struct FrequencyTable {
    kind: TableKind,
    counts: HashMap<String, u64>,
    sorted: Vec<FrequencyEntry>,
    total: u64,
}

impl FrequencyTable {
    pub fn empty(kind: TableKind) -> Self {
        Self::from_counts(kind, HashMap::new())
    }

    /// Count every occurrence of each key.
    pub fn from_keys<I>(kind: TableKind, keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut counts = HashMap::new();
        for key in keys {
            *counts.entry(key).or_insert(0) += 1;
        }
        Self::from_counts(kind, counts)
    }

    /// Union of `tables` with counts summed per key.
    pub fn merge<'a, I>(kind: TableKind, tables: I) -> Self
    where
        I: IntoIterator<Item = &'a FrequencyTable>,
    {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for table in tables {
            for (key, count) in &table.counts {
                *counts.entry(key.clone()).or_insert(0) += count;
            }
        }
        Self::from_counts(kind, counts)
    }

    fn from_counts(kind: TableKind, counts: HashMap<String, u64>) -> Self {
        let mut sorted: Vec<FrequencyEntry> = counts
            .iter()
            .map(|(key, &count)| FrequencyEntry {
                key: key.clone(),
                count,
            })
            .collect();
        sorted.sort_by(|a, b| kind.compare(a, b));
        let total = counts.values().sum();
        Self {
            kind,
            counts,
            sorted,
            total,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.counts.contains_key(key)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct keys.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in the table's sort order.
    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.sorted
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Filter and paginate the sorted entries. `page` is 1-based.
    pub fn query(&self, params: EntryQuery<'_>) -> EntryPage {
        let needle = params.contains.map(str::to_lowercase);
        let matches = |entry: &&FrequencyEntry| {
            params.max_count.is_none_or(|max| entry.count <= max)
                && needle.as_deref().is_none_or(|n| entry.key.contains(n))
        };

        let offset = params
            .page
            .saturating_sub(1)
            .saturating_mul(params.page_size);
        let total = self.sorted.iter().filter(matches).count();
        let items: Vec<FrequencyEntry> = self
            .sorted
            .iter()
            .filter(matches)
            .skip(offset)
            .take(params.page_size)
            .cloned()
            .collect();
        let has_more = offset + items.len() < total;

        EntryPage {
            total,
            items,
            has_more,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EntryQuery<'a> {
    /// Case-insensitive substring filter on the key.
    pub contains: Option<&'a str>,
    /// Drop entries whose count exceeds this ceiling.
    pub max_count: Option<u64>,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone)]
pub struct EntryPage {
    pub total: usize,
    pub items: Vec<FrequencyEntry>,
    pub has_more: bool,
}

/// Adjacent lemma pairs joined by a single space.
pub fn bigrams(lemmas: &[String]) -> impl Iterator<Item = String> + '_ {
    lemmas.windows(2).map(|pair| format!("{} {}", pair[0], pair[1]))
}

/// The word and phrase tables of one scope.
#[derive(Clone, Debug)]
pub struct ScopeTables {
    pub words: FrequencyTable,
    pub phrases: FrequencyTable,
}

impl ScopeTables {
    pub fn empty() -> Self {
        Self {
            words: FrequencyTable::empty(TableKind::Words),
            phrases: FrequencyTable::empty(TableKind::Phrases),
        }
    }

    /// Tables for one episode's lemma sequence.
    pub fn from_lemmas(lemmas: &[String]) -> Self {
        Self {
            words: FrequencyTable::from_keys(TableKind::Words, lemmas.iter().cloned()),
            phrases: FrequencyTable::from_keys(TableKind::Phrases, bigrams(lemmas)),
        }
    }

    pub fn merge<'a, I>(children: I) -> Self
    where
        I: IntoIterator<Item = &'a ScopeTables>,
        I::IntoIter: Clone,
    {
        let children = children.into_iter();
        Self {
            words: FrequencyTable::merge(TableKind::Words, children.clone().map(|c| &c.words)),
            phrases: FrequencyTable::merge(TableKind::Phrases, children.map(|c| &c.phrases)),
        }
    }

    pub fn table(&self, kind: TableKind) -> &FrequencyTable {
        match kind {
            TableKind::Words => &self.words,
            TableKind::Phrases => &self.phrases,
        }
    }

    pub fn stats(&self) -> ScopeStats {
        ScopeStats {
            words_total: self.words.total(),
            words_distinct: self.words.distinct(),
            phrases_total: self.phrases.total(),
            phrases_distinct: self.phrases.distinct(),
        }
    }
}

impl Default for ScopeTables {
    fn default() -> Self {
        Self::empty()
    }
}

/// Every scope of one season: episodes, the three segments and the season.
#[derive(Clone, Debug)]
pub struct SeasonAggregate {
    label: String,
    episodes: BTreeMap<u32, ScopeTables>,
    segments: BTreeMap<Segment, ScopeTables>,
    season: ScopeTables,
}

impl SeasonAggregate {
    /// Fold `(ordinal, lemmas)` pairs into a season. Episodes sharing an
    /// ordinal are summed into one episode scope; bigrams never span two
    /// input episodes.
    pub fn from_episodes<I>(label: impl Into<String>, episodes: I) -> Self
    where
        I: IntoIterator<Item = (u32, Vec<String>)>,
    {
        let mut by_ordinal: BTreeMap<u32, Vec<ScopeTables>> = BTreeMap::new();
        for (ordinal, lemmas) in episodes {
            by_ordinal
                .entry(ordinal)
                .or_default()
                .push(ScopeTables::from_lemmas(&lemmas));
        }
        let episodes: BTreeMap<u32, ScopeTables> = by_ordinal
            .into_iter()
            .map(|(ordinal, mut parts)| {
                let tables = if parts.len() == 1 {
                    parts.remove(0)
                } else {
                    ScopeTables::merge(parts.iter())
                };
                (ordinal, tables)
            })
            .collect();

        let segments: BTreeMap<Segment, ScopeTables> = Segment::ALL
            .into_iter()
            .map(|segment| {
                let members = episodes
                    .iter()
                    .filter(|(ordinal, _)| Segment::of(**ordinal) == segment)
                    .map(|(_, tables)| tables);
                (segment, ScopeTables::merge(members))
            })
            .collect();
        let season = ScopeTables::merge(segments.values());

        Self {
            label: label.into(),
            episodes,
            segments,
            season,
        }
    }

    /// A season with no text: every scope present and empty.
    pub fn empty(label: impl Into<String>) -> Self {
        Self::from_episodes(label, std::iter::empty())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn season(&self) -> &ScopeTables {
        &self.season
    }

    pub fn segment(&self, segment: Segment) -> &ScopeTables {
        // All three segments are inserted at construction.
        &self.segments[&segment]
    }

    pub fn episode_ordinals(&self) -> impl Iterator<Item = u32> + '_ {
        self.episodes.keys().copied()
    }

    pub fn scope(&self, range: EpisodeRange) -> Option<&ScopeTables> {
        match range {
            EpisodeRange::All => Some(&self.season),
            EpisodeRange::Segment(segment) => self.segments.get(&segment),
            EpisodeRange::Episode(ordinal) => self.episodes.get(&ordinal),
        }
    }

    /// Ranges this season answers, season-wide first.
    pub fn ranges(&self) -> Vec<EpisodeRange> {
        let mut ranges = vec![EpisodeRange::All];
        ranges.extend(Segment::ALL.map(EpisodeRange::from));
        ranges.extend(self.episode_ordinals().map(EpisodeRange::Episode));
        ranges
    }
}

/// Season selector of a [`ScopeKey`]: one season by label, or the corpus.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum SeasonScope {
    All,
    Season(String),
}

impl fmt::Display for SeasonScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonScope::All => f.write_str(ALL_LABEL),
            SeasonScope::Season(label) => f.write_str(label),
        }
    }
}

impl From<&str> for SeasonScope {
    fn from(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(ALL_LABEL) {
            SeasonScope::All
        } else {
            SeasonScope::Season(trimmed.to_string())
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ScopeKey {
    pub season: SeasonScope,
    pub range: EpisodeRange,
}

impl ScopeKey {
    pub fn new(season: SeasonScope, range: EpisodeRange) -> Self {
        Self { season, range }
    }
}

/// All seasons plus the corpus-wide fold of them.
#[derive(Clone, Debug)]
pub struct CorpusAggregate {
    seasons: Vec<SeasonAggregate>,
    segments: BTreeMap<Segment, ScopeTables>,
    all: ScopeTables,
}

impl CorpusAggregate {
    /// Fold every season, empty ones included, into the corpus scopes.
    pub fn fold(seasons: Vec<SeasonAggregate>) -> Self {
        let segments: BTreeMap<Segment, ScopeTables> = Segment::ALL
            .into_iter()
            .map(|segment| {
                let tables = ScopeTables::merge(seasons.iter().map(|s| s.segment(segment)));
                (segment, tables)
            })
            .collect();
        let all = ScopeTables::merge(seasons.iter().map(SeasonAggregate::season));
        Self {
            seasons,
            segments,
            all,
        }
    }

    pub fn seasons(&self) -> &[SeasonAggregate] {
        &self.seasons
    }

    pub fn season(&self, label: &str) -> Option<&SeasonAggregate> {
        self.seasons.iter().find(|s| s.label == label)
    }

    pub fn all(&self) -> &ScopeTables {
        &self.all
    }

    /// Corpus scopes exist for the whole range and each segment only.
    pub fn scope(&self, key: &ScopeKey) -> Option<&ScopeTables> {
        match &key.season {
            SeasonScope::Season(label) => self.season(label)?.scope(key.range),
            SeasonScope::All => match key.range {
                EpisodeRange::All => Some(&self.all),
                EpisodeRange::Segment(segment) => self.segments.get(&segment),
                EpisodeRange::Episode(_) => None,
            },
        }
    }

    /// Every scope key, season by season and then the corpus.
    pub fn scope_keys(&self) -> Vec<ScopeKey> {
        let mut keys = Vec::new();
        for season in &self.seasons {
            for range in season.ranges() {
                keys.push(ScopeKey::new(
                    SeasonScope::Season(season.label.clone()),
                    range,
                ));
            }
        }
        keys.push(ScopeKey::new(SeasonScope::All, EpisodeRange::All));
        for segment in Segment::ALL {
            keys.push(ScopeKey::new(SeasonScope::All, segment.into()));
        }
        keys
    }
}
