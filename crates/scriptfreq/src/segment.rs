//! Episode segmentation of a season transcript.
//!
//! Boundaries come from the first [`BoundaryStrategy`] (in priority order)
//! that finds anything; patterns are never mixed. Text before the first
//! boundary, or a text with no boundaries at all, becomes episode 1.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static FRIENDS_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*Friends\s+S(\d{1,2})E(\d{1,2})\b").expect("friends marker pattern")
});

static BARE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*S(\d{1,2})E(\d{1,2})\b").expect("bare marker pattern")
});

static EPISODE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*The\s+One\s+[^\n]+").expect("episode title pattern"));

/// A detected episode start.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Boundary {
    /// Byte offset into the (line-ending normalized) season text.
    pub offset: usize,
    /// Episode number, when the pattern captures one.
    pub ordinal: Option<u32>,
}

/// One way of locating episode starts, tried in [`BoundaryStrategy::CHAIN`] order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoundaryStrategy {
    /// `Friends S01E02` header lines.
    FriendsMarker,
    /// Bare `S01E02` header lines.
    BareMarker,
    /// `The One ...` episode titles; carries no episode number.
    EpisodeTitle,
}

impl BoundaryStrategy {
    pub const CHAIN: [BoundaryStrategy; 3] = [
        BoundaryStrategy::FriendsMarker,
        BoundaryStrategy::BareMarker,
        BoundaryStrategy::EpisodeTitle,
    ];

    pub fn detect(self, text: &str) -> Vec<Boundary> {
        match self {
            BoundaryStrategy::FriendsMarker => numbered(&FRIENDS_MARKER, text),
            BoundaryStrategy::BareMarker => numbered(&BARE_MARKER, text),
            BoundaryStrategy::EpisodeTitle => EPISODE_TITLE
                .find_iter(text)
                .map(|m| Boundary {
                    offset: m.start(),
                    ordinal: None,
                })
                .collect(),
        }
    }
}

fn numbered(pattern: &Regex, text: &str) -> Vec<Boundary> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Boundary {
                offset: whole.start(),
                ordinal: caps.get(2).and_then(|m| m.as_str().parse().ok()),
            })
        })
        .collect()
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Episode {
    pub ordinal: u32,
    pub text: String,
}

/// Replace `\r\n` with `\n` so offsets and line anchors agree across sources.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Boundaries of `text` after fallback, implicit start and deduplication.
pub fn boundaries(text: &str) -> Vec<Boundary> {
    let mut found = Vec::new();
    for strategy in BoundaryStrategy::CHAIN {
        found = strategy.detect(text);
        if !found.is_empty() {
            debug!("{strategy:?} found {} episode boundaries", found.len());
            break;
        }
    }

    if !text.is_empty() && found.first().is_none_or(|b| b.offset != 0) {
        found.insert(
            0,
            Boundary {
                offset: 0,
                ordinal: Some(1),
            },
        );
    }
    found.sort_by_key(|b| b.offset);
    found.dedup_by_key(|b| b.offset);
    found
}

/// Split a season's raw text into ordered, non-empty episodes.
///
/// Episodes without a captured number take their 1-based position among the
/// kept episodes.
pub fn segment(season_text: &str) -> Vec<Episode> {
    let text = normalize_line_endings(season_text);
    let bounds = boundaries(&text);

    let mut episodes = Vec::with_capacity(bounds.len());
    for (i, boundary) in bounds.iter().enumerate() {
        let end = bounds.get(i + 1).map_or(text.len(), |next| next.offset);
        let slice = text[boundary.offset..end].trim();
        if slice.is_empty() {
            continue;
        }
        let ordinal = boundary.ordinal.unwrap_or(episodes.len() as u32 + 1);
        episodes.push(Episode {
            ordinal,
            text: slice.to_string(),
        });
    }
    episodes
}
