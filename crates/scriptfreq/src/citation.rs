//! Sentence-level citation index: example sentences for a lemma.
//!
//! Speaker lines are recognized per line before sentence splitting; the
//! sentences of any other line get their lemma sets from the normalizer run
//! on each sentence on its own. They are used for lookups only and never feed frequency counts.

use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::sync::LazyLock;

use bitvec::prelude::*;
use regex::Regex;
use scriptfreq_morphy::surface_forms;
use scriptfreq_types::{EpisodeRange, Sentence};

use crate::normalize::{Normalizer, is_speaker_line};
use crate::segment::Episode;

pub const MAX_CITATIONS: usize = 25;

type BitSet = BitVec<usize, Lsb0>;

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+\s+|\n+").expect("sentence break pattern"));

/// Split on terminal punctuation followed by whitespace, or on newlines.
/// Punctuation stays with its sentence; empty pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BREAK.find_iter(text) {
        let end = m.start() + m.as_str().trim_end().len();
        sentences.push(&text[start..end]);
        start = m.end();
    }
    sentences.push(&text[start..]);
    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// One season's sentences in id order, with a lemma -> sentence posting list.
#[derive(Clone, Debug)]
pub struct SentenceIndex {
    season: String,
    sentences: Vec<Sentence>,
    postings: HashMap<String, BitSet>,
}

impl SentenceIndex {
    /// Index every sentence of `episodes`. Ids start at 1 and keep counting
    /// across episode boundaries.
    pub fn build(season: impl Into<String>, episodes: &[Episode], normalizer: &Normalizer) -> Self {
        let mut sentences = Vec::new();
        let mut next_id = 1u64;
        for episode in episodes {
            for line in episode.text.lines() {
                // Speaker lines are decided per line, as the frequency counts do.
                let speaker = is_speaker_line(line);
                for text in split_sentences(line) {
                    let lemmas: BTreeSet<String> = if speaker {
                        BTreeSet::new()
                    } else {
                        normalizer.normalize_unattributed(text).into_iter().collect()
                    };
                    sentences.push(Sentence {
                        id: next_id,
                        episode: episode.ordinal,
                        text: text.to_string(),
                        lemmas,
                    });
                    next_id += 1;
                }
            }
        }
        Self::from_sentences(season, sentences)
    }

    /// Index sentences that already carry lemma sets, e.g. from a saved
    /// script artifact. Sentences are kept in ascending id order.
    pub fn from_sentences(season: impl Into<String>, mut sentences: Vec<Sentence>) -> Self {
        sentences.sort_by_key(|s| s.id);
        let n = sentences.len();
        let mut postings: HashMap<String, BitSet> = HashMap::new();
        for (idx, sentence) in sentences.iter().enumerate() {
            for lemma in &sentence.lemmas {
                postings
                    .entry(lemma.clone())
                    .or_insert_with(|| bitvec![usize, Lsb0; 0; n])
                    .set(idx, true);
            }
        }
        Self {
            season: season.into(),
            sentences,
            postings,
        }
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Up to [`MAX_CITATIONS`] sentences containing `lemma` within `range`,
    /// in ascending id order.
    pub fn query(&self, lemma: &str, range: EpisodeRange) -> Vec<&Sentence> {
        self.matching(lemma, range).take(MAX_CITATIONS).collect()
    }

    fn matching<'a>(
        &'a self,
        lemma: &str,
        range: EpisodeRange,
    ) -> impl Iterator<Item = &'a Sentence> + 'a {
        let lemma = lemma.trim().to_lowercase();
        self.postings
            .get(&lemma)
            .into_iter()
            .flat_map(|bits| bits.iter_ones())
            .filter_map(|idx| self.sentences.get(idx))
            .filter(move |s| range.contains(s.episode))
    }
}

/// A sentence hit tagged with its season.
#[derive(Clone, Copy, Debug)]
pub struct Citation<'a> {
    pub season: &'a str,
    pub sentence: &'a Sentence,
}

/// Cross-season lookup: seasons are visited in the given order and the walk
/// stops once [`MAX_CITATIONS`] hits are collected.
pub fn query_corpus<'a>(
    indexes: &'a [SentenceIndex],
    lemma: &str,
    range: EpisodeRange,
) -> Vec<Citation<'a>> {
    indexes
        .iter()
        .flat_map(|index| {
            index.matching(lemma, range).map(|sentence| Citation {
                season: index.season(),
                sentence,
            })
        })
        .take(MAX_CITATIONS)
        .collect()
}

/// Byte ranges of whole-word, case-insensitive occurrences of any surface
/// form of `lemma` in `text`.
pub fn highlight_spans(text: &str, lemma: &str) -> Vec<Range<usize>> {
    let forms = surface_forms(lemma);
    let alternatives: Vec<String> = forms
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| regex::escape(f))
        .collect();
    if alternatives.is_empty() {
        return Vec::new();
    }
    let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => re.find_iter(text).map(|m| m.range()).collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use scriptfreq_morphy::{Lexicon, Morphy};
    use scriptfreq_types::{Pos, Segment};

    use super::*;
    use crate::names::NameRegistry;

    fn normalizer() -> Normalizer {
        let lexicon = Lexicon::default()
            .with_words(Pos::Verb, ["walk", "drink"])
            .with_words(Pos::Noun, ["coffee", "cup"]);
        Normalizer::new(
            Arc::new(NameRegistry::builtin()),
            Arc::new(Morphy::with_lexicon(lexicon)),
        )
    }

    fn episode(ordinal: u32, text: &str) -> Episode {
        Episode {
            ordinal,
            text: text.to_string(),
        }
    }

    #[test]
    fn splits_on_punctuation_and_newlines() {
        let text = "How you doin'? Fine!  Really.\nNext line\n\nlast one";
        assert_eq!(
            split_sentences(text),
            ["How you doin'?", "Fine!", "Really.", "Next line", "last one"]
        );
        assert_eq!(split_sentences("a.b stays"), ["a.b stays"]);
        assert!(split_sentences(" \n ").is_empty());
    }

    #[test]
    fn ids_increase_across_episodes() {
        let episodes = [
            episode(1, "We walked. More coffee?"),
            episode(9, "I drank coffee!\nThe cup broke."),
        ];
        let index = SentenceIndex::build("S1", &episodes, &normalizer());
        let ids: Vec<u64> = index.sentences().iter().map(|s| s.id).collect();
        assert_eq!(ids, [1, 2, 3, 4]);
        assert_eq!(index.sentences()[2].episode, 9);
        assert!(index.sentences()[0].has_lemma("walk"));
    }

    #[test]
    fn query_filters_by_range_and_caps_results() {
        let episodes: Vec<Episode> = (1..=30)
            .map(|n| episode(n, &format!("coffee number {n}.")))
            .collect();
        let index = SentenceIndex::build("S1", &episodes, &normalizer());

        let all = index.query("coffee", EpisodeRange::All);
        assert_eq!(all.len(), MAX_CITATIONS);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let middle = index.query("Coffee", Segment::Middle.into());
        assert_eq!(middle.len(), 8);
        assert!(middle.iter().all(|s| (9..=16).contains(&s.episode)));

        assert_eq!(index.query("coffee", EpisodeRange::Episode(30)).len(), 1);
        assert!(index.query("tea", EpisodeRange::All).is_empty());
    }

    #[test]
    fn mid_line_speaker_label_keeps_its_lemmas() {
        let episodes = [episode(
            1,
            "Fine. Waiter: coffee please\nRachel: more coffee. Another cup.",
        )];
        let index = SentenceIndex::build("S1", &episodes, &normalizer());
        let texts: Vec<&str> = index.sentences().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            ["Fine.", "Waiter: coffee please", "Rachel: more coffee.", "Another cup."]
        );
        assert!(index.sentences()[1].has_lemma("coffee"));
        assert!(index.sentences()[2].lemmas.is_empty());
        assert!(index.sentences()[3].lemmas.is_empty());

        let hits = index.query("coffee", EpisodeRange::All);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
        assert!(index.query("cup", EpisodeRange::All).is_empty());
    }

    #[test]
    fn corpus_query_walks_seasons_in_order() {
        let n = normalizer();
        let first = SentenceIndex::build(
            "S1",
            &[episode(1, &"coffee again. ".repeat(20))],
            &n,
        );
        let second = SentenceIndex::build("S2", &[episode(1, &"coffee later. ".repeat(20))], &n);
        let corpus = [first, second];
        let hits = query_corpus(&corpus, "coffee", EpisodeRange::All);
        assert_eq!(hits.len(), MAX_CITATIONS);
        assert_eq!(hits.iter().filter(|c| c.season == "S1").count(), 20);
        assert_eq!(hits.last().map(|c| c.season), Some("S2"));
    }

    #[test]
    fn highlights_irregular_and_regular_forms() {
        let text = "She Went home and goes out; forgone is not gone.";
        let spans = highlight_spans(text, "go");
        let words: Vec<&str> = spans.iter().map(|r| &text[r.clone()]).collect();
        assert_eq!(words, ["Went", "goes", "gone"]);

        let text = "Walking, walked, walks and a walkway.";
        let spans = highlight_spans(text, "walk");
        let words: Vec<&str> = spans.iter().map(|r| &text[r.clone()]).collect();
        assert_eq!(words, ["Walking", "walked", "walks"]);
    }
}
