//! Lexical normalization: raw transcript text to an ordered list of lemmas.
//!
//! The steps run in a fixed order and the order matters, since names are
//! checked three times (raw token, after contraction expansion, after
//! lemmatization) and each check catches forms the previous one missed:
//!
//! 1. drop speaker-attribution lines (`Rachel: ...`), the whole line
//! 2. straighten curly apostrophes
//! 3. tokenize into letter runs with internal apostrophes (`don't`)
//! 4. drop tokens in the [`NameRegistry`]
//! 5. expand contractions (`can't` -> `can not`, `Ross's` -> `ross`)
//! 6. drop empty words, names, fillers and single letters
//! 7. lemmatize with verb, then noun, then adjective priority
//! 8. drop lemmas that landed on a name
//!
//! Dropped tokens leave no gap, so adjacency in the output (which bigrams are
//! built from) is adjacency among survivors.

use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use scriptfreq_morphy::Lemmatize;
use scriptfreq_types::Pos;

use crate::names::NameRegistry;

static SPEAKER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[A-Z][A-Za-z]+\s*:\s").expect("speaker line pattern"));

static WORD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+(?:'[A-Za-z]+)*").expect("word token pattern"));

/// Contractions whose expansion is not "stem + suffix word".
const IRREGULAR_CONTRACTIONS: &[(&str, [&str; 2])] = &[
    ("won't", ["will", "not"]),
    ("can't", ["can", "not"]),
    ("ain't", ["is", "not"]),
    ("let's", ["let", "us"]),
];

const SUFFIX_CONTRACTIONS: &[(&str, &str)] = &[
    ("'re", "are"),
    ("'ve", "have"),
    ("'ll", "will"),
    ("'m", "am"),
];

const WH_WORDS: &[&str] = &["who", "what", "where", "when", "why", "how"];
const PERSONAL_PRONOUNS: &[&str] = &["i", "you", "he", "she", "it", "we", "they", "there"];
const IS_CONTRACTING: &[&str] = &["it", "he", "she", "who", "what", "there", "here", "that"];

/// Discourse markers, interjections and `y'`-style slurs excluded from counts.
const FILLER_WORDS: &[&str] = &[
    "y'know", "yknow", "ya", "yeah", "yep", "nah", "uh", "um", "er", "ah", "hmm", "hm", "oh",
    "eh", "huh", "wow", "whoa", "ooh", "aah", "mmm", "shh", "psst", "tsk", "pfft", "blah", "duh",
    "meh", "bah", "gah", "ugh", "argh", "grr", "eww", "ick", "yuck", "oops", "whoops", "y'all",
    "y'go", "y'miss", "y'okay", "y'see", "y'serious",
];

/// Text-to-lemma pipeline sharing one name registry and one lemmatizer.
#[derive(Clone)]
pub struct Normalizer {
    names: Arc<NameRegistry>,
    lemmatizer: Arc<dyn Lemmatize>,
}

impl Normalizer {
    pub fn new(names: Arc<NameRegistry>, lemmatizer: Arc<dyn Lemmatize>) -> Self {
        Self { names, lemmatizer }
    }

    pub fn names(&self) -> &NameRegistry {
        &self.names
    }

    /// Normalize `text` into the ordered sequence of surviving lemmas.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        self.normalize_unattributed(&strip_speaker_lines(text))
    }

    /// Steps 2 to 8 only, for text whose speaker lines were already decided
    /// on, such as one sentence cut from a line that is not a speaker line.
    pub fn normalize_unattributed(&self, text: &str) -> Vec<String> {
        let straight = straighten_apostrophes(text);

        let mut lemmas = Vec::new();
        for token in WORD_TOKEN.find_iter(&straight) {
            let token = token.as_str();
            if self.names.contains(token) {
                continue;
            }
            for word in expand_contractions(token) {
                let word = word.trim().to_lowercase();
                if word.is_empty()
                    || self.names.contains(&word)
                    || is_filler(&word)
                    || word.chars().count() <= 1
                {
                    continue;
                }
                let lemma = self.lemmatize(&word);
                if self.names.contains(&lemma) {
                    continue;
                }
                lemmas.push(lemma);
            }
        }
        lemmas
    }

    fn lemmatize(&self, word: &str) -> String {
        Pos::LEMMA_PRIORITY
            .into_iter()
            .find_map(|pos| {
                self.lemmatizer
                    .lemma(pos, word)
                    .filter(|lemma| !lemma.is_empty() && lemma != word)
            })
            .unwrap_or_else(|| word.to_string())
    }
}

/// A line that starts with a capitalized word, a colon and whitespace.
pub fn is_speaker_line(line: &str) -> bool {
    SPEAKER_LINE.is_match(line)
}

/// Blank out every speaker line, keeping the line structure.
///
/// The whole line goes, including dialogue that shares it with the label.
pub fn strip_speaker_lines(text: &str) -> Cow<'_, str> {
    if !text.split('\n').any(is_speaker_line) {
        return Cow::Borrowed(text);
    }
    let kept: Vec<&str> = text
        .split('\n')
        .map(|line| if is_speaker_line(line) { "" } else { line })
        .collect();
    Cow::Owned(kept.join("\n"))
}

fn straighten_apostrophes(text: &str) -> Cow<'_, str> {
    if text.contains(['\u{2018}', '\u{2019}']) {
        Cow::Owned(text.replace(['\u{2018}', '\u{2019}'], "'"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Expand one token into its lowercase word(s).
///
/// Irregular forms come from a fixed table; the rest follow suffix rules.
/// A possessive `'s` on anything but a pronoun or demonstrative is dropped
/// without adding a word.
pub fn expand_contractions(token: &str) -> Vec<String> {
    let lower = straighten_apostrophes(token).to_lowercase();
    let w = lower.as_str();

    if let Some((_, words)) = IRREGULAR_CONTRACTIONS.iter().find(|(c, _)| *c == w) {
        return words.iter().map(|s| s.to_string()).collect();
    }

    if let Some(stem) = w.strip_suffix("n't") {
        let stem = match stem {
            "wo" => "will",
            "ca" => "can",
            other => other,
        };
        return vec![stem.to_string(), "not".to_string()];
    }

    for (suffix, word) in SUFFIX_CONTRACTIONS {
        if let Some(stem) = w.strip_suffix(suffix) {
            return vec![stem.to_string(), word.to_string()];
        }
    }

    if let Some(stem) = w.strip_suffix("'d") {
        let word = if WH_WORDS.contains(&stem) {
            "did"
        } else if PERSONAL_PRONOUNS.contains(&stem) {
            "would"
        } else {
            "had"
        };
        return vec![stem.to_string(), word.to_string()];
    }

    if let Some(stem) = w.strip_suffix("'s") {
        if IS_CONTRACTING.contains(&stem) {
            return vec![stem.to_string(), "is".to_string()];
        }
        return vec![stem.to_string()];
    }

    vec![lower]
}

pub fn is_filler(word: &str) -> bool {
    FILLER_WORDS.contains(&word.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptfreq_morphy::{Lexicon, Morphy};

    fn normalizer() -> Normalizer {
        let lexicon = Lexicon::default()
            .with_words(Pos::Verb, ["walk", "drink", "call", "break"])
            .with_words(Pos::Noun, ["coffee", "cup", "break", "apartment"]);
        Normalizer::new(
            Arc::new(NameRegistry::builtin()),
            Arc::new(Morphy::with_lexicon(lexicon)),
        )
    }

    fn expand(token: &str) -> Vec<String> {
        expand_contractions(token)
    }

    #[test]
    fn expands_contractions_deterministically() {
        assert_eq!(expand("can't"), ["can", "not"]);
        assert_eq!(expand("won't"), ["will", "not"]);
        assert_eq!(expand("Ain't"), ["is", "not"]);
        assert_eq!(expand("let's"), ["let", "us"]);
        assert_eq!(expand("don't"), ["do", "not"]);
        assert_eq!(expand("they're"), ["they", "are"]);
        assert_eq!(expand("we've"), ["we", "have"]);
        assert_eq!(expand("you'll"), ["you", "will"]);
        assert_eq!(expand("I'm"), ["i", "am"]);
        assert_eq!(expand("it's"), ["it", "is"]);
        assert_eq!(expand("who'd"), ["who", "did"]);
        assert_eq!(expand("I'd"), ["i", "would"]);
        assert_eq!(expand("Joey'd"), ["joey", "had"]);
        assert_eq!(expand("Ross's"), ["ross"]);
        assert_eq!(expand("rock'n'roll"), ["rock'n'roll"]);
        assert_eq!(expand("coffee"), ["coffee"]);
    }

    #[test]
    fn smart_apostrophes_expand_like_straight_ones() {
        assert_eq!(expand("can\u{2019}t"), ["can", "not"]);
        assert_eq!(normalizer().normalize("they\u{2019}re"), ["they", "be"]);
    }

    #[test]
    fn contraction_words_flow_through_in_order() {
        let n = normalizer();
        assert_eq!(n.normalize("who'd go"), ["who", "do", "go"]);
        assert_eq!(n.normalize("I'd go"), ["would", "go"]);
        assert_eq!(n.normalize("can't"), ["can", "not"]);
    }

    #[test]
    fn possessive_name_contributes_nothing() {
        let n = normalizer();
        assert!(n.normalize("Ross's").is_empty());
        assert!(n.normalize("Geller's").is_empty());
        assert_eq!(n.normalize("Monica's apartment"), ["apartment"]);
    }

    #[test]
    fn strips_whole_speaker_lines() {
        let n = normalizer();
        let text = "Chandler: Could this be any more coffee?\nwe walked home\n";
        assert_eq!(n.normalize(text), ["we", "walk", "home"]);
        assert_eq!(strip_speaker_lines("note:x stays"), "note:x stays");
    }

    #[test]
    fn speaker_label_counts_only_at_line_start() {
        let n = normalizer();
        assert!(!is_speaker_line("Fine. Waiter: espresso please"));
        assert!(is_speaker_line("  Waiter: espresso please"));
        assert_eq!(
            strip_speaker_lines("Ross: hi\nFine. Waiter: coffee"),
            "\nFine. Waiter: coffee"
        );
        assert_eq!(
            n.normalize("Fine. Waiter: coffee please"),
            ["fine", "waiter", "coffee", "please"]
        );
        assert!(n.normalize("Waiter: coffee please").is_empty());
        assert_eq!(
            n.normalize_unattributed("Waiter: coffee please"),
            ["waiter", "coffee", "please"]
        );
    }

    #[test]
    fn drops_fillers_short_words_and_names() {
        let n = normalizer();
        let text = "oh yeah, uh, Joey drank a cup of coffee y'know";
        assert_eq!(n.normalize(text), ["drank", "cup", "of", "coffee"]);
    }

    #[test]
    fn lemmas_prefer_verb_then_noun_then_adjective() {
        let lemmatizer = |pos: Pos, word: &str| match (pos, word) {
            (Pos::Verb, "breaks") => Some("break".to_string()),
            (Pos::Noun, "breaks") => Some("breaknoun".to_string()),
            (Pos::Adj, "better") => Some("good".to_string()),
            (Pos::Noun, "better") => Some("better".to_string()),
            _ => None,
        };
        let n = Normalizer::new(Arc::new(NameRegistry::builtin()), Arc::new(lemmatizer));
        assert_eq!(n.normalize("breaks better"), ["break", "good"]);
    }

    #[test]
    fn lemma_collapsing_onto_name_is_dropped() {
        let lemmatizer = |pos: Pos, word: &str| {
            (pos == Pos::Noun && word == "bings").then(|| "bing".to_string())
        };
        let n = Normalizer::new(Arc::new(NameRegistry::builtin()), Arc::new(lemmatizer));
        assert_eq!(n.normalize("two bings please"), ["two", "please"]);
    }

    #[test]
    fn normalized_text_is_a_fixed_point() {
        let n = normalizer();
        let once = n.normalize(
            "Rachel: hi\nWe were on a break! They're drinking coffees, aren't they?",
        );
        assert!(!once.is_empty());
        let twice = n.normalize(&once.join(" "));
        assert_eq!(once, twice);
    }

    #[test]
    fn lemma_landing_on_a_filler_is_kept_once() {
        let lemmatizer = |pos: Pos, word: &str| {
            (pos == Pos::Noun && word == "ohs").then(|| "oh".to_string())
        };
        let n = Normalizer::new(Arc::new(NameRegistry::builtin()), Arc::new(lemmatizer));
        let once = n.normalize("two ohs");
        assert_eq!(once, ["two", "oh"]);
        assert_eq!(n.normalize(&once.join(" ")), ["two"]);
    }

    #[test]
    fn fillers_are_case_insensitive() {
        assert!(is_filler("Yeah"));
        assert!(is_filler("y'know"));
        assert!(!is_filler("year"));
    }
}
