//! WordNet-style morphological processing (morphy) behind a small trait.
//!
//! Candidates are produced in a fixed order: built-in irregular verb forms,
//! dictionary exception lists (`*.exc`), then POS-specific suffix rules.
//! Exception-file and rule candidates only survive when the [`Lexicon`] knows
//! the resulting lemma; the built-in irregular table is trusted as-is.
//!
//! Callers that only need "the lemma of this word" use the [`Lemmatize`]
//! trait, which answers `None` when nothing differs from the surface form.
//!
//! # Example
//! ```
//! use scriptfreq_morphy::{Lemmatize, Lexicon, Morphy};
//! use scriptfreq_types::Pos;
//!
//! let lexicon = Lexicon::default().with_words(Pos::Verb, ["run", "call"]);
//! let morph = Morphy::with_lexicon(lexicon);
//!
//! assert_eq!(morph.lemma(Pos::Verb, "running").as_deref(), Some("run"));
//! assert_eq!(morph.lemma(Pos::Verb, "were").as_deref(), Some("be"));
//! assert_eq!(morph.lemma(Pos::Verb, "call"), None);
//! ```

mod irregular;
mod lexicon;

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scriptfreq_types::Pos;

pub use irregular::{IRREGULAR_VERBS, irregular_forms, surface_forms};
pub use lexicon::Lexicon;

/// Lemma lookup capability consumed by the normalizer.
pub trait Lemmatize: Send + Sync {
    /// Lemma of `surface` for `pos`, present only when it differs from the
    /// lowercased surface form.
    fn lemma(&self, pos: Pos, surface: &str) -> Option<String>;
}

impl<F> Lemmatize for F
where
    F: Fn(Pos, &str) -> Option<String> + Send + Sync,
{
    fn lemma(&self, pos: Pos, surface: &str) -> Option<String> {
        self(pos, surface)
    }
}

/// Where a candidate lemma originated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CandidateSource {
    Surface,
    Irregular,
    Exception,
    Rule {
        suffix: &'static str,
        replacement: &'static str,
    },
}

/// A lemma candidate paired with its POS and provenance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LemmaCandidate<'a> {
    pub pos: Pos,
    pub lemma: Cow<'a, str>,
    pub source: CandidateSource,
}

pub struct Morphy {
    irregular: HashMap<&'static str, &'static str>,
    exceptions: HashMap<Pos, HashMap<String, Vec<String>>>,
    lexicon: Lexicon,
}

impl Morphy {
    /// Irregular verb table only; no dictionary, so suffix rules never fire.
    pub fn builtin() -> Self {
        Self::with_lexicon(Lexicon::default())
    }

    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self {
            irregular: irregular::inverted().collect(),
            exceptions: HashMap::new(),
            lexicon,
        }
    }

    /// Load exception lists (`*.exc`) and the lemma index from a WordNet dict
    /// directory. Missing files are treated as empty.
    pub fn load(dict_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dict_dir.as_ref();
        let lexicon = Lexicon::load(dir)?;
        let mut exceptions = HashMap::new();
        for pos in [Pos::Noun, Pos::Verb, Pos::Adj, Pos::Adv] {
            let path = dir.join(format!("{}.exc", pos.file_suffix()));
            exceptions.insert(pos, load_exc(path)?);
        }
        Ok(Self {
            exceptions,
            ..Self::with_lexicon(lexicon)
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Every candidate lemma for a surface form, in priority order.
    pub fn lemmas_for<'a>(&'a self, pos: Pos, surface: &str) -> Vec<LemmaCandidate<'a>> {
        let mut seen: HashSet<Cow<'a, str>> = HashSet::new();
        let mut out: Vec<LemmaCandidate<'a>> = Vec::new();
        let norm_surface = normalize(surface);

        if self.lexicon.contains(pos, &norm_surface) {
            push_unique(
                &mut out,
                &mut seen,
                LemmaCandidate {
                    pos,
                    lemma: Cow::Owned(norm_surface.clone()),
                    source: CandidateSource::Surface,
                },
            );
        }

        if pos == Pos::Verb
            && let Some(base) = self.irregular.get(norm_surface.as_str())
        {
            push_unique(
                &mut out,
                &mut seen,
                LemmaCandidate {
                    pos,
                    lemma: Cow::Borrowed(*base),
                    source: CandidateSource::Irregular,
                },
            );
        }

        if let Some(exc_map) = self.exceptions.get(&pos)
            && let Some(entries) = exc_map.get(&norm_surface)
        {
            for lemma in entries {
                if self.lexicon.contains(pos, lemma) {
                    push_unique(
                        &mut out,
                        &mut seen,
                        LemmaCandidate {
                            pos,
                            lemma: Cow::Borrowed(lemma.as_str()),
                            source: CandidateSource::Exception,
                        },
                    );
                }
            }
        }

        for (suffix, replacement) in rules_for(pos) {
            for candidate in apply_rule(&norm_surface, suffix, replacement) {
                if self.lexicon.contains(pos, &candidate) {
                    push_unique(
                        &mut out,
                        &mut seen,
                        LemmaCandidate {
                            pos,
                            lemma: Cow::Owned(candidate),
                            source: CandidateSource::Rule {
                                suffix,
                                replacement,
                            },
                        },
                    );
                }
            }
        }

        out
    }
}

impl Lemmatize for Morphy {
    fn lemma(&self, pos: Pos, surface: &str) -> Option<String> {
        let norm_surface = normalize(surface);
        self.lemmas_for(pos, &norm_surface)
            .into_iter()
            .find(|cand| cand.lemma != norm_surface.as_str())
            .map(|cand| cand.lemma.into_owned())
    }
}

fn load_exc(path: PathBuf) -> Result<HashMap<String, Vec<String>>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let file =
        File::open(&path).with_context(|| format!("open exception file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut map = HashMap::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        let mut parts = line.split_whitespace();
        let surface = match parts.next() {
            Some(s) => normalize(s),
            None => continue,
        };
        let lemmas: Vec<String> = parts.map(normalize).collect();
        if !lemmas.is_empty() {
            map.insert(surface, lemmas);
        }
    }
    Ok(map)
}

pub(crate) fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace(' ', "_")
}

fn push_unique<'a>(
    out: &mut Vec<LemmaCandidate<'a>>,
    seen: &mut HashSet<Cow<'a, str>>,
    candidate: LemmaCandidate<'a>,
) {
    if seen.insert(candidate.lemma.clone()) {
        out.push(candidate);
    }
}

/// Strip `suffix` and append `replacement`. When the stripped stem ends in a
/// doubled letter ("runn", "stopp") the collapsed stem is offered second.
/// Single-letter results ("as" -> "a", "us" -> "u") are never offered.
fn apply_rule(surface: &str, suffix: &str, replacement: &str) -> Vec<String> {
    let Some(stem) = surface.strip_suffix(suffix) else {
        return Vec::new();
    };
    if !replacement.is_empty() {
        return vec![format!("{stem}{replacement}")];
    }
    if stem.chars().count() < 2 {
        return Vec::new();
    }

    let mut out = vec![stem.to_string()];
    if matches!(suffix, "ed" | "ing" | "er" | "est") {
        let mut chars = stem.chars();
        let last = chars.next_back();
        let prev = chars.next_back();
        if let (Some(a), Some(b)) = (last, prev)
            && a == b
        {
            let mut collapsed = stem.to_string();
            collapsed.pop();
            out.push(collapsed);
        }
    }
    out
}

fn rules_for(pos: Pos) -> &'static [(&'static str, &'static str)] {
    match pos {
        Pos::Noun => &[
            ("s", ""),
            ("ses", "s"),
            ("xes", "x"),
            ("zes", "z"),
            ("ches", "ch"),
            ("shes", "sh"),
            ("men", "man"),
            ("ies", "y"),
        ],
        Pos::Verb => &[
            ("s", ""),
            ("ies", "y"),
            ("es", "e"),
            ("es", ""),
            ("ed", "e"),
            ("ed", ""),
            ("ing", "e"),
            ("ing", ""),
        ],
        Pos::Adj | Pos::Adv => &[("er", ""), ("er", "e"), ("est", ""), ("est", "e")],
    }
}
