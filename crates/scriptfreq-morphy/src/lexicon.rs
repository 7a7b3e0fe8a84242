use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scriptfreq_types::Pos;

use crate::normalize;

/// Per-POS sets of known lemmas, used to verify rule-based candidates.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    lemmas: HashMap<Pos, HashSet<String>>,
}

impl Lexicon {
    /// Load the lemma column of WordNet `index.*` files from a dict directory.
    ///
    /// Missing files contribute an empty set; license header lines (which
    /// start with whitespace) are skipped.
    pub fn load(dict_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dict_dir.as_ref();
        let mut lemmas = HashMap::new();
        for pos in [Pos::Noun, Pos::Verb, Pos::Adj, Pos::Adv] {
            let path = dir.join(format!("index.{}", pos.file_suffix()));
            lemmas.insert(pos, load_index(path)?);
        }
        Ok(Self { lemmas })
    }

    /// Add lemmas for one part of speech.
    pub fn with_words<I, S>(mut self, pos: Pos, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = self.lemmas.entry(pos).or_default();
        set.extend(words.into_iter().map(|w| normalize(w.as_ref())));
        self
    }

    pub fn contains(&self, pos: Pos, lemma: &str) -> bool {
        self.lemmas
            .get(&pos)
            .is_some_and(|set| set.contains(&normalize(lemma)))
    }

    pub fn len(&self) -> usize {
        self.lemmas.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn load_index(path: PathBuf) -> Result<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let file = File::open(&path).with_context(|| format!("open index file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut set = HashSet::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        if line.is_empty() || line.starts_with([' ', '\t']) {
            continue;
        }
        if let Some(lemma) = line.split_ascii_whitespace().next() {
            set.insert(normalize(lemma));
        }
    }
    Ok(set)
}
