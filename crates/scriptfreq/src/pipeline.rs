use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::citation::SentenceIndex;
use crate::freq::{CorpusAggregate, SeasonAggregate, SeasonScope};
use crate::normalize::Normalizer;
use crate::segment::segment;

static SEASON_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Friends\.(第[一二三四五六七八九十]+季)").expect("season label pattern")
});

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source {0} does not exist")]
    Missing(PathBuf),
    #[error("source {0} contains no text")]
    Empty(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One season's input document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SeasonSource {
    pub label: String,
    pub path: PathBuf,
}

impl SeasonSource {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }

    /// Label from a `Friends.第N季...` file name, else the file stem.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = match SEASON_LABEL.captures(&name).and_then(|c| c.get(1)) {
            Some(m) => m.as_str().to_string(),
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(name),
        };
        Self { label, path }
    }
}

/// Give every source a label that addresses exactly one season.
///
/// Labels are trimmed. A label that repeats an earlier one, or that would
/// parse as the corpus-wide scope, gets the first free `-2`, `-3`, ... suffix.
pub fn unique_labels(sources: Vec<SeasonSource>) -> Vec<SeasonSource> {
    let mut taken: HashSet<String> = HashSet::new();
    sources
        .into_iter()
        .map(|mut source| {
            let base = source.label.trim().to_string();
            let usable = |label: &str, taken: &HashSet<String>| {
                !label.is_empty()
                    && !taken.contains(label)
                    && SeasonScope::from(label) == SeasonScope::Season(label.to_string())
            };
            let mut label = base.clone();
            let mut n = 2;
            while !usable(&label, &taken) {
                label = format!("{base}-{n}");
                n += 1;
            }
            if label != source.label {
                warn!(
                    "season label {:?} of {} renamed to {label:?}",
                    source.label,
                    source.path.display()
                );
                source.label = label.clone();
            }
            taken.insert(label);
            source
        })
        .collect()
}

/// Raw-text extraction from a source document.
pub trait Extract: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, SourceError>;
}

impl<F> Extract for F
where
    F: Fn(&Path) -> Result<String, SourceError> + Send + Sync,
{
    fn extract(&self, path: &Path) -> Result<String, SourceError> {
        self(path)
    }
}

/// Reads documents that were already converted to UTF-8 text.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextExtractor;

impl Extract for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, SourceError> {
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SourceError::Missing(path.to_path_buf()),
            _ => SourceError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        if text.trim().is_empty() {
            return Err(SourceError::Empty(path.to_path_buf()));
        }
        Ok(text)
    }
}

/// Aggregate and citation index of one season's text.
#[derive(Clone, Debug)]
pub struct SeasonAnalysis {
    pub aggregate: SeasonAggregate,
    pub citations: SentenceIndex,
    pub episodes: usize,
}

/// Segment, normalize, count and index one season.
pub fn analyze_text(label: &str, text: &str, normalizer: &Normalizer) -> SeasonAnalysis {
    let episodes = segment(text);
    let aggregate = SeasonAggregate::from_episodes(
        label,
        episodes
            .iter()
            .map(|ep| (ep.ordinal, normalizer.normalize(&ep.text))),
    );
    let citations = SentenceIndex::build(label, &episodes, normalizer);
    SeasonAnalysis {
        aggregate,
        citations,
        episodes: episodes.len(),
    }
}

/// Result of a full batch run.
#[derive(Clone, Debug)]
pub struct CorpusAnalysis {
    pub corpus: CorpusAggregate,
    /// One index per season that produced text, in input order.
    pub citations: Vec<SentenceIndex>,
    pub processed: usize,
    pub skipped: usize,
}

impl CorpusAnalysis {
    pub fn citation_index(&self, season: &str) -> Option<&SentenceIndex> {
        self.citations.iter().find(|idx| idx.season() == season)
    }

    pub fn season_labels(&self) -> impl Iterator<Item = &str> {
        self.corpus.seasons().iter().map(|s| s.label())
    }
}

pub struct Analyzer {
    normalizer: Normalizer,
    extractor: Arc<dyn Extract>,
}

impl Analyzer {
    pub fn new(normalizer: Normalizer, extractor: Arc<dyn Extract>) -> Self {
        Self {
            normalizer,
            extractor,
        }
    }

    pub fn plain_text(normalizer: Normalizer) -> Self {
        Self::new(normalizer, Arc::new(PlainTextExtractor))
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Process every season on the blocking pool, then fold the corpus once
    /// all of them have finished. A season that fails is logged and counted
    /// as an empty aggregate. Labels are made unique first.
    pub async fn run(&self, sources: Vec<SeasonSource>) -> CorpusAnalysis {
        let tasks: Vec<_> = unique_labels(sources)
            .into_iter()
            .map(|source| {
                let label = source.label.clone();
                let normalizer = self.normalizer.clone();
                let extractor = Arc::clone(&self.extractor);
                let handle = tokio::task::spawn_blocking(move || {
                    process_source(&source, extractor.as_ref(), &normalizer)
                });
                (label, handle)
            })
            .collect();

        let mut aggregates = Vec::with_capacity(tasks.len());
        let mut citations = Vec::new();
        let mut processed = 0;
        let mut skipped = 0;
        for (label, handle) in tasks {
            match handle.await {
                Ok(Ok(season)) => {
                    processed += 1;
                    aggregates.push(season.aggregate);
                    citations.push(season.citations);
                }
                Ok(Err(err)) => {
                    warn!("skipping season {label}: {err}");
                    skipped += 1;
                    aggregates.push(SeasonAggregate::empty(label));
                }
                Err(err) => {
                    warn!("season {label} failed: {err}");
                    skipped += 1;
                    aggregates.push(SeasonAggregate::empty(label));
                }
            }
        }

        let start = Instant::now();
        let corpus = CorpusAggregate::fold(aggregates);
        info!(
            "corpus folded in {} ms ({processed} seasons processed, {skipped} skipped)",
            start.elapsed().as_millis()
        );

        CorpusAnalysis {
            corpus,
            citations,
            processed,
            skipped,
        }
    }
}

fn process_source(
    source: &SeasonSource,
    extractor: &dyn Extract,
    normalizer: &Normalizer,
) -> Result<SeasonAnalysis, SourceError> {
    let start = Instant::now();
    let text = extractor.extract(&source.path)?;
    let analysis = analyze_text(&source.label, &text, normalizer);
    let stats = analysis.aggregate.season().stats();
    info!(
        "processed {} in {} ms: {} episodes, {} words, {} sentences",
        source.label,
        start.elapsed().as_millis(),
        analysis.episodes,
        stats.words_total,
        analysis.citations.len()
    );
    Ok(analysis)
}
