//! JSON artifacts for an external presentation layer.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scriptfreq_types::{EpisodeRange, FrequencyEntry, ScopeStats, Sentence};
use serde::Serialize;
use tracing::info;

use crate::citation::SentenceIndex;
use crate::pipeline::CorpusAnalysis;

pub const FREQUENCIES_FILE: &str = "frequencies.json";
pub const SCRIPTS_DIR: &str = "scripts";

/// Every scope's sorted tables and stats.
#[derive(Debug, Serialize)]
pub struct FrequencyDataset<'a> {
    pub seasons: Vec<&'a str>,
    pub processed: usize,
    pub skipped: usize,
    pub scopes: Vec<ScopeReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ScopeReport<'a> {
    pub season: String,
    pub range: EpisodeRange,
    pub words: &'a [FrequencyEntry],
    pub phrases: &'a [FrequencyEntry],
    pub stats: ScopeStats,
}

/// The citation artifact of one season.
#[derive(Debug, Serialize)]
pub struct ScriptArtifact<'a> {
    pub season: &'a str,
    pub sentences: &'a [Sentence],
}

impl<'a> FrequencyDataset<'a> {
    pub fn from_analysis(analysis: &'a CorpusAnalysis) -> Self {
        let corpus = &analysis.corpus;
        let scopes = corpus
            .scope_keys()
            .into_iter()
            .filter_map(|key| {
                let tables = corpus.scope(&key)?;
                Some(ScopeReport {
                    season: key.season.to_string(),
                    range: key.range,
                    words: tables.words.entries(),
                    phrases: tables.phrases.entries(),
                    stats: tables.stats(),
                })
            })
            .collect();
        Self {
            seasons: analysis.season_labels().collect(),
            processed: analysis.processed,
            skipped: analysis.skipped,
            scopes,
        }
    }
}

impl<'a> From<&'a SentenceIndex> for ScriptArtifact<'a> {
    fn from(index: &'a SentenceIndex) -> Self {
        Self {
            season: index.season(),
            sentences: index.sentences(),
        }
    }
}

/// Write `frequencies.json` and one `scripts/<season>.json` per indexed
/// season under `out_dir`. Returns the written paths.
pub fn write_reports(analysis: &CorpusAnalysis, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let scripts_dir = out_dir.join(SCRIPTS_DIR);
    fs::create_dir_all(&scripts_dir)
        .with_context(|| format!("create output directory {}", scripts_dir.display()))?;

    let mut written = Vec::with_capacity(analysis.citations.len() + 1);

    let path = out_dir.join(FREQUENCIES_FILE);
    write_json(&path, &FrequencyDataset::from_analysis(analysis))?;
    written.push(path);

    for index in &analysis.citations {
        let path = scripts_dir.join(format!("{}.json", index.season()));
        write_json(&path, &ScriptArtifact::from(index))?;
        written.push(path);
    }

    info!("wrote {} report files to {}", written.len(), out_dir.display());
    Ok(written)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("serialize {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))
}
