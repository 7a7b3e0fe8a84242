pub mod citation;
pub mod freq;
pub mod handlers;
pub mod names;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod segment;

pub use citation::{Citation, MAX_CITATIONS, SentenceIndex, highlight_spans, query_corpus};
pub use freq::{
    CorpusAggregate, FrequencyTable, ScopeKey, ScopeTables, SeasonAggregate, SeasonScope,
    TableKind,
};
pub use handlers::{AppState, router};
pub use names::NameRegistry;
pub use normalize::Normalizer;
pub use pipeline::{
    Analyzer, CorpusAnalysis, Extract, PlainTextExtractor, SeasonSource, SourceError,
};
pub use report::write_reports;
pub use segment::{Episode, segment};
