use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use scriptfreq_types::{EpisodeRange, FrequencyEntry, ScopeStats};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::citation::{Citation, highlight_spans, query_corpus};
use crate::freq::{EntryQuery, ScopeKey, SeasonScope, TableKind};
use crate::pipeline::CorpusAnalysis;

const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub analysis: Arc<CorpusAnalysis>,
    pub max_page_size: usize,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct FrequenciesQuery {
    pub season: Option<String>,
    pub range: Option<String>,
    pub kind: Option<TableKind>,
    pub q: Option<String>,
    pub max_count: Option<u64>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Deserialize)]
pub struct CitationsQuery {
    pub lemma: String,
    pub season: Option<String>,
    pub range: Option<String>,
}

#[derive(Serialize)]
pub struct SeasonsResponse {
    seasons: Vec<String>,
    processed: usize,
    skipped: usize,
}

#[derive(Serialize)]
pub struct FrequenciesResponse {
    season: String,
    range: EpisodeRange,
    kind: TableKind,
    page: usize,
    page_size: usize,
    total: usize,
    has_more: bool,
    stats: ScopeStats,
    items: Vec<FrequencyEntry>,
}

#[derive(Serialize)]
pub struct CitationsResponse {
    lemma: String,
    season: String,
    range: EpisodeRange,
    items: Vec<CitationItem>,
}

#[derive(Serialize)]
pub struct CitationItem {
    season: String,
    id: u64,
    ep: u32,
    text: String,
    /// Byte offsets `[start, end)` of highlighted words in `text`.
    highlights: Vec<[usize; 2]>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/seasons", get(seasons))
        .route("/v1/frequencies", get(frequencies))
        .route("/v1/citations", get(citations))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn seasons(State(state): State<AppState>) -> Response {
    let analysis = &state.analysis;
    let response = SeasonsResponse {
        seasons: analysis.season_labels().map(str::to_string).collect(),
        processed: analysis.processed,
        skipped: analysis.skipped,
    };
    cached(&state, Json(response))
}

async fn frequencies(
    State(state): State<AppState>,
    Query(params): Query<FrequenciesQuery>,
) -> Result<Response, ApiError> {
    let (season, range) = parse_scope(params.season.as_deref(), params.range.as_deref())?;
    let kind = params.kind.unwrap_or_default();

    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::bad_request("page must be >= 1"));
    }
    let mut page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(ApiError::bad_request("page_size must be >= 1"));
    }
    if page_size > state.max_page_size {
        page_size = state.max_page_size;
    }

    let key = ScopeKey::new(season, range);
    let tables = state
        .analysis
        .corpus
        .scope(&key)
        .ok_or_else(|| ApiError::not_found(&key))?;

    let result = tables.table(kind).query(EntryQuery {
        contains: params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()),
        max_count: params.max_count,
        page,
        page_size,
    });

    let response = FrequenciesResponse {
        season: key.season.to_string(),
        range: key.range,
        kind,
        page,
        page_size,
        total: result.total,
        has_more: result.has_more,
        stats: tables.stats(),
        items: result.items,
    };
    Ok(cached(&state, Json(response)))
}

async fn citations(
    State(state): State<AppState>,
    Query(params): Query<CitationsQuery>,
) -> Result<Response, ApiError> {
    let lemma = params.lemma.trim().to_lowercase();
    if lemma.is_empty() {
        return Err(ApiError::bad_request("lemma is required"));
    }
    let (season, range) = parse_scope(params.season.as_deref(), params.range.as_deref())?;
    let analysis = &state.analysis;

    let hits: Vec<Citation<'_>> = match &season {
        SeasonScope::All => query_corpus(&analysis.citations, &lemma, range),
        SeasonScope::Season(label) => {
            if analysis.corpus.season(label).is_none() {
                return Err(ApiError::NotFound(format!("unknown season {label}")));
            }
            // Skipped seasons have no index and simply cite nothing.
            analysis
                .citation_index(label)
                .map(|index| {
                    index
                        .query(&lemma, range)
                        .into_iter()
                        .map(|sentence| Citation {
                            season: index.season(),
                            sentence,
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        }
    };

    let items = hits
        .into_iter()
        .map(|hit| CitationItem {
            season: hit.season.to_string(),
            id: hit.sentence.id,
            ep: hit.sentence.episode,
            text: hit.sentence.text.clone(),
            highlights: highlight_spans(&hit.sentence.text, &lemma)
                .into_iter()
                .map(|r| [r.start, r.end])
                .collect(),
        })
        .collect();

    let response = CitationsResponse {
        lemma,
        season: season.to_string(),
        range,
        items,
    };
    Ok(cached(&state, Json(response)))
}

fn parse_scope(
    season: Option<&str>,
    range: Option<&str>,
) -> Result<(SeasonScope, EpisodeRange), ApiError> {
    let season = match season.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => SeasonScope::from(raw),
        None => SeasonScope::All,
    };
    let range = match range.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => raw
            .parse::<EpisodeRange>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => EpisodeRange::All,
    };
    Ok((season, range))
}

fn cached(state: &AppState, body: impl IntoResponse) -> Response {
    if state.disable_cache {
        return body.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        )],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }

    fn not_found(key: &ScopeKey) -> Self {
        ApiError::NotFound(format!("no scope {} / {}", key.season, key.range))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
