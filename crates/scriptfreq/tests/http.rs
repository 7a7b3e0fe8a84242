use std::path::Path;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::util::ServiceExt;

use scriptfreq::handlers::{AppState, router};
use scriptfreq::pipeline::{Analyzer, SeasonSource, SourceError};
use scriptfreq::{NameRegistry, Normalizer};
use scriptfreq_morphy::{Lexicon, Morphy};
use scriptfreq_types::Pos;

fn season_text(label: &str) -> Option<&'static str> {
    match label {
        "S1" => Some(
            "Friends S01E01\nWe went for coffee. The coffee was cold.\n\
             Friends S01E09\nJoey goes to the apartment. More coffee!\n",
        ),
        "S2" => Some("S02E01\ncoffee cup. Another coffee cup.\n"),
        _ => None,
    }
}

async fn make_state(disable_cache: bool) -> AppState {
    let lexicon = Lexicon::default()
        .with_words(Pos::Verb, ["go", "be"])
        .with_words(Pos::Noun, ["coffee", "cup", "apartment"]);
    let normalizer = Normalizer::new(
        Arc::new(NameRegistry::builtin()),
        Arc::new(Morphy::with_lexicon(lexicon)),
    );
    let extractor = |path: &Path| -> Result<String, SourceError> {
        let label = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        season_text(label)
            .map(str::to_string)
            .ok_or_else(|| SourceError::Missing(path.to_path_buf()))
    };
    let sources = ["S1", "S2", "S3"]
        .into_iter()
        .map(|label| SeasonSource::new(label, format!("{label}.txt")))
        .collect();
    let analysis = Analyzer::new(normalizer, Arc::new(extractor))
        .run(sources)
        .await;
    AppState {
        analysis: Arc::new(analysis),
        max_page_size: 3,
        disable_cache,
    }
}

async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(state);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn healthz_ok() {
    let app = router(make_state(false).await);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn seasons_lists_labels_and_counts() {
    let (status, body) = get_json(make_state(false).await, "/v1/seasons").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seasons"], serde_json::json!(["S1", "S2", "S3"]));
    assert_eq!(body["processed"], 2);
    assert_eq!(body["skipped"], 1);
}

#[tokio::test]
async fn frequencies_default_to_corpus_words() {
    let (status, body) = get_json(make_state(false).await, "/v1/frequencies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["season"], "All");
    assert_eq!(body["range"], "All");
    assert_eq!(body["kind"], "words");
    assert_eq!(body["page_size"], 3);
    let items = body["items"].as_array().unwrap();
    assert!(items.len() <= 3);
    let counts: Vec<u64> = items.iter().map(|i| i["count"].as_u64().unwrap()).collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]));
    assert!(body["stats"]["wordsTotal"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn frequencies_filter_by_scope_and_substring() {
    let (status, body) = get_json(
        make_state(false).await,
        "/v1/frequencies?season=S1&range=9-16&q=COFF",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["key"], "coffee");
    assert_eq!(body["items"][0]["count"], 1);

    let (_, body) = get_json(
        make_state(false).await,
        "/v1/frequencies?season=S2&kind=phrases&page_size=1",
    )
    .await;
    assert_eq!(body["kind"], "phrases");
    assert_eq!(body["items"][0]["key"], "coffee cup");
    assert_eq!(body["items"][0]["count"], 2);
    assert_eq!(body["has_more"], true);
}

#[tokio::test]
async fn frequencies_rejects_invalid_params() {
    let (status, body) = get_json(make_state(false).await, "/v1/frequencies?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("page"));

    let (status, body) = get_json(make_state(false).await, "/v1/frequencies?range=5-9").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("range"));
}

#[tokio::test]
async fn unknown_scopes_are_not_found() {
    for uri in [
        "/v1/frequencies?season=S9",
        "/v1/frequencies?season=S1&range=E4",
        "/v1/frequencies?season=All&range=E1",
        "/v1/citations?lemma=coffee&season=S9",
    ] {
        let (status, body) = get_json(make_state(false).await, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn citations_carry_highlights() {
    let (status, body) = get_json(
        make_state(false).await,
        "/v1/citations?lemma=go&season=S1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["text"], "We went for coffee.");
    assert_eq!(items[0]["highlights"], serde_json::json!([[3, 7]]));
    assert_eq!(items[1]["ep"], 9);
    assert_eq!(items[1]["season"], "S1");
}

#[tokio::test]
async fn corpus_citations_span_seasons_in_order() {
    let (status, body) = get_json(make_state(false).await, "/v1/citations?lemma=Coffee").await;
    assert_eq!(status, StatusCode::OK);
    let seasons: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["season"].as_str().unwrap())
        .collect();
    assert_eq!(seasons, ["S1", "S1", "S1", "S2", "S2"]);

    let (status, body) = get_json(
        make_state(false).await,
        "/v1/citations?lemma=coffee&season=S3",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn citations_require_a_lemma() {
    let (status, _) = get_json(make_state(false).await, "/v1/citations?lemma=%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cache_headers_follow_the_flag() {
    for (disable, expect_header) in [(false, true), (true, false)] {
        let app = router(make_state(disable).await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/seasons")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().contains_key(header::CACHE_CONTROL),
            expect_header
        );
    }
}
