use crate::render::html_escape;
use crate::toggle::REGION_ATTRIBUTE;
use crate::{
    Annotator, AnnotatorConfig, FileSource, GlossaryError, MatchStrategy, TOOLTIP_SCRIPT,
    Vocabulary, VocabularySource,
};
use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn};

type SharedState = Arc<AppState>;
type SharedSource = Arc<dyn VocabularySource + Send + Sync>;
const MAX_TEXT_BYTES: usize = 256 * 1024;
const DEMO_TEXT: &str = "Objects in Orbit follow Orbit's pull.";

pub struct AppState {
    pub source: SharedSource,
    pub config: AnnotatorConfig,
}

#[derive(Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub vocabulary: PathBuf,
    pub annotator: AnnotatorConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            vocabulary: PathBuf::from("glossary.json"),
            annotator: AnnotatorConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

pub async fn serve(config: WebConfig) -> Result<(), WebError> {
    let state = Arc::new(AppState {
        source: Arc::new(FileSource::new(config.vocabulary.clone())),
        config: config.annotator.clone(),
    });
    let router = build_router(state);
    info!(
        %config.addr,
        vocabulary = %config.vocabulary.display(),
        strategy = %config.annotator.strategy,
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl From<GlossaryError> for ApiError {
    fn from(value: GlossaryError) -> Self {
        ApiError::unavailable(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(demo_html))
        .route("/api/annotate", post(api_annotate))
        .route("/api/terms", get(api_terms))
        .route("/assets/glossary-tooltip.js", get(tooltip_script))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "glossary-tooltip" }))
}

async fn tooltip_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        TOOLTIP_SCRIPT,
    )
}

#[derive(Debug, Deserialize)]
struct DemoParams {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnnotateRequest {
    text: String,
    max_description_length: Option<usize>,
    strategy: Option<MatchStrategy>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnnotateResponse {
    text: String,
    matches: usize,
    strategy: MatchStrategy,
}

#[derive(Debug, Serialize, Deserialize)]
struct TermPayload {
    name: String,
    description: String,
    detail_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TermsPayload {
    count: usize,
    terms: Vec<TermPayload>,
}

async fn api_annotate(
    State(state): State<SharedState>,
    Json(request): Json<AnnotateRequest>,
) -> Result<Json<AnnotateResponse>, ApiError> {
    if request.text.len() > MAX_TEXT_BYTES {
        return Err(ApiError::bad_request(format!(
            "`text` exceeds {MAX_TEXT_BYTES} bytes"
        )));
    }
    let mut config = state.config.clone();
    if let Some(max) = request.max_description_length {
        config.max_description_length = max;
    }
    if let Some(strategy) = request.strategy {
        config.strategy = strategy;
    }
    let vocabulary = state.source.load()?;
    let annotated = Annotator::new(&vocabulary, &config)?.annotate(&request.text);
    Ok(Json(AnnotateResponse {
        text: annotated.text,
        matches: annotated.matches,
        strategy: config.strategy,
    }))
}

async fn api_terms(State(state): State<SharedState>) -> Result<Json<TermsPayload>, ApiError> {
    let vocabulary = state.source.load()?;
    let base_url = state.config.detail_base_url.as_deref();
    let terms = vocabulary
        .iter()
        .map(|term| TermPayload {
            name: term.name.clone(),
            description: term.description().to_string(),
            detail_url: term.resolve_detail_url(base_url),
        })
        .collect::<Vec<_>>();
    Ok(Json(TermsPayload {
        count: terms.len(),
        terms,
    }))
}

async fn demo_html(
    State(state): State<SharedState>,
    Query(params): Query<DemoParams>,
) -> impl IntoResponse {
    let text = params
        .text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(DEMO_TEXT)
        .to_string();
    // Request text is untrusted; only the inserted tooltip markup stays raw.
    let escaped = html_escape(&text);
    let (annotated, term_count) = match annotate_for_page(&state, &escaped) {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, "glossary vocabulary unavailable, rendering plain text");
            (escaped, 0)
        }
    };
    let template = DemoTemplate {
        text: &text,
        annotated: &annotated,
        term_count,
        region_attribute: REGION_ATTRIBUTE,
    };
    Html(
        template
            .render()
            .unwrap_or_else(|err| format!("<p>template error: {err}</p>")),
    )
}

fn annotate_for_page(state: &AppState, text: &str) -> Result<(String, usize), GlossaryError> {
    let vocabulary: Vocabulary = state.source.load()?;
    let annotator = Annotator::new(&vocabulary, &state.config)?;
    Ok((annotator.annotate(text).text, vocabulary.len()))
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Glossary tooltips</title>
    <style>
      .hidden { display: none; }
      .glossary-tooltip-link { cursor: pointer; text-decoration: underline dotted; }
      .glossary-tooltip-description { display: inline-block; margin: 0 0.25rem; padding: 0.25rem 0.5rem; background: #f1f5f9; border-radius: 0.25rem; }
      .glossary-tooltip-description.hidden { display: none; }
    </style>
  </head>
  <body>
    <main>
      <h1>Glossary tooltips</h1>
      <p>{{ term_count }} term{% if term_count != 1 %}s{% endif %} loaded. Click an underlined term to show its description.</p>
      <form method="get" action="/">
        <textarea name="text" rows="4" cols="80">{{ text }}</textarea>
        <button type="submit">Annotate</button>
      </form>
      <section {{ region_attribute }}="demo">
        <p>{{ annotated|safe }}</p>
      </section>
    </main>
    <script src="/assets/glossary-tooltip.js"></script>
  </body>
</html>"#,
    ext = "html"
)]
struct DemoTemplate<'a> {
    text: &'a str,
    annotated: &'a str,
    term_count: usize,
    region_attribute: &'static str,
}
