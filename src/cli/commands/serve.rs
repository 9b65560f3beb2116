//! HTTP API server for a web front-end.
//!
//! Every request carries its own conversation, so no session state lives on
//! the server.

use crate::chat::{ConversationTurn, Role};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::VidqaError;
use crate::rag::{normalize_video_name, normalize_video_url, Answer, Assistant};
use crate::vector_index::SearchMatch;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    assistant: Assistant,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidqa doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let state = Arc::new(AppState {
        assistant: Assistant::from_settings(&settings)?,
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("vidqa API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Search", "POST /search");
    Output::kv("Ask", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/search", post(search))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SegmentInfo>,
}

#[derive(Serialize)]
struct SegmentInfo {
    id: String,
    video_name: String,
    video_created: String,
    video_duration: String,
    score: f32,
    content: String,
    url: String,
}

impl From<&SearchMatch> for SegmentInfo {
    fn from(m: &SearchMatch) -> Self {
        Self {
            id: m.id.clone(),
            video_name: normalize_video_name(&m.video_name()),
            video_created: m.video_created(),
            video_duration: m.video_duration(),
            score: m.score,
            content: m.content(),
            url: normalize_video_url(&m.url()),
        }
    }
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    /// Earlier turns of this session, as returned by a previous `/ask`.
    #[serde(default)]
    history: Vec<ConversationTurn>,
}

#[derive(Serialize)]
struct AskResponse {
    /// Markdown answer.
    answer: String,
    videos: Vec<VideoEmbed>,
    sources: Vec<SegmentInfo>,
    /// Session history to send back with the next question.
    history: Vec<ConversationTurn>,
}

#[derive(Serialize)]
struct VideoEmbed {
    url: String,
    summary: String,
    iframe: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: VidqaError) -> Response {
    let status = match e {
        VidqaError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!("Request failed: {}", e);
    }
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

fn ask_response(answer: Answer, history: Vec<ConversationTurn>) -> AskResponse {
    AskResponse {
        videos: answer
            .references
            .iter()
            .map(|r| VideoEmbed {
                url: r.url.clone(),
                summary: r.summary.clone(),
                iframe: r.iframe_html(),
            })
            .collect(),
        sources: answer.query.matches.iter().map(SegmentInfo::from).collect(),
        answer: answer.reply,
        history,
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search(State(state): State<Arc<AppState>>, Json(req): Json<SearchRequest>) -> Response {
    match state.assistant.retrieve(&req.query).await {
        Ok(matches) => Json(SearchResponse {
            results: matches.iter().map(SegmentInfo::from).collect(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    let mut conversation = state.assistant.new_conversation();
    // The system turn is always the server's own
    conversation
        .turns_mut()
        .extend(req.history.into_iter().filter(|t| t.role != Role::System));

    match state.assistant.answer(&mut conversation, &req.question).await {
        Ok(answer) => Json(ask_response(answer, conversation.turns().to_vec())).into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_index::{keys, Metadata};

    #[test]
    fn test_segment_info_normalizes_display_fields() {
        let m = SearchMatch::new(
            "seg-1",
            0.8,
            Metadata::default()
                .with(keys::VIDEO_NAME, "Invoices-101.mp4")
                .with(keys::URL, "https://drive.google.com/file/d/1/view"),
        );

        let info = SegmentInfo::from(&m);
        assert_eq!(info.video_name, "Invoices 101");
        assert_eq!(info.url, "https://drive.google.com/file/d/1/preview");
        assert_eq!(info.video_created, "Unknown date");
    }

    #[test]
    fn test_ask_request_history_is_optional() {
        let req: AskRequest = serde_json::from_str(r#"{"question": "hi"}"#).unwrap();
        assert!(req.history.is_empty());

        let req: AskRequest = serde_json::from_str(
            r#"{"question": "and then?", "history": [{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello"}]}"#,
        )
        .unwrap();
        assert_eq!(req.history.len(), 2);
        assert_eq!(req.history[1].role, Role::Assistant);
    }

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let response = error_response(VidqaError::InvalidInput("empty".to_string()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_response(VidqaError::Chat("timeout".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
