use std::convert::Infallible;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use bytes::Bytes;
use futures::Stream;
use log::{error, info};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::consensus::{ChannelReporter, ConsensusResult, ProgressEvent, ProgressReporter, TranslationRequest};
use crate::errors::EngineError;
use super::state::ServerState;

/// JSON error payload returned for failed requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message; no internals are exposed
    pub error: String,
}

/// Bind the listener and serve the API until shutdown
pub async fn run_server(state: ServerState, bind: &str) -> Result<()> {
    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind server address {}", bind))?;
    info!("Listening on {}", bind);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the API router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/api/translate", post(translate))
        .route("/v1/api/translate/stream", post(translate_stream))
        .fallback(invalid_endpoint)
        .with_state(state)
        .layer(axum::middleware::from_fn(cors_middleware))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn invalid_endpoint() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Unknown endpoint".to_string(),
        }),
    )
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type,authorization"),
    );
}

/// Synchronous consensus translation: JSON in, ranked result out
async fn translate(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<ConsensusResult>, (StatusCode, Json<ErrorResponse>)> {
    state
        .engine
        .run(&request)
        .await
        .map(Json)
        .map_err(engine_error_response)
}

fn engine_error_response(error: EngineError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::AllModelsFailed(_) => StatusCode::BAD_GATEWAY,
        EngineError::Cancelled | EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Translation request failed: {}", error);
    }
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Progressive image translation: multipart upload in, SSE progress out.
///
/// Extracts text from the uploaded image, runs the consensus engine with a
/// channel-backed reporter, and streams each `ProgressEvent` to the caller.
/// The terminal event carries the full result or an error payload; nothing
/// follows it.
async fn translate_stream(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, Json<ErrorResponse>)> {
    let mut image: Option<(Bytes, String)> = None;
    let mut target_language: Option<String> = None;
    let mut source_language: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("image") => {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read image part: {}", e)))?;
                image = Some((data, mime));
            }
            Some("targetLanguage") => {
                target_language = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request(format!("Failed to read targetLanguage: {}", e)))?,
                );
            }
            Some("sourceLanguage") => {
                source_language = field.text().await.ok().filter(|s| !s.trim().is_empty());
            }
            _ => {}
        }
    }

    let (image, mime_type) = image.ok_or_else(|| bad_request("image part is required"))?;
    let target_language = target_language.ok_or_else(|| bad_request("targetLanguage is required"))?;

    let (reporter, receiver) = ChannelReporter::new(16);
    let reporter = Arc::new(reporter);

    tokio::spawn(async move {
        reporter
            .emit(ProgressEvent::phase(2, "Extracting text from image"))
            .await;

        match state.extractor.extract_text(&image, &mime_type).await {
            Ok(text) => {
                let request = TranslationRequest {
                    source_text: text,
                    target_language,
                    source_language,
                };
                // The engine emits the terminal event itself, success or failure
                let progress = reporter.clone() as Arc<dyn ProgressReporter>;
                let _ = state
                    .engine
                    .run_with_progress(&request, Some(progress), None)
                    .await;
            }
            Err(e) => {
                error!("Image text extraction failed: {}", e);
                reporter.emit(ProgressEvent::failed(e.to_string())).await;
            }
        }
    });

    Ok(Sse::new(event_stream(receiver)).keep_alive(KeepAlive::default()))
}

/// Adapt the progress channel into an SSE event stream
fn event_stream(receiver: mpsc::Receiver<ProgressEvent>) -> impl Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold(receiver, |mut receiver| async move {
        let event = receiver.recv().await?;
        let sse_event = Event::default()
            .json_data(&event)
            .unwrap_or_else(|_| Event::default().data("{}"));
        Some((Ok(sse_event), receiver))
    })
}
