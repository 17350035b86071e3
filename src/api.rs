//! HTTP surface for docchat.
//!
//! This module exposes a compact Axum router backing the single-page UI:
//!
//! - `GET /` – The UI page (credential field, PDF upload, summary and chat tabs).
//! - `POST /sessions` – Create a session; the body may carry a credential, falling
//!   back to `GOOGLE_API_KEY`. Without either, session creation is refused.
//! - `POST /sessions/:id/upload` – Multipart PDF upload. A re-submission with an
//!   unchanged name is a no-op; a new name triggers ingestion and clears the
//!   transcript and cached summary.
//! - `POST /sessions/:id/summarize` – Return the cached summary or request one.
//! - `POST /sessions/:id/chat` – Run one Q&A turn over the uploaded document.
//! - `GET /sessions/:id` – Session snapshot consumed by UI re-renders.
//! - `GET /commands` – Machine-readable command catalog for quick discovery.
//!
//! Every failure is converted here into a human-readable inline message; the
//! page renders it next to the action that triggered it.

use crate::chat::{ChatApi, IngestError};
use crate::config::get_config;
use crate::genai::{FileState, GenAiError};
use crate::session::{ChatTurn, SessionStore};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

struct AppState<S> {
    service: Arc<S>,
    sessions: SessionStore,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            sessions: self.sessions.clone(),
        }
    }
}

/// Build the HTTP router exposing the document chat surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: ChatApi + 'static,
{
    let state = AppState {
        service,
        sessions: SessionStore::new(),
    };
    Router::new()
        .route("/", get(index_page))
        .route("/sessions", post(create_session::<S>))
        .route("/sessions/:id", get(session_snapshot::<S>))
        .route("/sessions/:id/upload", post(upload_document::<S>))
        .route("/sessions/:id/summarize", post(summarize_document::<S>))
        .route("/sessions/:id/chat", post(chat_turn::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Serve the embedded UI page.
async fn index_page() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

/// Request body for `POST /sessions`.
#[derive(Deserialize, Default)]
struct CreateSessionRequest {
    /// Credential typed into the UI; falls back to `GOOGLE_API_KEY` when absent.
    #[serde(default)]
    api_key: Option<String>,
}

/// Success response for `POST /sessions`.
#[derive(Serialize)]
struct CreateSessionResponse {
    session_id: Uuid,
}

/// Create a session bound to a resolved credential.
async fn create_session<S>(
    State(state): State<AppState<S>>,
    payload: Option<Json<CreateSessionRequest>>,
) -> Result<Json<CreateSessionResponse>, AppError>
where
    S: ChatApi + 'static,
{
    let requested = payload
        .map(|Json(body)| body)
        .unwrap_or_default()
        .api_key
        .filter(|key| !key.trim().is_empty());
    let api_key = requested
        .or_else(|| get_config().genai_api_key.clone())
        .ok_or(AppError::CredentialRequired)?;

    let session_id = state.sessions.create(api_key).await;
    tracing::info!(%session_id, "Session created");
    Ok(Json(CreateSessionResponse { session_id }))
}

/// Response body for `POST /sessions/:id/upload`.
#[derive(Serialize)]
struct UploadResponse {
    /// Display name of the file the session now tracks.
    file_name: String,
    /// Processing state of the tracked handle, absent after a failed ingestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<FileState>,
    /// Whether an already-ingested handle served this request.
    reused: bool,
}

/// Ingest an uploaded document into the session.
///
/// Re-submitting a file with an unchanged name returns the tracked state
/// without touching the remote service; a new name replaces the document and
/// clears the transcript and cached summary.
async fn upload_document<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError>
where
    S: ChatApi + 'static,
{
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or(AppError::SessionNotFound)?;

    let mut display_name = None;
    let mut bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?
    {
        if field.name() == Some("file") {
            display_name = field.file_name().map(ToString::to_string);
            bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|err| AppError::BadRequest(err.to_string()))?,
            );
            break;
        }
    }
    let bytes = bytes.ok_or_else(|| {
        AppError::BadRequest("Multipart field 'file' is required.".to_string())
    })?;
    let display_name = display_name.unwrap_or_else(|| "document.pdf".to_string());

    let mut session = session.lock().await;
    if session.is_current_file(&display_name) {
        tracing::debug!(file = %display_name, "Upload unchanged; keeping tracked state");
        return Ok(Json(UploadResponse {
            state: session.file.as_ref().map(|file| file.state),
            file_name: display_name,
            reused: true,
        }));
    }

    match state
        .service
        .ingest_document(&session.api_key, &bytes, &display_name)
        .await
    {
        Ok(file) => {
            let file_state = file.state;
            session.install_file(&display_name, file);
            Ok(Json(UploadResponse {
                file_name: display_name,
                state: Some(file_state),
                reused: false,
            }))
        }
        Err(err) => {
            session.clear_file(&display_name);
            Err(AppError::Ingest(err))
        }
    }
}

/// Response body for `POST /sessions/:id/summarize`.
#[derive(Serialize)]
struct SummaryResponse {
    /// Generated or cached summary text.
    summary: String,
    /// Whether the session cache served this request.
    cached: bool,
}

/// Return the cached summary or request one from the remote service.
async fn summarize_document<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummaryResponse>, AppError>
where
    S: ChatApi + 'static,
{
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or(AppError::SessionNotFound)?;
    let mut session = session.lock().await;

    if let Some(summary) = &session.summary {
        return Ok(Json(SummaryResponse {
            summary: summary.clone(),
            cached: true,
        }));
    }

    let file = session.file.clone().ok_or(AppError::NoDocument)?;
    let summary = state
        .service
        .summarize(&session.api_key, &file)
        .await
        .map_err(AppError::Generate)?;
    session.summary = Some(summary.clone());
    tracing::info!(%id, "Summary generated");
    Ok(Json(SummaryResponse {
        summary,
        cached: false,
    }))
}

/// Request body for `POST /sessions/:id/chat`.
#[derive(Deserialize)]
struct ChatRequest {
    /// New user message to answer against the document.
    message: String,
}

/// Success response for `POST /sessions/:id/chat`.
#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

/// Answer one user message; history grows only when the remote call succeeds.
async fn chat_turn<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError>
where
    S: ChatApi + 'static,
{
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or(AppError::SessionNotFound)?;
    let mut session = session.lock().await;

    let file = session.file.clone().ok_or(AppError::NoDocument)?;
    let reply = state
        .service
        .chat(&session.api_key, &file, &session.history, &request.message)
        .await
        .map_err(AppError::Generate)?;
    session.push_exchange(request.message, reply.clone());
    Ok(Json(ChatResponse { reply }))
}

/// Response body for `GET /sessions/:id`.
#[derive(Serialize)]
struct SessionSnapshot {
    /// Display name of the tracked document, if any upload was seen.
    file_name: Option<String>,
    /// Processing state of the tracked handle, absent after a failed ingestion.
    file_state: Option<FileState>,
    /// Cached summary text, when one has been generated.
    summary: Option<String>,
    /// Full conversation transcript in order.
    history: Vec<ChatTurn>,
}

/// Return the state the UI needs to re-render a session.
async fn session_snapshot<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError>
where
    S: ChatApi + 'static,
{
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or(AppError::SessionNotFound)?;
    let session = session.lock().await;
    Ok(Json(SessionSnapshot {
        file_name: session.last_uploaded_filename.clone(),
        file_state: session.file.as_ref().map(|file| file.state),
        summary: session.summary.clone(),
        history: session.history.clone(),
    }))
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "create_session",
                method: "POST",
                path: "/sessions",
                description: "Create a chat session. The body may carry an api_key; otherwise GOOGLE_API_KEY is used.",
                request_example: Some(json!({ "api_key": "optional-credential" })),
            },
            CommandDescriptor {
                name: "upload",
                method: "POST",
                path: "/sessions/:id/upload",
                description: "Multipart PDF upload under the 'file' field. Replacing the document clears the transcript and cached summary.",
                request_example: None,
            },
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/sessions/:id/summarize",
                description: "Return the cached summary or request one from the remote model.",
                request_example: None,
            },
            CommandDescriptor {
                name: "chat",
                method: "POST",
                path: "/sessions/:id/chat",
                description: "Answer one question about the uploaded document.",
                request_example: Some(json!({ "message": "What are the key findings?" })),
            },
            CommandDescriptor {
                name: "snapshot",
                method: "GET",
                path: "/sessions/:id",
                description: "Return the session state consumed by UI re-renders.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    CredentialRequired,
    SessionNotFound,
    NoDocument,
    BadRequest(String),
    Ingest(IngestError),
    Generate(GenAiError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::CredentialRequired => (
                StatusCode::UNAUTHORIZED,
                "API key required. Enter one in the sidebar or set GOOGLE_API_KEY.".to_string(),
            ),
            Self::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "Unknown session. Reload the page to start a new one.".to_string(),
            ),
            Self::NoDocument => (
                StatusCode::CONFLICT,
                "No document is ready. Upload a PDF first.".to_string(),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Ingest(err) => (StatusCode::BAD_GATEWAY, format!("File processing failed: {err}")),
            Self::Generate(err) => (StatusCode::BAD_GATEWAY, format!("Generation failed: {err}")),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
