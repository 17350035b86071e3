//! Orchestration service bridging session state and the remote generation API.

use crate::{
    chat::{
        context::{chat_contents, summary_contents},
        types::IngestError,
    },
    config::get_config,
    genai::{FileHandle, FileState, GenAiClient, GenAiError},
    session::ChatTurn,
};
use async_trait::async_trait;
use std::future::Future;
use std::io::Write as _;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Coordinates ingestion, summarization, and chat against the remote service.
///
/// The service owns the long-lived HTTP client; per-session state lives in
/// [`crate::session::SessionStore`] and is threaded through by the HTTP
/// surface. Construct the service once near process start and share it
/// through an `Arc`.
pub struct DocChatService {
    genai: GenAiClient,
    model: String,
    poll_interval: Duration,
    poll_max_attempts: u32,
}

/// Abstraction over the chat pipeline used by the HTTP surface.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Spool, upload, and poll a document until it is ready for generation.
    async fn ingest_document(
        &self,
        api_key: &str,
        bytes: &[u8],
        display_name: &str,
    ) -> Result<FileHandle, IngestError>;

    /// Request a detailed summary of the uploaded document.
    async fn summarize(&self, api_key: &str, file: &FileHandle) -> Result<String, GenAiError>;

    /// Answer one user message in the context of the document and prior turns.
    async fn chat(
        &self,
        api_key: &str,
        file: &FileHandle,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, GenAiError>;
}

impl DocChatService {
    /// Build a service from the process configuration.
    pub fn new() -> Result<Self, GenAiError> {
        let config = get_config();
        Ok(Self::with_client(
            GenAiClient::new(&config.genai_base_url)?,
            config.genai_model.clone(),
            Duration::from_millis(config.upload_poll_interval_ms),
            config.upload_poll_max_attempts,
        ))
    }

    /// Build a service around an explicit client, bypassing global configuration.
    pub fn with_client(
        genai: GenAiClient,
        model: impl Into<String>,
        poll_interval: Duration,
        poll_max_attempts: u32,
    ) -> Self {
        Self {
            genai,
            model: model.into(),
            poll_interval,
            poll_max_attempts,
        }
    }

    /// Spool the uploaded bytes to disk, push them to the remote service, and
    /// poll until the file leaves the processing state.
    ///
    /// The spool file is removed on every exit path, including errors.
    pub async fn ingest_document(
        &self,
        api_key: &str,
        bytes: &[u8],
        display_name: &str,
    ) -> Result<FileHandle, IngestError> {
        tracing::info!(file = display_name, size = bytes.len(), "Ingesting document");
        let spool = spool_to_disk(bytes)?;
        self.upload_and_poll(api_key, spool.path(), display_name)
            .await
    }

    async fn upload_and_poll(
        &self,
        api_key: &str,
        path: &Path,
        display_name: &str,
    ) -> Result<FileHandle, IngestError> {
        let uploaded = self
            .genai
            .upload_file(api_key, path, display_name, "application/pdf")
            .await?;

        let client = &self.genai;
        let handle = poll_until_terminal(
            uploaded,
            self.poll_interval,
            self.poll_max_attempts,
            move |name: String| async move { client.get_file(api_key, &name).await },
        )
        .await?;

        tracing::info!(file = display_name, name = %handle.name, "Document ready");
        Ok(handle)
    }

    /// Request a one-shot summary for the uploaded document.
    pub async fn summarize(
        &self,
        api_key: &str,
        file: &FileHandle,
    ) -> Result<String, GenAiError> {
        tracing::info!(file = %file.name, "Requesting summary");
        self.genai
            .generate_content(api_key, &self.model, summary_contents(file))
            .await
    }

    /// Answer `message` against the document and the prior transcript.
    pub async fn chat(
        &self,
        api_key: &str,
        file: &FileHandle,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, GenAiError> {
        tracing::info!(file = %file.name, turns = history.len(), "Running chat turn");
        self.genai
            .generate_content(api_key, &self.model, chat_contents(file, history, message))
            .await
    }
}

#[async_trait]
impl ChatApi for DocChatService {
    async fn ingest_document(
        &self,
        api_key: &str,
        bytes: &[u8],
        display_name: &str,
    ) -> Result<FileHandle, IngestError> {
        DocChatService::ingest_document(self, api_key, bytes, display_name).await
    }

    async fn summarize(&self, api_key: &str, file: &FileHandle) -> Result<String, GenAiError> {
        DocChatService::summarize(self, api_key, file).await
    }

    async fn chat(
        &self,
        api_key: &str,
        file: &FileHandle,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, GenAiError> {
        DocChatService::chat(self, api_key, file, history, message).await
    }
}

/// Write the uploaded bytes to a scoped temporary file.
///
/// The returned guard deletes the file when dropped, which covers success,
/// error, and panic exits of the ingestion flow.
fn spool_to_disk(bytes: &[u8]) -> Result<NamedTempFile, std::io::Error> {
    let mut spool = tempfile::Builder::new()
        .prefix("docchat-upload-")
        .suffix(".pdf")
        .tempfile()?;
    spool.write_all(bytes)?;
    spool.flush()?;
    tracing::debug!(path = %spool.path().display(), "Spooled upload");
    Ok(spool)
}

/// Poll the remote state until the handle leaves the processing state.
///
/// Performs at most `max_attempts` fetches, waiting `interval` before each
/// one. Once a terminal state is observed no further fetches occur.
async fn poll_until_terminal<F, Fut>(
    first: FileHandle,
    interval: Duration,
    max_attempts: u32,
    mut fetch: F,
) -> Result<FileHandle, IngestError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<FileHandle, GenAiError>>,
{
    let mut handle = first;
    let mut attempts = 0;
    while handle.state == FileState::Pending {
        if attempts >= max_attempts {
            return Err(IngestError::PollTimeout { attempts });
        }
        tokio::time::sleep(interval).await;
        handle = fetch(handle.name.clone()).await?;
        attempts += 1;
    }

    match handle.state {
        FileState::Ready => Ok(handle),
        FileState::Failed => Err(IngestError::ProcessingFailed {
            display_name: handle.display_name.unwrap_or(handle.name),
        }),
        FileState::Pending | FileState::Unknown => Err(IngestError::UnexpectedState),
    }
}
