//! Per-session conversation state and the store that isolates sessions.
//!
//! Each UI session owns its credential, transcript, uploaded-file handle, and
//! cached summary. Nothing is shared between sessions and nothing survives the
//! process; the store is a plain in-memory map behind async locks.

use crate::genai::{FileHandle, Role};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// One turn of the visible conversation transcript.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    /// Speaker that produced the text.
    pub role: Role,
    /// Rendered message text.
    pub text: String,
}

impl ChatTurn {
    /// Build a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Build a model turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Mutable state carried for the lifetime of one UI session.
#[derive(Debug)]
pub struct SessionState {
    /// Credential used for every remote call issued on behalf of this session.
    pub api_key: String,
    /// Ordered transcript of user/model turns.
    pub history: Vec<ChatTurn>,
    /// Handle to the remotely stored document, when one is ready.
    pub file: Option<FileHandle>,
    /// Cached summary returned by the first summarize action.
    pub summary: Option<String>,
    /// Display name of the last upload, used to detect a new upload event.
    pub last_uploaded_filename: Option<String>,
}

impl SessionState {
    /// Create an empty session bound to the resolved credential.
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            history: Vec::new(),
            file: None,
            summary: None,
            last_uploaded_filename: None,
        }
    }

    /// Whether `display_name` matches the last upload seen by this session.
    pub fn is_current_file(&self, display_name: &str) -> bool {
        self.last_uploaded_filename.as_deref() == Some(display_name)
    }

    /// Install a freshly ingested file, discarding all state tied to the previous one.
    pub fn install_file(&mut self, display_name: &str, file: FileHandle) {
        self.file = Some(file);
        self.last_uploaded_filename = Some(display_name.to_string());
        self.history.clear();
        self.summary = None;
    }

    /// Record a failed ingestion of `display_name`.
    ///
    /// The session keeps the name so a re-submission of the same file is not
    /// retried, but no usable handle remains and state tied to any previous
    /// document is discarded.
    pub fn clear_file(&mut self, display_name: &str) {
        self.file = None;
        self.last_uploaded_filename = Some(display_name.to_string());
        self.history.clear();
        self.summary = None;
    }

    /// Append a completed question/answer exchange to the transcript.
    pub fn push_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.history.push(ChatTurn::user(question));
        self.history.push(ChatTurn::model(answer));
    }
}

/// Shared registry of per-session state, keyed by session id.
///
/// Sessions are wrapped in their own locks so operations on one session
/// serialize while distinct sessions proceed independently.
#[derive(Default, Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, Arc<Mutex<SessionState>>>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and return its identifier.
    pub async fn create(&self, api_key: String) -> Uuid {
        let id = Uuid::new_v4();
        self.inner
            .lock()
            .await
            .insert(id, Arc::new(Mutex::new(SessionState::new(api_key))));
        id
    }

    /// Look up a session by id.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<SessionState>>> {
        self.inner.lock().await.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::FileState;

    fn ready_handle(name: &str) -> FileHandle {
        FileHandle {
            name: format!("files/{name}"),
            uri: format!("https://example.org/files/{name}"),
            display_name: Some(name.to_string()),
            mime_type: Some("application/pdf".into()),
            state: FileState::Ready,
        }
    }

    #[test]
    fn install_file_clears_history_and_summary() {
        let mut session = SessionState::new("key".into());
        session.install_file("first.pdf", ready_handle("first"));
        session.push_exchange("What is this?", "A paper.");
        session.summary = Some("A summary.".into());

        session.install_file("second.pdf", ready_handle("second"));

        assert!(session.history.is_empty());
        assert!(session.summary.is_none());
        assert!(session.is_current_file("second.pdf"));
        assert_eq!(
            session.file.as_ref().map(|file| file.name.as_str()),
            Some("files/second")
        );
    }

    #[test]
    fn clear_file_records_name_without_handle() {
        let mut session = SessionState::new("key".into());
        session.install_file("first.pdf", ready_handle("first"));
        session.push_exchange("Q", "A");

        session.clear_file("broken.pdf");

        assert!(session.file.is_none());
        assert!(session.history.is_empty());
        assert!(session.summary.is_none());
        assert!(session.is_current_file("broken.pdf"));
        assert!(!session.is_current_file("first.pdf"));
    }

    #[test]
    fn exchanges_append_in_order() {
        let mut session = SessionState::new("key".into());
        session.push_exchange("Q1", "A1");
        session.push_exchange("Q2", "A2");

        let texts: Vec<&str> = session
            .history
            .iter()
            .map(|turn| turn.text.as_str())
            .collect();
        assert_eq!(texts, ["Q1", "A1", "Q2", "A2"]);
        assert_eq!(session.history[0].role, Role::User);
        assert_eq!(session.history[1].role, Role::Model);
    }

    #[tokio::test]
    async fn store_isolates_sessions() {
        let store = SessionStore::new();
        let first = store.create("key-a".into()).await;
        let second = store.create("key-b".into()).await;
        assert_ne!(first, second);

        {
            let session = store.get(first).await.expect("first session");
            session.lock().await.push_exchange("Q", "A");
        }

        let untouched = store.get(second).await.expect("second session");
        assert!(untouched.lock().await.history.is_empty());
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }
}
