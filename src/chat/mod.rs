//! Document chat orchestration: ingestion, summarization, and Q&A.

pub mod context;
mod service;
pub mod types;

pub use service::{ChatApi, DocChatService};
pub use types::IngestError;
