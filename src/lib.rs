#![deny(missing_docs)]

//! Core library for the docchat demo server.

/// HTTP routing and REST handlers.
pub mod api;
/// Document chat orchestration: ingestion, summarization, and Q&A.
pub mod chat;
/// Environment-driven configuration management.
pub mod config;
/// Hosted generative-language service integration.
pub mod genai;
/// Model listing routine backing the `list-models` binary.
pub mod lister;
/// Structured logging and tracing setup.
pub mod logging;
/// Per-session conversation state.
pub mod session;
