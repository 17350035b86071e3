//! Hosted generative-language service integration.

pub mod client;
pub mod types;

pub use client::GenAiClient;
pub use types::{Content, FileData, FileHandle, FileState, GenAiError, ModelInfo, Part, Role};
