//! Construction of the generation context resent on every remote call.
//!
//! The remote service keeps no conversation state between calls, so each chat
//! turn rebuilds the full context: the file reference, a fixed framing
//! exchange, the prior transcript in original order, and the new message.

use crate::genai::{Content, FileHandle, Part};
use crate::session::ChatTurn;

/// Instruction sent with the file handle when a summary is requested.
pub const SUMMARY_PROMPT: &str = "Please summarize this document in detail.";

/// Scripted user turn anchoring the conversation to the uploaded document.
pub const DOCUMENT_PRIMER: &str = "We will be discussing the uploaded document.";

/// Scripted model acknowledgement completing the framing exchange.
pub const PRIMER_ACK: &str = "Understood. Ask me anything about the document.";

/// Build the contents for a one-shot summarization request.
pub fn summary_contents(file: &FileHandle) -> Vec<Content> {
    vec![Content::user(vec![
        Part::file(file),
        Part::text(SUMMARY_PROMPT),
    ])]
}

/// Reconstruct the full chat context for a new user message.
///
/// `history` must not include the message being submitted; the caller appends
/// it to the transcript only after the remote call succeeds.
pub fn chat_contents(file: &FileHandle, history: &[ChatTurn], message: &str) -> Vec<Content> {
    let mut contents = Vec::with_capacity(history.len() + 3);
    contents.push(Content::user(vec![
        Part::file(file),
        Part::text(DOCUMENT_PRIMER),
    ]));
    contents.push(Content::model(vec![Part::text(PRIMER_ACK)]));
    for turn in history {
        contents.push(Content {
            role: turn.role,
            parts: vec![Part::text(&turn.text)],
        });
    }
    contents.push(Content::user(vec![Part::text(message)]));
    contents
}
