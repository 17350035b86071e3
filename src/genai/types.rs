//! Shared types used by the generative-language client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while interacting with the generative-language service.
#[derive(Debug, Error)]
pub enum GenAiError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
    /// Local file could not be read prior to upload.
    #[error("Failed to read upload source: {0}")]
    Io(#[from] std::io::Error),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Service responded with an unexpected status code.
    #[error("Unexpected service response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Generation succeeded but returned no usable text.
    #[error("Generation response contained no text")]
    EmptyResponse,
}

/// Remote lifecycle stage of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileState {
    /// Upload accepted; the service is still processing the bytes.
    #[serde(rename = "PROCESSING")]
    Pending,
    /// File is ready to be referenced from generation requests.
    #[serde(rename = "ACTIVE")]
    Ready,
    /// The service gave up on the file.
    #[serde(rename = "FAILED")]
    Failed,
    /// Any state this client does not recognize.
    #[serde(other)]
    Unknown,
}

/// Opaque reference to a file stored by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    /// Server-assigned resource name (`files/...`).
    pub name: String,
    /// URI used to reference the file from generation requests.
    pub uri: String,
    /// Display name echoed back from the upload request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// MIME type recorded by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Current processing state.
    pub state: FileState,
}

/// Speaker role attached to each conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human asking questions.
    User,
    /// The remote model answering them.
    Model,
}

/// One role-tagged element of a generation request or response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Speaker that produced the parts.
    pub role: Role,
    /// Ordered parts making up this turn.
    pub parts: Vec<Part>,
}

impl Content {
    /// Content spoken by the user role.
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    /// Content spoken by the model role.
    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }
}

/// A single content part: either literal text or a stored-file reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Literal text.
    Text {
        /// The text itself.
        text: String,
    },
    /// Reference to a previously uploaded file.
    #[serde(rename_all = "camelCase")]
    FileData {
        /// The file reference payload.
        file_data: FileData,
    },
}

impl Part {
    /// Build a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Build a part referencing an uploaded file.
    pub fn file(handle: &FileHandle) -> Self {
        Self::FileData {
            file_data: FileData {
                mime_type: handle.mime_type.clone(),
                file_uri: handle.uri.clone(),
            },
        }
    }
}

/// File reference payload embedded in a content part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    /// MIME type of the referenced file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// URI of the referenced file as reported at upload time.
    pub file_uri: String,
}

/// Model descriptor returned by the listing operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Fully qualified model resource name (`models/...`).
    pub name: String,
    /// Human-readable model name, when provided.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Operations the model declares support for.
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Whether the model can serve `generateContent` requests.
    pub fn supports_generation(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|method| method == "generateContent")
    }
}

#[derive(Deserialize)]
pub(crate) struct UploadResponse {
    pub(crate) file: FileHandle,
}

#[derive(Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<CandidateContent>,
}

#[derive(Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub(crate) parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListModelsResponse {
    #[serde(default)]
    pub(crate) models: Vec<ModelInfo>,
    #[serde(default)]
    pub(crate) next_page_token: Option<String>,
}
