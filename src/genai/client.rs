//! HTTP client wrapper for the hosted generative-language service.

use crate::genai::types::{
    Content, FileHandle, GenAiError, GenerateResponse, ListModelsResponse, ModelInfo, Part,
    UploadResponse,
};
use reqwest::{Client, Method, multipart};
use serde_json::json;
use std::path::Path;

const API_VERSION: &str = "v1beta";

/// Lightweight HTTP client for the generative-language REST surface.
///
/// The credential is supplied per call rather than at construction time
/// because each UI session may carry its own key.
pub struct GenAiClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl GenAiClient {
    /// Construct a client for the given service base URL.
    pub fn new(base_url: &str) -> Result<Self, GenAiError> {
        let client = Client::builder().user_agent("docchat/0.1").build()?;
        let base_url = normalize_base_url(base_url).map_err(GenAiError::InvalidUrl)?;
        tracing::debug!(url = %base_url, "Initialized generative-language HTTP client");
        Ok(Self { client, base_url })
    }

    /// Upload a local file and return the handle reported by the service.
    ///
    /// The returned handle usually starts in the processing state; callers
    /// poll [`GenAiClient::get_file`] until it becomes terminal.
    pub async fn upload_file(
        &self,
        api_key: &str,
        path: &Path,
        display_name: &str,
        mime_type: &str,
    ) -> Result<FileHandle, GenAiError> {
        let bytes = tokio::fs::read(path).await?;
        let metadata = json!({ "file": { "displayName": display_name } });
        let form = multipart::Form::new()
            .part(
                "metadata",
                multipart::Part::text(metadata.to_string()).mime_str("application/json")?,
            )
            .part(
                "file",
                multipart::Part::bytes(bytes)
                    .file_name(display_name.to_string())
                    .mime_str(mime_type)?,
            );

        let response = self
            .request(Method::POST, api_key, &format!("upload/{API_VERSION}/files"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = GenAiError::UnexpectedStatus { status, body };
            tracing::error!(file = display_name, error = %error, "Upload failed");
            return Err(error);
        }

        let payload: UploadResponse = response.json().await?;
        tracing::debug!(
            file = display_name,
            name = %payload.file.name,
            state = ?payload.file.state,
            "Upload accepted"
        );
        Ok(payload.file)
    }

    /// Fetch the current state of an uploaded file by its resource name.
    pub async fn get_file(&self, api_key: &str, name: &str) -> Result<FileHandle, GenAiError> {
        let response = self
            .request(Method::GET, api_key, &format!("{API_VERSION}/{name}"))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = GenAiError::UnexpectedStatus { status, body };
            tracing::error!(name, error = %error, "File state check failed");
            Err(error)
        }
    }

    /// Run one generation call and return the text of the first candidate.
    pub async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        contents: Vec<Content>,
    ) -> Result<String, GenAiError> {
        let body = json!({ "contents": contents });
        let response = self
            .request(
                Method::POST,
                api_key,
                &format!("{API_VERSION}/models/{model}:generateContent"),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = GenAiError::UnexpectedStatus { status, body };
            tracing::error!(model, error = %error, "Generation request failed");
            return Err(error);
        }

        let payload: GenerateResponse = response.json().await?;
        let text: String = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| match part {
                        Part::Text { text } => Some(text),
                        Part::FileData { .. } => None,
                    })
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenAiError::EmptyResponse);
        }
        Ok(text)
    }

    /// Enumerate models visible to the supplied credential, following pagination.
    pub async fn list_models(&self, api_key: &str) -> Result<Vec<ModelInfo>, GenAiError> {
        let mut page_token: Option<String> = None;
        let mut models = Vec::new();

        loop {
            let mut request = self.request(Method::GET, api_key, &format!("{API_VERSION}/models"));
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let response = request.send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let error = GenAiError::UnexpectedStatus { status, body };
                tracing::error!(error = %error, "Failed to list models");
                return Err(error);
            }

            let payload: ListModelsResponse = response.json().await?;
            models.extend(payload.models);

            match payload.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(models)
    }

    fn request(&self, method: Method, api_key: &str, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.client
            .request(method, url)
            .header("x-goog-api-key", api_key)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::types::{FileState, Role};
    use httpmock::{Method::GET, Method::POST, MockServer};
    use std::io::Write as _;

    fn test_client(base_url: String) -> GenAiClient {
        GenAiClient {
            client: Client::builder()
                .user_agent("docchat-test")
                .build()
                .expect("client"),
            base_url,
        }
    }

    #[tokio::test]
    async fn upload_file_emits_expected_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/upload/v1beta/files")
                    .header("x-goog-api-key", "secret");
                then.status(200).json_body(json!({
                    "file": {
                        "name": "files/abc123",
                        "uri": "https://example.org/files/abc123",
                        "displayName": "paper.pdf",
                        "mimeType": "application/pdf",
                        "state": "PROCESSING"
                    }
                }));
            })
            .await;

        let mut spool = tempfile::NamedTempFile::new().expect("spool");
        spool.write_all(b"%PDF-1.4 test").expect("spool write");

        let client = test_client(server.base_url());
        let handle = client
            .upload_file("secret", spool.path(), "paper.pdf", "application/pdf")
            .await
            .expect("upload");

        mock.assert_async().await;
        assert_eq!(handle.name, "files/abc123");
        assert_eq!(handle.state, FileState::Pending);
    }

    #[tokio::test]
    async fn get_file_maps_terminal_state() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1beta/files/abc123");
                then.status(200).json_body(json!({
                    "name": "files/abc123",
                    "uri": "https://example.org/files/abc123",
                    "state": "ACTIVE"
                }));
            })
            .await;

        let client = test_client(server.base_url());
        let handle = client
            .get_file("secret", "files/abc123")
            .await
            .expect("file state");

        mock.assert_async().await;
        assert_eq!(handle.state, FileState::Ready);
    }

    #[tokio::test]
    async fn generate_content_extracts_candidate_text() {
        let server = MockServer::start_async().await;
        let contents = vec![Content::user(vec![Part::text("Hello?")])];
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/demo-model:generateContent")
                    .json_body(json!({
                        "contents": [
                            { "role": "user", "parts": [{ "text": "Hello?" }] }
                        ]
                    }));
                then.status(200).json_body(json!({
                    "candidates": [
                        {
                            "content": {
                                "role": "model",
                                "parts": [{ "text": "Hi " }, { "text": "there." }]
                            }
                        }
                    ]
                }));
            })
            .await;

        let client = test_client(server.base_url());
        let text = client
            .generate_content("secret", "demo-model", contents)
            .await
            .expect("generation");

        mock.assert_async().await;
        assert_eq!(text, "Hi there.");
    }

    #[tokio::test]
    async fn generate_content_rejects_empty_candidates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/demo-model:generateContent");
                then.status(200).json_body(json!({ "candidates": [] }));
            })
            .await;

        let client = test_client(server.base_url());
        let result = client
            .generate_content(
                "secret",
                "demo-model",
                vec![Content {
                    role: Role::User,
                    parts: vec![Part::text("Hello?")],
                }],
            )
            .await;

        assert!(matches!(result, Err(GenAiError::EmptyResponse)));
    }

    #[tokio::test]
    async fn list_models_follows_pagination() {
        let server = MockServer::start_async().await;
        let first_page = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1beta/models").matches(|req| {
                    req.query_params
                        .as_ref()
                        .is_none_or(|params| params.iter().all(|(key, _)| key != "pageToken"))
                });
                then.status(200).json_body(json!({
                    "models": [
                        {
                            "name": "models/demo",
                            "supportedGenerationMethods": ["generateContent"]
                        }
                    ],
                    "nextPageToken": "tok-2"
                }));
            })
            .await;
        let second_page = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1beta/models")
                    .query_param("pageToken", "tok-2");
                then.status(200).json_body(json!({
                    "models": [
                        {
                            "name": "models/embed-only",
                            "supportedGenerationMethods": ["embedContent"]
                        }
                    ]
                }));
            })
            .await;

        let client = test_client(server.base_url());
        let models = client.list_models("secret").await.expect("models");

        first_page.assert_async().await;
        second_page.assert_async().await;
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "models/demo");
        assert_eq!(models[1].name, "models/embed-only");
    }

    #[tokio::test]
    async fn list_models_surfaces_unexpected_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1beta/models");
                then.status(403).body("permission denied");
            })
            .await;

        let client = test_client(server.base_url());
        let result = client.list_models("bad-key").await;

        assert!(matches!(
            result,
            Err(GenAiError::UnexpectedStatus { status, .. }) if status == 403
        ));
    }
}
