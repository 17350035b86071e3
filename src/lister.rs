//! Implementation behind the `list-models` helper binary.
//!
//! Kept in the library so the credential guard and output format can be
//! exercised against a mock service.

use crate::genai::GenAiClient;
use std::io::Write;

/// Print models that support content generation, one per line.
///
/// With no credential the routine prints the not-found message and returns
/// without touching the network. Remote failures become a single error line
/// rather than a process failure.
pub async fn run_listing(
    api_key: Option<&str>,
    base_url: &str,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let Some(api_key) = api_key.map(str::trim).filter(|key| !key.is_empty()) else {
        writeln!(out, "API key not found")?;
        return Ok(());
    };

    writeln!(out, "Listing available models...")?;
    let client = match GenAiClient::new(base_url) {
        Ok(client) => client,
        Err(err) => return writeln!(out, "Error listing models: {err}"),
    };

    match client.list_models(api_key).await {
        Ok(models) => {
            let mut found = false;
            for model in models.iter().filter(|model| model.supports_generation()) {
                writeln!(out, "- {}", model.name)?;
                found = true;
            }
            if !found {
                writeln!(out, "No models found with generateContent support.")?;
            }
        }
        Err(err) => writeln!(out, "Error listing models: {err}")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    async fn run_to_string(api_key: Option<&str>, base_url: &str) -> String {
        let mut out = Vec::new();
        run_listing(api_key, base_url, &mut out)
            .await
            .expect("listing run");
        String::from_utf8(out).expect("utf8 output")
    }

    #[tokio::test]
    async fn missing_credential_prints_message_without_remote_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1beta/models");
                then.status(200).json_body(json!({ "models": [] }));
            })
            .await;

        let output = run_to_string(None, &server.base_url()).await;

        assert_eq!(output, "API key not found\n");
        assert_eq!(mock.hits_async().await, 0);

        let output = run_to_string(Some("   "), &server.base_url()).await;
        assert_eq!(output, "API key not found\n");
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn prints_only_generation_capable_models() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1beta/models");
                then.status(200).json_body(json!({
                    "models": [
                        {
                            "name": "models/demo-pro",
                            "supportedGenerationMethods": ["generateContent", "countTokens"]
                        },
                        {
                            "name": "models/embed-only",
                            "supportedGenerationMethods": ["embedContent"]
                        }
                    ]
                }));
            })
            .await;

        let output = run_to_string(Some("secret"), &server.base_url()).await;

        assert_eq!(
            output,
            "Listing available models...\n- models/demo-pro\n"
        );
    }

    #[tokio::test]
    async fn reports_when_no_model_supports_generation() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1beta/models");
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

        let output = run_to_string(Some("secret"), &server.base_url()).await;

        assert_eq!(
            output,
            "Listing available models...\nNo models found with generateContent support.\n"
        );
    }

    #[tokio::test]
    async fn remote_failure_becomes_error_line() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1beta/models");
                then.status(500).body("boom");
            })
            .await;

        let output = run_to_string(Some("secret"), &server.base_url()).await;

        assert!(output.starts_with("Listing available models...\nError listing models:"));
    }
}
