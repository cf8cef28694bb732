use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
};
use crate::ai::{require_api_key, ImagePromptService};
use crate::models::ImageInput;
use crate::normalize::parse_prompt_list;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

const PROVIDER: &str = "Gemini";

/// Generates wallpaper prompts from an uploaded image.
pub struct GeminiVisionClient {
    http: GeminiHttpClient,
}

impl GeminiVisionClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn build_request(image: &ImageInput) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                    Part::Text {
                        text: prompts::IMAGE_INSTRUCTION.trim().to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: 0.8,
                top_p: 0.95,
            },
        }
    }

    fn provider_failure(detail: impl std::fmt::Display) -> Error {
        Error::AiProvider(format!(
            "Failed to generate prompts. Please check your Gemini API key and network connection. ({})",
            detail
        ))
    }
}

#[async_trait]
impl ImagePromptService for GeminiVisionClient {
    async fn generate_from_image(&self, image: &ImageInput) -> Result<Vec<String>> {
        require_api_key(&self.http.api_key, PROVIDER)?;

        tracing::debug!(
            "Requesting prompts for {} image ({} base64 chars) from Gemini model {}",
            image.mime_type,
            image.data.len(),
            self.http.model()
        );

        let request = Self::build_request(image);
        let response: GenerateContentResponse = self
            .http
            .generate_content(&request)
            .await
            .map_err(|e| match e {
                Error::Http(e) => Self::provider_failure(e),
                Error::AiProvider(detail) => Self::provider_failure(detail),
                other => other,
            })?;

        let text = response
            .text()
            .ok_or_else(|| Self::provider_failure("no text in Gemini response"))?;

        let prompts = parse_prompt_list(&text)?;
        tracing::info!("Gemini returned {} prompts", prompts.len());
        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";

    fn make_client(server: &MockServer, api_key: &str, model: &str) -> GeminiVisionClient {
        GeminiVisionClient::new(
            api_key.to_string(),
            model.to_string(),
            Duration::from_secs(5),
        )
        .with_base_url(server.uri())
    }

    fn sample_image() -> ImageInput {
        ImageInput {
            data: "iVBORw0KGgo=".to_string(),
            mime_type: "image/png".to_string(),
        }
    }

    fn text_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] }
            }]
        }))
    }

    #[tokio::test]
    async fn test_generate_from_image_sends_inline_data_and_config() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/v1beta/models/{}:generateContent", DEFAULT_MODEL)))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } },
                        { "text": prompts::IMAGE_INSTRUCTION.trim() }
                    ]
                }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "temperature": 0.8,
                    "topP": 0.95
                }
            })))
            .respond_with(text_response(r#"["a", "b", "c", "d", "e"]"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let prompts = client.generate_from_image(&sample_image()).await.unwrap();
        assert_eq!(prompts, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_generate_from_image_accepts_fenced_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"/v1beta/models/.+:generateContent"))
            .respond_with(text_response("```json\n[\"misty fjord\"]\n```"))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let prompts = client.generate_from_image(&sample_image()).await.unwrap();
        assert_eq!(prompts, vec!["misty fjord"]);
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(text_response("[]"))
            .expect(0)
            .mount(&server)
            .await;

        let client = make_client(&server, "", DEFAULT_MODEL);
        let err = client.generate_from_image(&sample_image()).await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential(_)));
    }

    #[tokio::test]
    async fn test_api_error_suggests_checking_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"/v1beta/models/.+:generateContent"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = make_client(&server, "bad-key", DEFAULT_MODEL);
        let err = client.generate_from_image(&sample_image()).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
        assert!(err.to_string().contains("check your Gemini API key"));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"/v1beta/models/.+:generateContent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let err = client.generate_from_image(&sample_image()).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_format_error_propagates_unchanged() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"/v1beta/models/.+:generateContent"))
            .respond_with(text_response("[1, 2, 3]"))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let err = client.generate_from_image(&sample_image()).await.unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[tokio::test]
    async fn test_strips_models_prefix_from_model_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-custom:generateContent"))
            .respond_with(text_response(r#"["x"]"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", "models/gemini-custom");
        client.generate_from_image(&sample_image()).await.unwrap();
    }
}
