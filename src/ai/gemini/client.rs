use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::{Error, Result};
use reqwest::{Client, Response};
use std::time::Duration;

const GOOGLE_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Transport for the Generative Language `generateContent` endpoint.
pub struct GeminiHttpClient {
    client: Client,
    pub(crate) api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Accepts either a bare model ID or the `models/<id>` resource name.
    pub fn new_with_client(api_key: String, model: String, timeout: Duration, client: Client) -> Self {
        let model = match model.strip_prefix("models/") {
            Some(bare) => bare.to_string(),
            None => model,
        };

        Self {
            client,
            api_key,
            model,
            base_url: GOOGLE_AI_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .inspect_err(|e| tracing::error!("Gemini request did not complete: {}", e))?;

        let response = Self::check_status(response).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Undecodable Gemini envelope: {} ({})", e, body);
            Error::AiProvider(format!("unreadable Gemini response: {}", e))
        })
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("Gemini rejected request with {}: {}", status, body);
        Err(Error::AiProvider(format!("Gemini responded with {}", status)))
    }
}
