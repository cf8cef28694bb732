use super::client::OpenRouterHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage, ResponseFormat};
use crate::ai::{require_api_key, transport_to_provider, CategoryPromptService};
use crate::models::CategoryRequest;
use crate::normalize::parse_prompt_list;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

const PROVIDER: &str = "OpenRouter";

/// Generates wallpaper prompts from a category and visual style selection.
pub struct OpenRouterChatClient {
    http: OpenRouterHttpClient,
    model: String,
}

impl OpenRouterChatClient {
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
            http: OpenRouterHttpClient::new_with_client(api_key, timeout, client),
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn build_request(&self, request: &CategoryRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(prompts::category_system(request.oled)),
                ChatMessage::user(prompts::category_user(request)),
            ],
            response_format: ResponseFormat::json_object(),
            temperature: 0.9,
            top_p: 1.0,
        }
    }
}

#[async_trait]
impl CategoryPromptService for OpenRouterChatClient {
    async fn generate_from_category(&self, request: &CategoryRequest) -> Result<Vec<String>> {
        require_api_key(&self.http.api_key, PROVIDER)?;

        tracing::debug!(
            "Requesting prompts for category={:?} style={:?} oled={} from {}",
            request.category,
            request.visual_style,
            request.oled,
            self.model
        );

        let response = self
            .http
            .chat_completion(&self.build_request(request))
            .await
            .map_err(|e| transport_to_provider(e, PROVIDER))?;

        let choice = response.choices.first();
        let content = choice
            .and_then(|choice| choice.message.content.as_deref())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                tracing::debug!(
                    "Empty OpenRouter completion (finish_reason: {:?})",
                    choice.and_then(|c| c.finish_reason.as_deref())
                );
                Error::AiProvider("Received an empty response from OpenRouter.".to_string())
            })?;

        let prompts = parse_prompt_list(content)?;
        tracing::info!("OpenRouter returned {} prompts", prompts.len());
        Ok(prompts)
    }
}
