//! AI provider integration for wallpaper prompt generation
//!
//! Two capabilities, each behind its own trait: turning an uploaded image into
//! prompts (Gemini) and turning a category/style selection into prompts
//! (OpenRouter chat completions). Both hand raw model text to
//! [`crate::normalize::parse_prompt_list`].

pub mod gemini;
pub mod mime;
pub mod mock;
pub mod openrouter;

pub use gemini::GeminiVisionClient;
pub use mock::{MockCategoryPromptClient, MockImagePromptClient};
pub use openrouter::OpenRouterChatClient;

use crate::models::{CategoryRequest, ImageInput};
use crate::{Error, Result};
use async_trait::async_trait;

#[async_trait]
pub trait ImagePromptService: Send + Sync {
    async fn generate_from_image(&self, image: &ImageInput) -> Result<Vec<String>>;
}

#[async_trait]
pub trait CategoryPromptService: Send + Sync {
    async fn generate_from_category(&self, request: &CategoryRequest) -> Result<Vec<String>>;
}

/// Fail before any network traffic when no key is configured.
pub(crate) fn require_api_key(api_key: &str, provider: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        tracing::warn!("{} API key is not configured", provider);
        return Err(Error::MissingCredential(format!(
            "{} API Key is missing. Please add it in the settings.",
            provider
        )));
    }
    Ok(())
}

/// Collapse transport errors into the provider error users see.
pub(crate) fn transport_to_provider(err: Error, provider: &str) -> Error {
    match err {
        Error::Http(e) => Error::AiProvider(format!(
            "Failed to generate prompts. Please check your {} API key and network connection. ({})",
            provider, e
        )),
        other => other,
    }
}
