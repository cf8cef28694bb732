//! Data models and structures
//!
//! Defines prompt records, provider request inputs and the runtime
//! configuration loaded from the environment.

use crate::{Error, Result};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// One generated wallpaper prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptRecord {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl PromptRecord {
    pub fn new(text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            is_favorite: false,
            created_at: Utc::now(),
        }
    }
}

/// Prompts produced by a single generation call, in provider order.
pub type GenerationBatch = Vec<PromptRecord>;

/// Which input the user is generating from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Category,
    Image,
}

/// Input for the category-based provider.
#[derive(Debug, Clone)]
pub struct CategoryRequest {
    pub category: String,
    pub visual_style: String,
    pub oled: bool,
}

/// Base64-encoded image plus its media type, ready for an inline-data part.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub data: String,
    pub mime_type: String,
}

impl ImageInput {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: crate::ai::mime::detect_image_mime(bytes).to_string(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(Error::Config(format!(
                "Image file is empty: {}",
                path.display()
            )));
        }
        Ok(Self::from_bytes(&bytes))
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let invalid = || Error::Config("Invalid image data URL".to_string());

        let rest = url.strip_prefix("data:").ok_or_else(invalid)?;
        let (meta, payload) = rest.split_once(',').ok_or_else(invalid)?;
        let mime_type = meta.strip_suffix(";base64").ok_or_else(invalid)?;

        if mime_type.is_empty() || payload.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            data: payload.to_string(),
            mime_type: mime_type.to_string(),
        })
    }
}

// Configuration
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-04-17";
pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-flash-1.5";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Overrides the stored Gemini key when set.
    pub gemini_api_key: Option<String>,
    /// Overrides the stored OpenRouter key when set.
    pub openrouter_api_key: Option<String>,
    pub gemini_model: String,
    pub openrouter_model: String,
    pub request_timeout: Duration,
    pub state_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let request_timeout = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                Error::Config(format!("REQUEST_TIMEOUT_SECS is not a number: {}", raw))
            })?),
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let state_path = match std::env::var("WALLPAPER_PROMPTS_STATE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => Self::default_state_path()?,
        };

        Ok(Self {
            gemini_api_key: non_blank_var("GEMINI_API_KEY"),
            openrouter_api_key: non_blank_var("OPENROUTER_API_KEY"),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            openrouter_model: std::env::var("OPENROUTER_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENROUTER_MODEL.to_string()),
            request_timeout,
            state_path,
        })
    }

    fn default_state_path() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("wallpaper-prompts").join("state.json"))
            .ok_or_else(|| {
                Error::Config(
                    "Could not determine a data directory; set WALLPAPER_PROMPTS_STATE"
                        .to_string(),
                )
            })
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
