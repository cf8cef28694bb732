//! Application wiring: configuration, persisted state and provider clients.

use crate::ai::{
    CategoryPromptService, GeminiVisionClient, ImagePromptService, OpenRouterChatClient,
};
use crate::models::{CategoryRequest, Config, ImageInput, PromptRecord};
use crate::session::{GenerationSession, SessionStatus};
use crate::settings::{Provider, Settings, Theme};
use crate::store::{FileStore, KeyValueStore};
use crate::{catalog, Error, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Owns the session and the services it generates through.
pub struct App {
    category: Box<dyn CategoryPromptService>,
    image: Box<dyn ImagePromptService>,
    store: Arc<dyn KeyValueStore>,
    session: GenerationSession,
    settings: Settings,
    /// Present when the provider clients were built from configuration, so
    /// they can be rebuilt after a key change.
    providers: Option<ProviderFactory>,
}

struct ProviderFactory {
    config: Config,
    http_client: reqwest::Client,
}

impl ProviderFactory {
    fn category(&self, api_key: &str) -> Box<dyn CategoryPromptService> {
        Box::new(OpenRouterChatClient::new_with_client(
            api_key.to_string(),
            self.config.openrouter_model.clone(),
            self.config.request_timeout,
            self.http_client.clone(),
        ))
    }

    fn image(&self, api_key: &str) -> Box<dyn ImagePromptService> {
        Box::new(GeminiVisionClient::new_with_client(
            api_key.to_string(),
            self.config.gemini_model.clone(),
            self.config.request_timeout,
            self.http_client.clone(),
        ))
    }
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub category: Box<dyn CategoryPromptService>,
    pub image: Box<dyn ImagePromptService>,
    pub store: Arc<dyn KeyValueStore>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, settings: Settings) -> Self {
        let session = GenerationSession::load(services.store.clone());
        Self {
            category: services.category,
            image: services.image,
            store: services.store,
            session,
            settings,
            providers: None,
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        Ok(Self::from_config(&config))
    }

    pub fn from_config(config: &Config) -> Self {
        info!("Using state file {}", config.state_path.display());
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.state_path.clone()));
        let settings = Settings::load(store.as_ref()).with_env_overrides(config);

        // Reuse one HTTP connection pool across provider clients.
        let providers = ProviderFactory {
            config: config.clone(),
            http_client: reqwest::Client::new(),
        };

        info!(
            "Category provider: OpenRouter (model: {})",
            config.openrouter_model
        );
        info!("Image provider: Gemini (model: {})", config.gemini_model);

        let mut app = Self::with_services(
            AppServices {
                category: providers.category(&settings.open_router_api_key),
                image: providers.image(&settings.gemini_api_key),
                store,
            },
            settings,
        );
        app.providers = Some(providers);
        app
    }

    pub fn session(&self) -> &GenerationSession {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Generate prompts for a category/style selection. Labels matching a
    /// catalog entry are normalized to its spelling.
    pub async fn generate_from_category(
        &mut self,
        category: &str,
        visual_style: &str,
        oled: bool,
    ) -> SessionStatus {
        let request = CategoryRequest {
            category: catalog::canonical(catalog::CATEGORIES, category).to_string(),
            visual_style: catalog::canonical(catalog::VISUAL_STYLES, visual_style).to_string(),
            oled,
        };
        info!(
            "Generating prompts: category={} style={} oled={}",
            request.category, request.visual_style, request.oled
        );
        self.session
            .generate_from_category(self.category.as_ref(), &request)
            .await
    }

    pub async fn generate_from_image(&mut self, image: &ImageInput) -> SessionStatus {
        info!("Generating prompts from {} image", image.mime_type);
        self.session
            .generate_from_image(self.image.as_ref(), image)
            .await
    }

    pub async fn generate_from_image_file(&mut self, path: &Path) -> Result<SessionStatus> {
        let image = ImageInput::from_path(path)?;
        Ok(self.generate_from_image(&image).await)
    }

    fn resolve(&self, id_prefix: &str) -> Result<PromptRecord> {
        self.session
            .find_by_prefix(id_prefix)
            .cloned()
            .ok_or_else(|| Error::Config(format!("No unique prompt matches id '{}'", id_prefix)))
    }

    /// Toggle a prompt's favorite flag by (a unique prefix of) its id.
    pub fn toggle_favorite(&mut self, id_prefix: &str) -> Result<PromptRecord> {
        let record = self.resolve(id_prefix)?;
        let is_favorite = self
            .session
            .toggle_favorite(&record.id)
            .unwrap_or(record.is_favorite);
        Ok(PromptRecord {
            is_favorite,
            ..record
        })
    }

    pub fn edit_prompt(&mut self, id_prefix: &str, text: &str) -> Result<PromptRecord> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Config("Prompt text cannot be empty".to_string()));
        }

        let record = self.resolve(id_prefix)?;
        self.session.edit_text(&record.id, text.to_string());
        Ok(PromptRecord {
            text: text.to_string(),
            ..record
        })
    }

    pub fn find_prompt(&self, id_prefix: &str) -> Result<PromptRecord> {
        self.resolve(id_prefix)
    }

    pub fn set_api_key(&mut self, provider: Provider, key: &str) -> Result<()> {
        self.settings
            .set_api_key(self.store.as_ref(), provider, key)?;
        info!("Updated {:?} API key", provider);

        if let Some(providers) = &self.providers {
            match provider {
                Provider::Gemini => self.image = providers.image(&self.settings.gemini_api_key),
                Provider::OpenRouter => {
                    self.category = providers.category(&self.settings.open_router_api_key)
                }
            }
        }
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.settings.set_theme(self.store.as_ref(), theme)
    }
}

#[cfg(test)]
mod tests {
    use super::{App, AppServices};
    use crate::ai::{MockCategoryPromptClient, MockImagePromptClient};
    use crate::models::ImageInput;
    use crate::session::SessionStatus;
    use crate::settings::{Provider, Settings, Theme};
    use crate::store::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn build_test_app(
        category: MockCategoryPromptClient,
        image: MockImagePromptClient,
        store: MemoryStore,
    ) -> App {
        App::with_services(
            AppServices {
                category: Box::new(category),
                image: Box::new(image),
                store: Arc::new(store),
            },
            Settings::default(),
        )
    }

    #[tokio::test]
    async fn test_generate_normalizes_catalog_labels() {
        let category = MockCategoryPromptClient::new().with_prompts(&["A", "B"]);
        let probe = category.clone();
        let mut app = build_test_app(category, MockImagePromptClient::new(), MemoryStore::new());

        let status = app
            .generate_from_category("space & cosmos", "photorealistic", true)
            .await;

        assert_eq!(status, SessionStatus::Displayed);
        let request = probe.last_request().unwrap();
        assert_eq!(request.category, "Space & Cosmos");
        assert_eq!(request.visual_style, "Photorealistic");
        assert!(request.oled);
    }

    #[tokio::test]
    async fn test_toggle_and_edit_by_id_prefix() {
        let mut app = build_test_app(
            MockCategoryPromptClient::new().with_prompts(&["first", "second"]),
            MockImagePromptClient::new(),
            MemoryStore::new(),
        );
        app.generate_from_category("Abstract", "Anime", false).await;
        let id = app.session().current_batch()[1].id.to_string();

        let toggled = app.toggle_favorite(&id[..8]).unwrap();
        assert!(toggled.is_favorite);

        let edited = app.edit_prompt(&id, "  second, revised ").unwrap();
        assert_eq!(edited.text, "second, revised");
        assert_eq!(app.session().favorites()[0].text, "second, revised");

        assert!(app.edit_prompt(&id, "   ").is_err());
        assert!(app.toggle_favorite("zzzz").is_err());
    }

    #[tokio::test]
    async fn test_image_generation_switches_mode_and_keeps_history() {
        let mut app = build_test_app(
            MockCategoryPromptClient::new().with_prompts(&["cat"]),
            MockImagePromptClient::new().with_prompts(&["img"]),
            MemoryStore::new(),
        );

        app.generate_from_category("Animals", "Anime", false).await;
        let status = app
            .generate_from_image(&ImageInput::from_bytes(&[0x89, 0x50, 0x4E, 0x47]))
            .await;

        assert_eq!(status, SessionStatus::Displayed);
        assert_eq!(app.session().current_batch()[0].text, "img");
        assert_eq!(app.session().history().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_image_file_is_error() {
        let mut app = build_test_app(
            MockCategoryPromptClient::new(),
            MockImagePromptClient::new(),
            MemoryStore::new(),
        );
        let dir = tempfile::tempdir().unwrap();
        let result = app
            .generate_from_image_file(&dir.path().join("missing.png"))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_updates_are_persisted() {
        let store = MemoryStore::new();
        let mut app = build_test_app(
            MockCategoryPromptClient::new(),
            MockImagePromptClient::new(),
            store.clone(),
        );

        app.set_api_key(Provider::Gemini, "g-123").unwrap();
        app.set_theme(Theme::Blue).unwrap();

        assert_eq!(app.settings().gemini_api_key, "g-123");
        assert_eq!(store.get("app_theme").unwrap().as_deref(), Some("\"blue\""));
        assert_eq!(Settings::load(&store).gemini_api_key, "g-123");
    }
}
