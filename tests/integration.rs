use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wallpaper_prompts::{
    ai::{MockCategoryPromptClient, MockImagePromptClient, OpenRouterChatClient},
    app::{App, AppServices},
    models::{ImageInput, Mode, PromptRecord},
    session::{SessionStatus, FAVORITES_KEY, HISTORY_KEY, HISTORY_LIMIT},
    settings::{Settings, Theme},
    store::{FileStore, KeyValueStore, MemoryStore},
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn build_app(
    category: MockCategoryPromptClient,
    image: MockImagePromptClient,
    store: Arc<dyn KeyValueStore>,
) -> App {
    App::with_services(
        AppServices {
            category: Box::new(category),
            image: Box::new(image),
            store,
        },
        Settings::default(),
    )
}

fn texts(records: &[&PromptRecord]) -> Vec<String> {
    records.iter().map(|r| r.text.clone()).collect()
}

#[tokio::test]
async fn test_favorite_and_edit_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let first_id = {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(state_path.clone()));
        let mut app = build_app(
            MockCategoryPromptClient::new().with_prompts(&["A", "B", "C", "D", "E"]),
            MockImagePromptClient::new(),
            store,
        );

        let status = app
            .generate_from_category("Landscapes", "Anime", false)
            .await;
        assert_eq!(status, SessionStatus::Displayed);
        assert_eq!(
            texts(&app.session().current_batch()),
            vec!["A", "B", "C", "D", "E"]
        );

        let id = app.session().current_batch()[0].id.to_string();
        app.toggle_favorite(&id).unwrap();
        app.edit_prompt(&id, "A, golden hour").unwrap();
        id
    };

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(state_path));
    let app = build_app(
        MockCategoryPromptClient::new(),
        MockImagePromptClient::new(),
        store,
    );

    let favorites = app.session().favorites();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id.to_string(), first_id);
    assert_eq!(favorites[0].text, "A, golden hour");
    assert!(favorites[0].is_favorite);

    let history = app.session().history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0][0].text, "A, golden hour");
    assert!(history[0][0].is_favorite);
    assert_eq!(app.session().status(), SessionStatus::Idle);
    assert!(app.session().current_batch().is_empty());
}

#[tokio::test]
async fn test_history_is_capped_newest_first() {
    let store = MemoryStore::new();
    let mut app = build_app(
        MockCategoryPromptClient::new().with_prompts(&["prompt"]),
        MockImagePromptClient::new(),
        Arc::new(store.clone()),
    );

    for _ in 0..HISTORY_LIMIT + 2 {
        app.generate_from_category("Abstract", "Vintage", false)
            .await;
    }

    let newest = app.session().current_batch()[0].id;
    let history = app.session().history();
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history[0][0].id, newest);

    let stored: Vec<Vec<PromptRecord>> =
        serde_json::from_str(&store.get(HISTORY_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored.len(), HISTORY_LIMIT);
}

#[tokio::test]
async fn test_failure_keeps_previous_state() {
    let store = MemoryStore::new();
    let category = MockCategoryPromptClient::new().with_prompts(&["first"]);
    let mut app = build_app(
        category,
        MockImagePromptClient::new().with_format_error("not json"),
        Arc::new(store.clone()),
    );

    app.generate_from_category("Animals", "Anime", false).await;
    let status = app
        .generate_from_image(&ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]))
        .await;

    assert_eq!(status, SessionStatus::Failed);
    assert_eq!(app.session().mode(), Mode::Image);
    assert_eq!(
        app.session().last_error(),
        Some("The AI returned an unexpected format. Please try again.")
    );
    assert!(app.session().current_batch().is_empty());
    assert_eq!(app.session().history().len(), 1);
    assert_eq!(store.get(FAVORITES_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_openrouter_rejection_surfaces_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "bad key"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenRouterChatClient::new(
        "sk-or-wrong".to_string(),
        "google/gemini-flash-1.5".to_string(),
        Duration::from_secs(5),
    )
    .with_base_url(server.uri());

    let mut app = App::with_services(
        AppServices {
            category: Box::new(client),
            image: Box::new(MockImagePromptClient::new()),
            store: Arc::new(MemoryStore::new()),
        },
        Settings::default(),
    );

    let status = app
        .generate_from_category("Cityscapes", "Cyberpunk", true)
        .await;

    assert_eq!(status, SessionStatus::Failed);
    assert_eq!(
        app.session().last_error(),
        Some("OpenRouter API Error: bad key")
    );
    assert!(app.session().history().is_empty());
}

#[tokio::test]
async fn test_missing_openrouter_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = OpenRouterChatClient::new(
        String::new(),
        "google/gemini-flash-1.5".to_string(),
        Duration::from_secs(5),
    )
    .with_base_url(server.uri());

    let mut app = App::with_services(
        AppServices {
            category: Box::new(client),
            image: Box::new(MockImagePromptClient::new()),
            store: Arc::new(MemoryStore::new()),
        },
        Settings::default(),
    );

    let status = app
        .generate_from_category("Landscapes", "Anime", false)
        .await;

    assert_eq!(status, SessionStatus::Failed);
    assert_eq!(
        app.session().last_error(),
        Some("OpenRouter API Key is missing. Please add it in the settings.")
    );
}

#[tokio::test]
async fn test_openrouter_fenced_object_response_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "```json\n{\"prompts\": [\"misty fjord\", \"aurora over ice\"]}\n```"
                }
            }]
        })))
        .mount(&server)
        .await;

    let client = OpenRouterChatClient::new(
        "sk-or-1".to_string(),
        "google/gemini-flash-1.5".to_string(),
        Duration::from_secs(5),
    )
    .with_base_url(server.uri());

    let mut app = App::with_services(
        AppServices {
            category: Box::new(client),
            image: Box::new(MockImagePromptClient::new()),
            store: Arc::new(MemoryStore::new()),
        },
        Settings::default(),
    );

    let status = app
        .generate_from_category("Landscapes", "Photorealistic", false)
        .await;

    assert_eq!(status, SessionStatus::Displayed);
    assert_eq!(
        texts(&app.session().current_batch()),
        vec!["misty fjord", "aurora over ice"]
    );
}

#[tokio::test]
async fn test_corrupt_state_file_recovers_on_next_write() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    std::fs::write(&state_path, "{ not json").unwrap();

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(state_path.clone()));
        let mut app = build_app(
            MockCategoryPromptClient::new().with_prompts(&["dune sea", "salt flats"]),
            MockImagePromptClient::new(),
            store,
        );

        assert!(app.session().favorites().is_empty());
        assert!(app.session().history().is_empty());

        app.generate_from_category("Landscapes", "Anime", false)
            .await;
        let id = app.session().current_batch()[0].id.to_string();
        app.toggle_favorite(&id).unwrap();
        app.set_theme(Theme::Green).unwrap();
    }

    let store = Arc::new(FileStore::new(state_path));
    let reloaded = build_app(
        MockCategoryPromptClient::new(),
        MockImagePromptClient::new(),
        store.clone(),
    );

    assert_eq!(reloaded.session().history().len(), 1);
    assert_eq!(texts(&reloaded.session().favorites()), vec!["dune sea"]);
    assert_eq!(Settings::load(store.as_ref()).theme, Theme::Green);
}
