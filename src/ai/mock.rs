use super::{CategoryPromptService, ImagePromptService};
use crate::models::{CategoryRequest, ImageInput};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Canned outcome for one mock call.
#[derive(Debug, Clone)]
enum MockOutcome {
    Prompts(Vec<String>),
    MissingCredential(String),
    Provider(String),
    Format(String),
}

impl MockOutcome {
    fn into_result(self) -> Result<Vec<String>> {
        match self {
            MockOutcome::Prompts(prompts) => Ok(prompts),
            MockOutcome::MissingCredential(msg) => Err(Error::MissingCredential(msg)),
            MockOutcome::Provider(msg) => Err(Error::AiProvider(msg)),
            MockOutcome::Format(msg) => Err(Error::Format(msg)),
        }
    }
}

/// Shared queue of outcomes, cycled in order, with a call counter.
#[derive(Debug, Clone, Default)]
struct MockScript {
    outcomes: Arc<Mutex<Vec<MockOutcome>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockScript {
    fn push(&self, outcome: MockOutcome) {
        self.outcomes.lock().unwrap().push(outcome);
    }

    fn next(&self, default: impl FnOnce() -> Vec<String>) -> Result<Vec<String>> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            Ok(default())
        } else {
            let index = (*count - 1) % outcomes.len();
            outcomes[index].clone().into_result()
        }
    }

    fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

fn to_strings(prompts: &[&str]) -> Vec<String> {
    prompts.iter().map(|p| p.to_string()).collect()
}

#[derive(Clone, Default)]
pub struct MockCategoryPromptClient {
    script: MockScript,
    last_request: Arc<Mutex<Option<CategoryRequest>>>,
}

impl MockCategoryPromptClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompts(self, prompts: &[&str]) -> Self {
        self.script.push(MockOutcome::Prompts(to_strings(prompts)));
        self
    }

    pub fn with_missing_credential(self, message: &str) -> Self {
        self.script
            .push(MockOutcome::MissingCredential(message.to_string()));
        self
    }

    pub fn with_provider_error(self, message: &str) -> Self {
        self.script.push(MockOutcome::Provider(message.to_string()));
        self
    }

    pub fn with_format_error(self, detail: &str) -> Self {
        self.script.push(MockOutcome::Format(detail.to_string()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.script.calls()
    }

    pub fn last_request(&self) -> Option<CategoryRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CategoryPromptService for MockCategoryPromptClient {
    async fn generate_from_category(&self, request: &CategoryRequest) -> Result<Vec<String>> {
        *self.last_request.lock().unwrap() = Some(request.clone());

        self.script.next(|| {
            (1..=5)
                .map(|i| {
                    format!(
                        "{} wallpaper in {} style #{}",
                        request.category, request.visual_style, i
                    )
                })
                .collect()
        })
    }
}

#[derive(Clone, Default)]
pub struct MockImagePromptClient {
    script: MockScript,
}

impl MockImagePromptClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompts(self, prompts: &[&str]) -> Self {
        self.script.push(MockOutcome::Prompts(to_strings(prompts)));
        self
    }

    pub fn with_provider_error(self, message: &str) -> Self {
        self.script.push(MockOutcome::Provider(message.to_string()));
        self
    }

    pub fn with_format_error(self, detail: &str) -> Self {
        self.script.push(MockOutcome::Format(detail.to_string()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl ImagePromptService for MockImagePromptClient {
    async fn generate_from_image(&self, image: &ImageInput) -> Result<Vec<String>> {
        self.script.next(|| {
            (1..=5)
                .map(|i| format!("Scene inspired by a {} upload #{}", image.mime_type, i))
                .collect()
        })
    }
}
