//! Persisted user preferences: provider keys and the UI theme.

use crate::models::Config;
use crate::store::{self, KeyValueStore};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const GEMINI_API_KEY: &str = "gemini_api_key";
pub const OPEN_ROUTER_API_KEY: &str = "open_router_api_key";
pub const APP_THEME: &str = "app_theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Yellow,
    Blue,
    Green,
    Pink,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Yellow, Theme::Blue, Theme::Green, Theme::Pink];

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Yellow => "yellow",
            Theme::Blue => "blue",
            Theme::Green => "green",
            Theme::Pink => "pink",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Theme::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::Config(format!(
                    "Unknown theme '{}'. Expected one of: yellow, blue, green, pink",
                    s
                ))
            })
    }
}

/// Which provider key a settings update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenRouter,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub gemini_api_key: String,
    pub open_router_api_key: String,
    pub theme: Theme,
}

impl Settings {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            gemini_api_key: store::load_or(store, GEMINI_API_KEY, String::new()),
            open_router_api_key: store::load_or(store, OPEN_ROUTER_API_KEY, String::new()),
            theme: store::load_or(store, APP_THEME, Theme::default()),
        }
    }

    /// Environment keys take precedence over stored ones.
    pub fn with_env_overrides(mut self, config: &Config) -> Self {
        if let Some(key) = &config.gemini_api_key {
            self.gemini_api_key = key.clone();
        }
        if let Some(key) = &config.openrouter_api_key {
            self.open_router_api_key = key.clone();
        }
        self
    }

    pub fn set_api_key(
        &mut self,
        store: &dyn KeyValueStore,
        provider: Provider,
        key: &str,
    ) -> Result<()> {
        let key = key.trim().to_string();
        let (slot, store_key) = match provider {
            Provider::Gemini => (&mut self.gemini_api_key, GEMINI_API_KEY),
            Provider::OpenRouter => (&mut self.open_router_api_key, OPEN_ROUTER_API_KEY),
        };

        if key.is_empty() {
            store.remove(store_key)?;
        } else {
            store::save(store, store_key, &key)?;
        }
        *slot = key;
        Ok(())
    }

    pub fn set_theme(&mut self, store: &dyn KeyValueStore, theme: Theme) -> Result<()> {
        store::save(store, APP_THEME, &theme)?;
        self.theme = theme;
        Ok(())
    }
}

/// Show only the tail of a key, for status output.
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{}", tail)
}
