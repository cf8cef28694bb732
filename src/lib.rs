//! Wallpaper prompt generator.
//!
//! Asks an LLM provider for short image-generation prompts, either from a
//! category/visual-style selection (OpenRouter) or from an uploaded image
//! (Gemini), and keeps favorites, edits and a bounded generation history in a
//! persisted key-value store.

pub mod ai;
pub mod app;
pub mod catalog;
pub mod error;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod session;
pub mod settings;
pub mod store;

pub use error::{Error, Result};
