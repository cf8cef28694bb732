//! Generation session state
//!
//! Owns the currently displayed batch, the favorites list and the bounded
//! history, plus the loading/error lifecycle of one generation at a time.
//!
//! Records live once in a map keyed by id; the current batch, favorites and
//! every history batch are ordered id lists into it. A favorite toggle or a
//! text edit therefore shows up everywhere the prompt appears without any
//! fan-out. Persistence still writes the materialized shape (arrays of
//! records) so stored state stays readable on its own.

use crate::ai::{CategoryPromptService, ImagePromptService};
use crate::models::{CategoryRequest, GenerationBatch, ImageInput, Mode, PromptRecord};
use crate::store::{self, KeyValueStore};
use crate::Result;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const FAVORITES_KEY: &str = "app_favorites";
pub const HISTORY_KEY: &str = "app_history";
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Generating,
    Displayed,
    Failed,
}

/// Identifies one generation attempt. Only the most recently issued ticket
/// may complete or fail the session; older ones are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket(u64);

pub struct GenerationSession {
    store: Arc<dyn KeyValueStore>,
    records: HashMap<Uuid, PromptRecord>,
    current: Vec<Uuid>,
    favorites: Vec<Uuid>,
    history: VecDeque<Vec<Uuid>>,
    mode: Mode,
    status: SessionStatus,
    last_error: Option<String>,
    latest_ticket: u64,
}

impl GenerationSession {
    /// Restore favorites and history from `store`. Unreadable values fall back
    /// to empty collections.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let stored_history: Vec<GenerationBatch> =
            store::load_or(store.as_ref(), HISTORY_KEY, Vec::new());
        let stored_favorites: Vec<PromptRecord> =
            store::load_or(store.as_ref(), FAVORITES_KEY, Vec::new());

        let mut session = Self {
            store,
            records: HashMap::new(),
            current: Vec::new(),
            favorites: Vec::new(),
            history: VecDeque::new(),
            mode: Mode::default(),
            status: SessionStatus::Idle,
            last_error: None,
            latest_ticket: 0,
        };

        for batch in stored_history.into_iter().take(HISTORY_LIMIT) {
            let ids = batch.into_iter().map(|r| session.intern(r)).collect();
            session.history.push_back(ids);
        }

        for record in stored_favorites {
            let id = session.intern(record);
            if !session.favorites.contains(&id) {
                session.favorites.push(id);
            }
        }

        // Favorites membership is the source of truth for the flag.
        let favorite_ids: HashSet<Uuid> = session.favorites.iter().copied().collect();
        for (id, record) in session.records.iter_mut() {
            record.is_favorite = favorite_ids.contains(id);
        }

        info!(
            "Loaded session with {} favorites and {} history batches",
            session.favorites.len(),
            session.history.len()
        );
        session
    }

    fn intern(&mut self, record: PromptRecord) -> Uuid {
        let id = record.id;
        self.records.entry(id).or_insert(record);
        id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Generating
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn find(&self, id: &Uuid) -> Option<&PromptRecord> {
        self.records.get(id)
    }

    /// Look a record up by a unique, case-insensitive id prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<&PromptRecord> {
        let prefix = prefix.trim().to_ascii_lowercase();
        if prefix.is_empty() {
            return None;
        }

        let mut matches = self
            .records
            .values()
            .filter(|r| r.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(record), None) => Some(record),
            _ => None,
        }
    }

    pub fn current_batch(&self) -> Vec<&PromptRecord> {
        self.resolve(&self.current)
    }

    pub fn favorites(&self) -> Vec<&PromptRecord> {
        self.resolve(&self.favorites)
    }

    /// Most recent batch first.
    pub fn history(&self) -> Vec<Vec<&PromptRecord>> {
        self.history.iter().map(|ids| self.resolve(ids)).collect()
    }

    fn resolve(&self, ids: &[Uuid]) -> Vec<&PromptRecord> {
        ids.iter().filter_map(|id| self.records.get(id)).collect()
    }

    fn materialize(&self, ids: &[Uuid]) -> GenerationBatch {
        self.resolve(ids).into_iter().cloned().collect()
    }

    /// Begin a generation: show the loading state and drop the previous
    /// batch and error.
    pub fn start_generation(&mut self) -> GenerationTicket {
        self.latest_ticket += 1;
        self.status = SessionStatus::Generating;
        self.current.clear();
        self.last_error = None;
        debug!("Started generation #{}", self.latest_ticket);
        GenerationTicket(self.latest_ticket)
    }

    /// Apply a provider result. Returns `false` if a newer generation (or a
    /// clear) superseded this ticket.
    pub fn complete_generation(&mut self, ticket: GenerationTicket, prompts: Vec<String>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }

        let ids: Vec<Uuid> = prompts
            .into_iter()
            .map(|text| self.intern(PromptRecord::new(text)))
            .collect();

        info!("Generation #{} produced {} prompts", ticket.0, ids.len());

        self.current = ids.clone();
        self.history.push_front(ids);
        self.history.truncate(HISTORY_LIMIT);
        self.status = SessionStatus::Displayed;
        self.last_error = None;

        self.prune();
        self.persist_history();
        true
    }

    /// Record a failed attempt. Returns `false` for superseded tickets.
    pub fn fail_generation(&mut self, ticket: GenerationTicket, message: String) -> bool {
        if !self.accepts(ticket) {
            return false;
        }

        warn!("Generation #{} failed: {}", ticket.0, message);
        self.current.clear();
        self.last_error = Some(message);
        self.status = SessionStatus::Failed;
        true
    }

    fn accepts(&self, ticket: GenerationTicket) -> bool {
        if ticket.0 != self.latest_ticket || self.status != SessionStatus::Generating {
            debug!(
                "Discarding result of superseded generation #{} (latest #{})",
                ticket.0, self.latest_ticket
            );
            return false;
        }
        true
    }

    /// Return to the empty state and invalidate any in-flight generation.
    pub fn clear(&mut self) {
        self.latest_ticket += 1;
        self.current.clear();
        self.last_error = None;
        self.status = SessionStatus::Idle;
    }

    pub fn change_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!("Switching mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            self.clear();
        }
    }

    /// Flip the favorite flag. Returns the new flag, or `None` for an unknown id.
    pub fn toggle_favorite(&mut self, id: &Uuid) -> Option<bool> {
        let record = self.records.get_mut(id)?;
        record.is_favorite = !record.is_favorite;
        let is_favorite = record.is_favorite;

        if is_favorite {
            if !self.favorites.contains(id) {
                self.favorites.push(*id);
            }
        } else {
            self.favorites.retain(|f| f != id);
        }

        self.prune();
        self.persist_favorites();
        self.persist_history();
        Some(is_favorite)
    }

    /// Replace a prompt's text everywhere it appears. Returns `false` for an
    /// unknown id.
    pub fn edit_text(&mut self, id: &Uuid, text: String) -> bool {
        let Some(record) = self.records.get_mut(id) else {
            return false;
        };
        record.text = text;

        self.persist_favorites();
        self.persist_history();
        true
    }

    /// Drop records nothing refers to any more.
    fn prune(&mut self) {
        let live: HashSet<Uuid> = self
            .current
            .iter()
            .chain(self.favorites.iter())
            .chain(self.history.iter().flatten())
            .copied()
            .collect();
        self.records.retain(|id, _| live.contains(id));
    }

    fn persist_favorites(&self) {
        let favorites = self.materialize(&self.favorites);
        if let Err(e) = store::save(self.store.as_ref(), FAVORITES_KEY, &favorites) {
            error!("Failed to persist favorites: {}", e);
        }
    }

    fn persist_history(&self) {
        let history: Vec<GenerationBatch> =
            self.history.iter().map(|ids| self.materialize(ids)).collect();
        if let Err(e) = store::save(self.store.as_ref(), HISTORY_KEY, &history) {
            error!("Failed to persist history: {}", e);
        }
    }

    fn finish(&mut self, ticket: GenerationTicket, outcome: Result<Vec<String>>) {
        match outcome {
            Ok(prompts) => {
                self.complete_generation(ticket, prompts);
            }
            Err(e) => {
                self.fail_generation(ticket, e.to_string());
            }
        }
    }

    /// Run one category generation end to end.
    pub async fn generate_from_category(
        &mut self,
        service: &dyn CategoryPromptService,
        request: &CategoryRequest,
    ) -> SessionStatus {
        self.change_mode(Mode::Category);
        let ticket = self.start_generation();
        let outcome = service.generate_from_category(request).await;
        self.finish(ticket, outcome);
        self.status
    }

    /// Run one image generation end to end.
    pub async fn generate_from_image(
        &mut self,
        service: &dyn ImagePromptService,
        image: &ImageInput,
    ) -> SessionStatus {
        self.change_mode(Mode::Image);
        let ticket = self.start_generation();
        let outcome = service.generate_from_image(image).await;
        self.finish(ticket, outcome);
        self.status
    }
}
