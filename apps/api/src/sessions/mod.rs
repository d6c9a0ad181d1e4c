//! Per-user workspace state.
//!
//! One `Workspace` per editing session: the template and description being
//! edited, the selected tone and word budget, the current generated ad, and
//! the active refinement session if any. State changes go through named
//! methods — handlers never poke fields ad hoc.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::generation::tone::Tone;
use crate::presets::PresetLibrary;
use crate::refine::session::RefinementSession;

#[derive(Debug, Clone)]
pub struct Workspace {
    pub id: Uuid,
    pub template: String,
    pub description: String,
    pub tone: Tone,
    pub max_words: u32,
    pub generated_ad: String,
    pub generation_done: bool,
    pub refinement: Option<RefinementSession>,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    /// New workspace seeded with the default presets.
    pub fn new(presets: &PresetLibrary) -> Self {
        Self {
            id: Uuid::new_v4(),
            template: presets.default_template().to_string(),
            description: presets.default_description().to_string(),
            tone: Tone::default(),
            max_words: 0,
            generated_ad: String::new(),
            generation_done: false,
            refinement: None,
            created_at: Utc::now(),
        }
    }

    /// Installs a freshly generated ad. Any active refinement session is
    /// torn down — its priming turn referred to the ad being replaced.
    pub fn apply_generation(&mut self, ad: String) {
        self.generated_ad = ad;
        self.generation_done = true;
        self.refinement = None;
    }

    /// Returns the active refinement session, priming one from the current
    /// ad if none exists.
    pub fn refinement_session(&mut self) -> &mut RefinementSession {
        self.refinement
            .get_or_insert_with(|| RefinementSession::primed(&self.generated_ad))
    }

    /// Installs the sanitized reply as the new ad without touching the
    /// refinement transcript.
    pub fn apply_refined_ad(&mut self, ad: String) {
        self.generated_ad = ad;
    }
}

/// In-process workspace store. All shared read-only data (presets, config)
/// lives elsewhere; this map is the only mutable shared state.
pub type WorkspaceStore = Arc<RwLock<HashMap<Uuid, Workspace>>>;

pub fn new_store() -> WorkspaceStore {
    Arc::new(RwLock::new(HashMap::new()))
}
