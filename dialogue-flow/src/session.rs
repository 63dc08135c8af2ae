use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::step::{self, DialogueStep, fields};

/// Generated trainer avatar reference returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarArtifact {
    pub image_url: String,
    pub style: String,
    pub description: String,
}

/// One generated trading-card reference, tagged with its persona label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardArtifact {
    pub id: u32,
    pub persona: String,
    pub image_url: String,
    pub description: String,
}

/// Asynchronous side-effect currently in flight for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOperation {
    None,
    GeneratingAvatar,
    GeneratingCards,
}

/// Handle issued when a generation starts. Results carrying a ticket that no
/// longer matches the session are discarded, so a stale callback can never
/// corrupt a later step's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTicket {
    pub step_index: usize,
    pub seq: u64,
}

/// The single mutable record of one user's progress through the flow.
///
/// Serializable so the state machine can be unit tested without rendering
/// anything; all mutation goes through the transition functions in
/// [`crate::machine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub current_step_index: usize,
    pub collected_fields: HashMap<String, String>,
    pub input_buffer: String,
    pub avatar: Option<AvatarArtifact>,
    pub cards: Vec<CardArtifact>,
    pub pending: PendingOperation,
    pub last_error: Option<String>,
    pub generation_seq: u64,
    pub completed: bool,
}

impl OnboardingSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: String) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            current_step_index: 0,
            collected_fields: HashMap::new(),
            input_buffer: String::new(),
            avatar: None,
            cards: Vec::new(),
            pending: PendingOperation::None,
            last_error: None,
            generation_seq: 0,
            completed: false,
        }
    }

    /// The catalog entry the session currently sits on. Falls back to the
    /// final entry once the flow has completed.
    pub fn current_step(&self) -> &'static DialogueStep {
        step::step_at(self.current_step_index)
            .unwrap_or_else(|| &step::CATALOG[step::CATALOG.len() - 1])
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.collected_fields.get(name).map(String::as_str)
    }

    pub fn collected_name(&self) -> Option<&str> {
        self.field(fields::NAME)
    }
}

impl Default for OnboardingSession {
    fn default() -> Self {
        Self::new()
    }
}
