//! FlowRunner – convenience wrapper that loads a session, applies exactly
//! one transition, and persists the updated session back to storage.
//!
//! Interactive services run one transition per HTTP request; the runner
//! makes the load → apply → save roundtrip a one-liner and owns the one
//! piece of deferred work in the flow: after a successful generation the
//! step auto-advances once a fixed display delay has elapsed, so the user
//! sees the artifact before the script moves on. The deferred advance is a
//! task keyed by the generation ticket, never a blind timer – if the user
//! navigated away or re-uploaded in the meantime, the advance is dropped.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error};

use crate::error::{FlowError, Result};
use crate::machine::{self, Applied};
use crate::session::{AvatarArtifact, CardArtifact, OnboardingSession, OperationTicket, PendingOperation};
use crate::storage::SessionStorage;
use crate::view::StepView;

/// How long a freshly generated artifact stays on screen before the flow
/// advances on its own.
pub const DISPLAY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionStatus {
    /// Waiting for the next user action
    WaitingForInput,
    /// The flow reached the completion state
    Completed,
}

/// Result of one applied transition
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub session_id: String,
    pub view: StepView,
    pub status: ExecutionStatus,
}

impl ExecutionResult {
    fn from_session(session: &OnboardingSession) -> Self {
        Self {
            session_id: session.id.clone(),
            view: StepView::project(session),
            status: if session.completed {
                ExecutionStatus::Completed
            } else {
                ExecutionStatus::WaitingForInput
            },
        }
    }
}

#[derive(Clone)]
pub struct FlowRunner {
    storage: Arc<dyn SessionStorage>,
    advance_delay: Duration,
}

impl FlowRunner {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            advance_delay: DISPLAY_DELAY,
        }
    }

    /// Override the post-generation display delay (tests use a short one).
    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    pub fn storage(&self) -> Arc<dyn SessionStorage> {
        self.storage.clone()
    }

    /// Create a fresh session positioned on the first catalog step.
    pub async fn start(&self) -> Result<ExecutionResult> {
        let session = OnboardingSession::new();
        let result = ExecutionResult::from_session(&session);
        self.storage.save(session).await?;
        Ok(result)
    }

    /// Apply one user action: optionally replace the input buffer, then
    /// proceed to the next step.
    pub async fn execute(
        &self,
        session_id: &str,
        content: Option<String>,
    ) -> Result<ExecutionResult> {
        let mut session = self.load(session_id).await?;
        if let Some(content) = content {
            machine::set_input(&mut session, content);
        }
        machine::proceed(&mut session)?;
        let result = ExecutionResult::from_session(&session);
        self.storage.save(session).await?;
        Ok(result)
    }

    /// Record a file selection on the current step and open the matching
    /// generation operation. Returns the ticket for the eventual result and
    /// the kind of operation the caller must perform.
    pub async fn capture_file(
        &self,
        session_id: &str,
        file_name: &str,
    ) -> Result<(OperationTicket, PendingOperation)> {
        let mut session = self.load(session_id).await?;
        let ticket = machine::capture_file(&mut session, file_name)?;
        let pending = session.pending;
        self.storage.save(session).await?;
        Ok((ticket, pending))
    }

    /// Feed the avatar gateway result back into the session. On success the
    /// guarded auto-advance is scheduled.
    pub async fn apply_avatar_result(
        &self,
        session_id: &str,
        ticket: OperationTicket,
        result: std::result::Result<AvatarArtifact, String>,
    ) -> Result<ExecutionResult> {
        let succeeded = result.is_ok();
        let mut session = self.load(session_id).await?;
        let applied = machine::apply_avatar_result(&mut session, ticket, result);
        let execution = ExecutionResult::from_session(&session);
        self.storage.save(session).await?;
        if applied == Applied::Accepted && succeeded {
            self.schedule_auto_advance(session_id.to_string(), ticket);
        }
        Ok(execution)
    }

    /// Feed the card gateway result back into the session. On success the
    /// guarded auto-advance is scheduled.
    pub async fn apply_cards_result(
        &self,
        session_id: &str,
        ticket: OperationTicket,
        result: std::result::Result<Vec<CardArtifact>, String>,
    ) -> Result<ExecutionResult> {
        let succeeded = result.is_ok();
        let mut session = self.load(session_id).await?;
        let applied = machine::apply_cards_result(&mut session, ticket, result);
        let execution = ExecutionResult::from_session(&session);
        self.storage.save(session).await?;
        if applied == Applied::Accepted && succeeded {
            self.schedule_auto_advance(session_id.to_string(), ticket);
        }
        Ok(execution)
    }

    /// Current projection of a session without applying a transition.
    pub async fn view(&self, session_id: &str) -> Result<ExecutionResult> {
        let session = self.load(session_id).await?;
        Ok(ExecutionResult::from_session(&session))
    }

    async fn load(&self, session_id: &str) -> Result<OnboardingSession> {
        self.storage
            .get(session_id)
            .await?
            .ok_or_else(|| FlowError::SessionNotFound(session_id.to_string()))
    }

    fn schedule_auto_advance(&self, session_id: String, ticket: OperationTicket) {
        let storage = self.storage.clone();
        let delay = self.advance_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let session = match storage.get(&session_id).await {
                Ok(Some(session)) => session,
                Ok(None) => return,
                Err(e) => {
                    error!(session_id = %session_id, error = %e, "auto-advance load failed");
                    return;
                }
            };
            let mut session = session;
            if machine::auto_advance(&mut session, ticket) {
                if let Err(e) = storage.save(session).await {
                    error!(session_id = %session_id, error = %e, "auto-advance save failed");
                }
            } else {
                debug!(session_id = %session_id, ?ticket, "auto-advance skipped");
            }
        });
    }
}
