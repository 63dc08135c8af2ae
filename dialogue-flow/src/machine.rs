//! Pure transition functions over [`OnboardingSession`].
//!
//! Each user action maps to one function here; nothing in this module does
//! I/O, so the whole flow can be exercised synchronously in tests. The
//! asynchronous parts (gateway calls, the post-generation display delay)
//! live in [`crate::runner`] and feed their results back in through
//! [`apply_avatar_result`] / [`apply_cards_result`] with the ticket they
//! were issued.

use tracing::debug;

use crate::error::{FlowError, Result};
use crate::session::{
    AvatarArtifact, CardArtifact, OnboardingSession, OperationTicket, PendingOperation,
};
use crate::step::{CATALOG, InputKind, fields};

/// Whether the proceed action is enabled for the session's current step.
///
/// True when the step has no required input, when a text/phone step has a
/// non-blank input buffer, or when a file step has captured a file and no
/// generation is pending for it.
pub fn can_proceed(session: &OnboardingSession) -> bool {
    if session.completed {
        return false;
    }
    let step = session.current_step();
    match step.input {
        None => true,
        Some(InputKind::Text) | Some(InputKind::Phone) => {
            !session.input_buffer.trim().is_empty()
        }
        Some(InputKind::File) => {
            let captured = step
                .field
                .map(|field| session.collected_fields.contains_key(field))
                .unwrap_or(false);
            captured && session.pending == PendingOperation::None
        }
    }
}

/// Replace the uncommitted input buffer.
pub fn set_input(session: &mut OnboardingSession, text: impl Into<String>) {
    session.input_buffer = text.into();
}

/// Advance to the next step, committing the current step's text input if it
/// has one. The final catalog entry transitions to the completion state
/// instead of advancing.
pub fn proceed(session: &mut OnboardingSession) -> Result<()> {
    if session.pending != PendingOperation::None {
        return Err(FlowError::OperationPending(session.id.clone()));
    }
    if !can_proceed(session) {
        return Err(FlowError::InputRequired(format!(
            "{:?}",
            session.current_step().id
        )));
    }

    let step = session.current_step();
    if let (Some(InputKind::Text) | Some(InputKind::Phone), Some(field)) = (step.input, step.field)
    {
        let value = session.input_buffer.trim().to_string();
        session.collected_fields.insert(field.to_string(), value);
        session.input_buffer.clear();
    }

    advance(session);
    Ok(())
}

/// Record a selected file on the current (file-input) step and open a
/// generation operation for its target field. Returns the ticket that must
/// accompany the eventual result.
pub fn capture_file(session: &mut OnboardingSession, file_name: &str) -> Result<OperationTicket> {
    if session.pending != PendingOperation::None {
        return Err(FlowError::OperationPending(session.id.clone()));
    }
    let step = session.current_step();
    if step.input != Some(InputKind::File) {
        return Err(FlowError::UnexpectedUpload(format!("{:?}", step.id)));
    }
    let field = step
        .field
        .ok_or_else(|| FlowError::UnexpectedUpload(format!("{:?}", step.id)))?;

    session
        .collected_fields
        .insert(field.to_string(), file_name.to_string());
    session.pending = match field {
        fields::PROFILE_PHOTO => PendingOperation::GeneratingAvatar,
        fields::RESUME => PendingOperation::GeneratingCards,
        _ => return Err(FlowError::UnexpectedUpload(format!("{:?}", step.id))),
    };
    session.last_error = None;
    session.generation_seq += 1;

    Ok(OperationTicket {
        step_index: session.current_step_index,
        seq: session.generation_seq,
    })
}

/// Outcome of feeding a generation result back into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accepted,
    /// The session moved on (new ticket or different step); the result was
    /// dropped without touching state.
    Stale,
}

/// Apply the avatar gateway result issued under `ticket`.
pub fn apply_avatar_result(
    session: &mut OnboardingSession,
    ticket: OperationTicket,
    result: std::result::Result<AvatarArtifact, String>,
) -> Applied {
    if !ticket_is_current(session, ticket, PendingOperation::GeneratingAvatar) {
        debug!(session_id = %session.id, ?ticket, "discarding stale avatar result");
        return Applied::Stale;
    }
    session.pending = PendingOperation::None;
    match result {
        Ok(artifact) => {
            session.avatar = Some(artifact);
            session.last_error = None;
        }
        Err(message) => session.last_error = Some(message),
    }
    Applied::Accepted
}

/// Apply the card gateway result issued under `ticket`.
pub fn apply_cards_result(
    session: &mut OnboardingSession,
    ticket: OperationTicket,
    result: std::result::Result<Vec<CardArtifact>, String>,
) -> Applied {
    if !ticket_is_current(session, ticket, PendingOperation::GeneratingCards) {
        debug!(session_id = %session.id, ?ticket, "discarding stale cards result");
        return Applied::Stale;
    }
    session.pending = PendingOperation::None;
    match result {
        Ok(cards) => {
            session.cards = cards;
            session.last_error = None;
        }
        Err(message) => session.last_error = Some(message),
    }
    Applied::Accepted
}

/// Advance one step after a successful generation, unless the user already
/// navigated away or a newer generation superseded the ticket.
pub fn auto_advance(session: &mut OnboardingSession, ticket: OperationTicket) -> bool {
    if session.completed
        || session.current_step_index != ticket.step_index
        || session.generation_seq != ticket.seq
        || session.pending != PendingOperation::None
    {
        return false;
    }
    let has_artifact = match session.current_step().field {
        Some(fields::PROFILE_PHOTO) => session.avatar.is_some(),
        Some(fields::RESUME) => !session.cards.is_empty(),
        _ => false,
    };
    if !has_artifact {
        return false;
    }
    advance(session);
    true
}

fn ticket_is_current(
    session: &OnboardingSession,
    ticket: OperationTicket,
    expected: PendingOperation,
) -> bool {
    session.pending == expected
        && session.generation_seq == ticket.seq
        && session.current_step_index == ticket.step_index
}

fn advance(session: &mut OnboardingSession) {
    if session.current_step_index + 1 < CATALOG.len() {
        session.current_step_index += 1;
    } else {
        session.completed = true;
    }
}
