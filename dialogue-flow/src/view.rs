//! Presentation projection: a serializable snapshot of everything a client
//! needs to render the current step. Contains no business logic; proceed
//! enablement is a direct read of [`machine::can_proceed`].

use serde::{Deserialize, Serialize};

use crate::machine;
use crate::session::{AvatarArtifact, CardArtifact, OnboardingSession, PendingOperation};
use crate::step::{self, InputKind, StepId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepView {
    pub step_id: StepId,
    pub text: String,
    pub input: Option<InputKind>,
    pub placeholder: Option<String>,
    pub can_proceed: bool,
    pub pending: PendingOperation,
    pub last_error: Option<String>,
    /// Populated only once the reveal threshold is reached, so artifacts are
    /// not shown before their step.
    pub avatar: Option<AvatarArtifact>,
    pub cards: Vec<CardArtifact>,
    pub completed: bool,
}

impl StepView {
    pub fn project(session: &OnboardingSession) -> Self {
        let current = session.current_step();
        let avatar = if session.current_step_index >= step::AVATAR_REVEAL_INDEX {
            session.avatar.clone()
        } else {
            None
        };
        let cards = if session.current_step_index >= step::CARDS_REVEAL_INDEX {
            session.cards.clone()
        } else {
            Vec::new()
        };

        Self {
            step_id: current.id,
            text: step::display_text(current.id, session.collected_name()),
            input: current.input,
            placeholder: current.placeholder.map(str::to_string),
            can_proceed: machine::can_proceed(session),
            pending: session.pending,
            last_error: session.last_error.clone(),
            avatar,
            cards,
            completed: session.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{apply_avatar_result, capture_file, proceed, set_input};

    #[test]
    fn avatar_hidden_until_reveal_step() {
        let mut session = OnboardingSession::new();
        proceed(&mut session).unwrap(); // welcome
        proceed(&mut session).unwrap(); // intro
        set_input(&mut session, "Ash");
        proceed(&mut session).unwrap(); // name -> photo

        let ticket = capture_file(&mut session, "me.png").unwrap();
        apply_avatar_result(
            &mut session,
            ticket,
            Ok(AvatarArtifact {
                image_url: "https://img/1.png".into(),
                style: "neutral".into(),
                description: "desc".into(),
            }),
        );

        // still on the photo step: artifact exists but is not revealed yet
        assert!(session.avatar.is_some());
        assert!(StepView::project(&session).avatar.is_none());

        proceed(&mut session).unwrap(); // photo -> avatar_complete
        let view = StepView::project(&session);
        assert_eq!(
            view.avatar.map(|a| a.image_url),
            Some("https://img/1.png".to_string())
        );
    }

    #[test]
    fn view_personalizes_text_with_collected_name() {
        let mut session = OnboardingSession::new();
        proceed(&mut session).unwrap();
        proceed(&mut session).unwrap();
        set_input(&mut session, "Ash");
        proceed(&mut session).unwrap();

        let view = StepView::project(&session);
        assert_eq!(view.step_id, StepId::Photo);
        assert!(view.text.contains("Ash"));
        assert_eq!(view.input, Some(InputKind::File));
    }

    #[test]
    fn pending_state_disables_proceed_in_view() {
        let mut session = OnboardingSession::new();
        proceed(&mut session).unwrap();
        proceed(&mut session).unwrap();
        set_input(&mut session, "Ash");
        proceed(&mut session).unwrap();
        capture_file(&mut session, "me.png").unwrap();

        let view = StepView::project(&session);
        assert_eq!(view.pending, PendingOperation::GeneratingAvatar);
        assert!(!view.can_proceed);
    }
}
