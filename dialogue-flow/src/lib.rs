pub mod error;
pub mod machine;
pub mod runner;
pub mod session;
pub mod step;
pub mod storage;
pub mod view;

// Re-export commonly used types
pub use error::{FlowError, Result};
pub use machine::{Applied, apply_avatar_result, apply_cards_result, auto_advance, can_proceed, capture_file, proceed, set_input};
pub use runner::{DISPLAY_DELAY, ExecutionResult, ExecutionStatus, FlowRunner};
pub use session::{
    AvatarArtifact, CardArtifact, OnboardingSession, OperationTicket, PendingOperation,
};
pub use step::{CATALOG, DialogueStep, InputKind, StepId, display_text, fields, step_at};
pub use storage::{InMemorySessionStorage, SessionStorage};
pub use view::StepView;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_serializes_and_roundtrips() {
        let mut session = OnboardingSession::new();
        machine::proceed(&mut session).unwrap();
        machine::proceed(&mut session).unwrap();
        machine::set_input(&mut session, "Ash");
        machine::proceed(&mut session).unwrap();

        let json = serde_json::to_string(&session).unwrap();
        let restored: OnboardingSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.current_step_index, session.current_step_index);
        assert_eq!(restored.collected_name(), Some("Ash"));
        assert_eq!(restored.pending, PendingOperation::None);
    }

    #[tokio::test]
    async fn full_flow_reaches_completion() {
        let storage = std::sync::Arc::new(InMemorySessionStorage::new());
        let runner = FlowRunner::new(storage);

        let id = runner.start().await.unwrap().session_id;
        runner.execute(&id, None).await.unwrap(); // welcome
        runner.execute(&id, None).await.unwrap(); // intro
        runner.execute(&id, Some("Ash".into())).await.unwrap(); // name

        let (ticket, _) = runner.capture_file(&id, "me.png").await.unwrap();
        runner
            .apply_avatar_result(
                &id,
                ticket,
                Ok(AvatarArtifact {
                    image_url: "https://img/1.png".into(),
                    style: "female".into(),
                    description: "desc".into(),
                }),
            )
            .await
            .unwrap();
        runner.execute(&id, None).await.unwrap(); // photo
        runner.execute(&id, None).await.unwrap(); // avatar_complete

        let (ticket, _) = runner.capture_file(&id, "resume.pdf").await.unwrap();
        runner
            .apply_cards_result(
                &id,
                ticket,
                Ok(vec![CardArtifact {
                    id: 1,
                    persona: "cute and friendly".into(),
                    image_url: "https://img/c1.png".into(),
                    description: "d1".into(),
                }]),
            )
            .await
            .unwrap();
        runner.execute(&id, None).await.unwrap(); // resume
        runner.execute(&id, None).await.unwrap(); // cards_complete
        runner.execute(&id, Some("ash_ketchum".into())).await.unwrap(); // instagram

        let finished = runner.execute(&id, None).await.unwrap(); // complete
        assert_eq!(finished.status, ExecutionStatus::Completed);
        assert!(finished.view.completed);
    }
}
