//! Card generation: extract resume text, then one image request per fixed
//! persona, issued concurrently. All three are attempted even when one
//! fails; any failure fails the whole batch so the user can retry, with the
//! failed persona logged.

use dialogue_flow::CardArtifact;
use tracing::{info, warn};

use super::{GenerationBackend, GenerationError, MAX_UPLOAD_BYTES, extract};
use crate::prompts;

pub async fn generate_cards(
    backend: &dyn GenerationBackend,
    document_bytes: &[u8],
) -> Result<Vec<CardArtifact>, GenerationError> {
    if document_bytes.len() > MAX_UPLOAD_BYTES {
        return Err(GenerationError::invalid_input(
            "File too large. Please upload a resume under 20MB.",
        ));
    }

    let resume_text = extract::extract_document_text(document_bytes).await;
    info!(resume_chars = resume_text.len(), "generating cards");

    let outcomes = tokio::join!(
        generate_card(backend, &resume_text, prompts::CARD_PERSONAS[0], 1),
        generate_card(backend, &resume_text, prompts::CARD_PERSONAS[1], 2),
        generate_card(backend, &resume_text, prompts::CARD_PERSONAS[2], 3),
    );

    let mut cards = Vec::with_capacity(prompts::CARD_PERSONAS.len());
    let mut failure: Option<GenerationError> = None;
    for (persona, outcome) in prompts::CARD_PERSONAS
        .iter()
        .zip([outcomes.0, outcomes.1, outcomes.2])
    {
        match outcome {
            Ok(card) => cards.push(card),
            Err(error) => {
                warn!(persona = %persona, error = %error, "card generation failed");
                failure.get_or_insert(error);
            }
        }
    }
    if let Some(error) = failure {
        return Err(error);
    }
    Ok(cards)
}

async fn generate_card(
    backend: &dyn GenerationBackend,
    resume_text: &str,
    persona: &str,
    id: u32,
) -> Result<CardArtifact, GenerationError> {
    let prompt = prompts::card_prompt(resume_text, persona);
    let image_url = backend
        .generate_image(&prompt)
        .await
        .map_err(GenerationError::from_upstream)?
        .ok_or_else(|| GenerationError::server("No image generated"))?;

    Ok(CardArtifact {
        id,
        persona: persona.to_string(),
        image_url,
        description: format!("A {persona} Pokemon card generated based on your resume"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GenerationErrorKind;
    use crate::gateway::backend::UpstreamError;
    use crate::gateway::backend::mock::MockBackend;

    #[tokio::test]
    async fn issues_one_request_per_persona() {
        let backend = MockBackend::ok("unused", "https://img/card.png");
        let cards = generate_cards(&backend, b"not a pdf").await.unwrap();

        assert_eq!(backend.generate_count(), 3);
        assert_eq!(cards.len(), 3);
        for (index, (card, persona)) in cards.iter().zip(prompts::CARD_PERSONAS).enumerate() {
            assert_eq!(card.id as usize, index + 1);
            assert_eq!(card.persona, persona);
            assert!(card.description.contains(persona));
        }

        let recorded = backend.recorded_prompts();
        for persona in prompts::CARD_PERSONAS {
            assert!(recorded.iter().any(|p| p.contains(persona)));
        }
    }

    #[tokio::test]
    async fn extraction_failure_embeds_placeholder_in_prompts() {
        let backend = MockBackend::ok("unused", "https://img/card.png");
        generate_cards(&backend, b"garbage").await.unwrap();
        for prompt in backend.recorded_prompts() {
            assert!(prompt.contains(extract::EXTRACTION_PLACEHOLDER));
        }
    }

    #[tokio::test]
    async fn persona_association_survives_out_of_order_completion() {
        let mut backend = MockBackend::ok("unused", "https://img/default.png");
        backend.slow_marker = Some("cute".to_string());
        backend.url_by_marker = vec![
            ("cute".to_string(), "https://img/cute.png".to_string()),
            ("aggressive".to_string(), "https://img/aggressive.png".to_string()),
            ("mysterious".to_string(), "https://img/mysterious.png".to_string()),
        ];

        let cards = generate_cards(&backend, b"garbage").await.unwrap();
        assert_eq!(cards[0].image_url, "https://img/cute.png");
        assert_eq!(cards[1].image_url, "https://img/aggressive.png");
        assert_eq!(cards[2].image_url, "https://img/mysterious.png");
    }

    #[tokio::test]
    async fn one_failed_persona_fails_the_batch_after_attempting_all() {
        let mut backend = MockBackend::ok("unused", "https://img/card.png");
        backend.fail_marker = Some((
            "aggressive".to_string(),
            UpstreamError {
                code: Some("rate_limit_exceeded".to_string()),
                message: "slow down".to_string(),
            },
        ));

        let error = generate_cards(&backend, b"garbage").await.unwrap_err();
        assert_eq!(error.kind, GenerationErrorKind::RateLimited);
        assert_eq!(backend.generate_count(), 3);
    }

    #[tokio::test]
    async fn oversized_document_is_rejected_without_network() {
        let backend = MockBackend::ok("unused", "https://img/card.png");
        let over = vec![0u8; MAX_UPLOAD_BYTES + 1];
        let error = generate_cards(&backend, &over).await.unwrap_err();
        assert_eq!(error.kind, GenerationErrorKind::InvalidInput);
        assert!(error.message.contains("20MB"));
        assert_eq!(backend.generate_count(), 0);
    }
}
