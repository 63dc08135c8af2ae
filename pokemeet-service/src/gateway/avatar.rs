//! Avatar generation: vision description of the uploaded portrait, then one
//! styled image from the combined prompt.

use dialogue_flow::AvatarArtifact;
use tracing::info;

use super::{GenerationBackend, GenerationError, MAX_UPLOAD_BYTES};
use crate::prompts;

/// Style label reported when no gender hint was supplied.
const NEUTRAL_STYLE: &str = "neutral";

pub async fn generate_avatar(
    backend: &dyn GenerationBackend,
    image_bytes: &[u8],
    mime_type: &str,
    gender_hint: Option<&str>,
) -> Result<AvatarArtifact, GenerationError> {
    if !mime_type.starts_with("image/") {
        return Err(GenerationError::invalid_input(
            "Invalid file type. Please upload an image file.",
        ));
    }
    if image_bytes.len() > MAX_UPLOAD_BYTES {
        return Err(GenerationError::invalid_input(
            "File too large. Please upload an image under 20MB.",
        ));
    }

    let description = backend
        .describe_image(mime_type, image_bytes, prompts::PORTRAIT_DESCRIPTION)
        .await
        .map_err(GenerationError::from_upstream)?
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| GenerationError::server("Failed to analyze the uploaded image"))?;

    info!(
        description_length = description.len(),
        "portrait described, generating avatar"
    );

    let prompt = prompts::avatar_prompt(gender_hint, &description);
    let image_url = backend
        .generate_image(&prompt)
        .await
        .map_err(GenerationError::from_upstream)?
        .ok_or_else(|| GenerationError::server("No image generated"))?;

    Ok(AvatarArtifact {
        image_url,
        style: gender_hint.unwrap_or(NEUTRAL_STYLE).to_string(),
        description,
    })
}
