//! Prompt text sent to the hosted vision and image-generation models.

/// Instructions for the vision model describing the uploaded portrait.
pub const PORTRAIT_DESCRIPTION: &str = "Please provide a detailed description of this person's facial features, hair, and overall appearance. Focus on physical characteristics that would help an artist recreate their likeness in an anime Pokemon trainer style. Include details about hair color, hair style, eye color, facial structure, skin tone, and any distinctive features. Be specific but concise.";

const TRAINER_BASE_STYLE: &str = "
Style requirements:
- Studio Ghibli-inspired anime art style with soft, warm colors and gentle shading
- High-quality professional character design
- Clean, vibrant colors typical of Pokemon anime
- Full body character illustration
- Simple background (outdoor Pokemon world setting)
- Friendly, approachable appearance perfect for a dating app profile
- Authentic Pokemon trainer aesthetic with proper gear and accessories
- Expressive face with warm, inviting smile

The character should embody the spirit of Pokemon adventure while being appealing and authentic for meeting other trainers in a dating context.";

const TRAINER_FEMALE: &str = "Create a female Pokemon trainer character inspired by the classic female trainer design from the Pokemon games: a young woman with long brown hair, wearing a sleeveless red top, denim shorts, red and white sneakers, and a yellow backpack. She should have large expressive anime eyes, a friendly confident smile, and be in an adventurous pose. Include pokeballs either in her hands or attached to her belt.";

const TRAINER_MALE: &str = "Create a male Pokemon trainer character inspired by the classic male trainer design from the Pokemon games: a young man with dark hair, wearing a blue and white jacket, dark pants, sneakers, and carrying a backpack. He should have anime-style features, an energetic and determined expression, and be in an action-ready pose. Include pokeballs visible on his belt or in his hands.";

const TRAINER_UNSPECIFIED: &str = "Create a Pokemon trainer character with anime-style features, wearing typical trainer gear like a colorful jacket or vest, comfortable pants or shorts, sneakers, and a backpack. The character should have an adventurous, friendly expression and include pokeballs as accessories. Choose an appealing gender presentation suitable for a dating app.";

/// Styling prompt for the trainer avatar. The template is picked by
/// case-insensitive exact match on the hint; anything unrecognized (or no
/// hint at all) falls back to the unspecified template.
pub fn trainer_prompt(gender_hint: Option<&str>) -> String {
    let template = match gender_hint.map(str::to_lowercase).as_deref() {
        Some("female") => TRAINER_FEMALE,
        Some("male") => TRAINER_MALE,
        _ => TRAINER_UNSPECIFIED,
    };
    format!("{template}{TRAINER_BASE_STYLE}")
}

/// Full prompt for the avatar image: styling template plus the extracted
/// portrait description.
pub fn avatar_prompt(gender_hint: Option<&str>, description: &str) -> String {
    format!(
        "{}\n\nCharacter appearance based on this person: {}\n\nImportant: Incorporate the described facial features, hair, and physical characteristics into the Pokemon trainer character while maintaining the anime art style and trainer aesthetic.",
        trainer_prompt(gender_hint),
        description
    )
}

/// Persona themes for the three generated cards, in display order.
pub const CARD_PERSONAS: [&str; 3] = [
    "cute and friendly",
    "aggressive and powerful",
    "mysterious and wise",
];

/// Prompt for one trading-card image, embedding the extracted resume text
/// and the persona label.
pub fn card_prompt(resume_text: &str, persona: &str) -> String {
    format!(
        "Generate a {persona} style Pokemon card image based on this resume. The card should represent one aspect of the person the resume belongs to, much like choosing a starter Pokemon.

Resume content: {resume_text}

The card should include:
- A fictional Pokemon illustration
- A Pokemon name related to the person's skills and experience
- Abilities text based on the resume content
- Professional yet playful design matching the {persona} theme"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_hint_match_is_case_insensitive() {
        assert_eq!(trainer_prompt(Some("Female")), trainer_prompt(Some("female")));
        assert_eq!(trainer_prompt(Some("MALE")), trainer_prompt(Some("male")));
        assert!(trainer_prompt(Some("Female")).starts_with("Create a female Pokemon trainer"));
    }

    #[test]
    fn unknown_hint_falls_back_to_unspecified() {
        assert_eq!(trainer_prompt(Some("robot")), trainer_prompt(None));
        assert!(trainer_prompt(None).contains("Choose an appealing gender presentation"));
    }

    #[test]
    fn avatar_prompt_embeds_description() {
        let prompt = avatar_prompt(Some("male"), "short black hair");
        assert!(prompt.starts_with(&trainer_prompt(Some("male"))));
        assert!(prompt.contains("short black hair"));
    }

    #[test]
    fn card_prompt_embeds_resume_and_persona() {
        let prompt = card_prompt("ten years of herding Miltank", CARD_PERSONAS[2]);
        assert!(prompt.contains("ten years of herding Miltank"));
        assert!(prompt.contains("mysterious and wise"));
    }
}
