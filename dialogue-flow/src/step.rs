use serde::{Deserialize, Serialize};

/// Identifier of one node in the fixed onboarding script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Welcome,
    Intro,
    Name,
    Photo,
    AvatarComplete,
    Resume,
    CardsComplete,
    Instagram,
    Complete,
}

/// Kind of input widget a step requires, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Phone,
    File,
}

/// Field names under which collected values are stored on the session.
pub mod fields {
    pub const NAME: &str = "name";
    pub const PROFILE_PHOTO: &str = "profile_photo";
    pub const RESUME: &str = "resume";
    pub const INSTAGRAM: &str = "instagram";
}

/// One entry of the onboarding script. The catalog is fixed at build time
/// and read-only process-wide.
#[derive(Debug, Clone)]
pub struct DialogueStep {
    pub id: StepId,
    pub text: &'static str,
    pub input: Option<InputKind>,
    pub field: Option<&'static str>,
    pub placeholder: Option<&'static str>,
}

pub const CATALOG: &[DialogueStep] = &[
    DialogueStep {
        id: StepId::Welcome,
        text: "Hi there! Welcome to the Pokemon Center! We're so excited to help you meet amazing Pokemon trainers who share your love for adventure and friendship!",
        input: None,
        field: None,
        placeholder: None,
    },
    DialogueStep {
        id: StepId::Intro,
        text: "Let's get to know you a little better so we can help you connect with the perfect trainer friends!",
        input: None,
        field: None,
        placeholder: None,
    },
    DialogueStep {
        id: StepId::Name,
        text: "What should we call you, fellow Pokemon trainer?",
        input: Some(InputKind::Text),
        field: Some(fields::NAME),
        placeholder: Some("Enter your name..."),
    },
    DialogueStep {
        id: StepId::Photo,
        text: "Time to transform into a Pokemon trainer! Upload your photo and we'll create your personalized Ghibli-style trainer avatar!",
        input: Some(InputKind::File),
        field: Some(fields::PROFILE_PHOTO),
        placeholder: None,
    },
    DialogueStep {
        id: StepId::AvatarComplete,
        text: "Looking fantastic! Your Pokemon trainer transformation is complete. Now let's create your Pokemon team!",
        input: None,
        field: None,
        placeholder: None,
    },
    DialogueStep {
        id: StepId::Resume,
        text: "Upload your resume and we'll generate unique Pokemon cards based on your skills and experience!",
        input: Some(InputKind::File),
        field: Some(fields::RESUME),
        placeholder: None,
    },
    DialogueStep {
        id: StepId::CardsComplete,
        text: "Amazing! Your Pokemon team is ready. Now let's get your Instagram so other trainers can connect with you!",
        input: None,
        field: None,
        placeholder: None,
    },
    DialogueStep {
        id: StepId::Instagram,
        text: "Last step! What's your Instagram username? This is how you'll connect with your new trainer friends!",
        input: Some(InputKind::Text),
        field: Some(fields::INSTAGRAM),
        placeholder: Some("Enter your Instagram username..."),
    },
    DialogueStep {
        id: StepId::Complete,
        text: "Amazing! Your trainer profile is all set up. Time to start meeting other trainers!",
        input: None,
        field: None,
        placeholder: None,
    },
];

/// Step index from which the generated avatar becomes visible.
pub const AVATAR_REVEAL_INDEX: usize = 4;
/// Step index from which the generated cards become visible.
pub const CARDS_REVEAL_INDEX: usize = 6;

pub fn step_at(index: usize) -> Option<&'static DialogueStep> {
    CATALOG.get(index)
}

/// Display text for a step, personalized with the collected name where the
/// script has a personalized variant. Total over all step identifiers: steps
/// without a variant (and any step when no name is collected) fall through
/// to the static catalog text.
pub fn display_text(id: StepId, name: Option<&str>) -> String {
    let name = match name {
        Some(n) if !n.trim().is_empty() => n,
        _ => {
            return static_text(id).to_string();
        }
    };

    match id {
        StepId::Photo => format!(
            "Nice to meet you, {name}! Time to transform into a Pokemon trainer! Upload your photo and we'll create your personalized Ghibli-style trainer avatar!"
        ),
        StepId::AvatarComplete => format!(
            "Looking fantastic, {name}! Your Pokemon trainer transformation is complete. Now let's create your Pokemon team!"
        ),
        StepId::Resume => format!(
            "Now {name}, upload your resume and we'll generate unique Pokemon cards based on your skills and experience!"
        ),
        StepId::CardsComplete => format!(
            "Amazing, {name}! Your Pokemon team is ready. Now let's get your Instagram so other trainers can connect with you!"
        ),
        StepId::Instagram => format!(
            "Almost done, {name}! What's your Instagram username? This is how you'll connect with your new trainer friends!"
        ),
        StepId::Complete => format!(
            "Amazing, {name}! Your trainer profile is all set up. Time to start meeting other trainers!"
        ),
        _ => static_text(id).to_string(),
    }
}

fn static_text(id: StepId) -> &'static str {
    CATALOG
        .iter()
        .find(|step| step.id == id)
        .map(|step| step.text)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_IDS: [StepId; 9] = [
        StepId::Welcome,
        StepId::Intro,
        StepId::Name,
        StepId::Photo,
        StepId::AvatarComplete,
        StepId::Resume,
        StepId::CardsComplete,
        StepId::Instagram,
        StepId::Complete,
    ];

    #[test]
    fn catalog_is_ordered_and_complete() {
        assert_eq!(CATALOG.len(), ALL_IDS.len());
        for (step, id) in CATALOG.iter().zip(ALL_IDS) {
            assert_eq!(step.id, id);
        }
        // every input step names a target field
        for step in CATALOG {
            if step.input.is_some() {
                assert!(step.field.is_some(), "input step {:?} has no field", step.id);
            }
        }
    }

    #[test]
    fn display_text_is_total() {
        for id in ALL_IDS {
            let without = display_text(id, None);
            let with = display_text(id, Some("Ash"));
            assert!(!without.is_empty());
            assert!(!with.is_empty());
        }
    }

    #[test]
    fn personalized_steps_mention_the_name() {
        for id in [
            StepId::Photo,
            StepId::AvatarComplete,
            StepId::Resume,
            StepId::CardsComplete,
            StepId::Instagram,
            StepId::Complete,
        ] {
            assert!(display_text(id, Some("Ash")).contains("Ash"));
        }
    }

    #[test]
    fn unpersonalized_steps_keep_static_text() {
        for id in [StepId::Welcome, StepId::Intro, StepId::Name] {
            assert_eq!(display_text(id, Some("Ash")), display_text(id, None));
        }
    }

    #[test]
    fn blank_name_counts_as_no_name() {
        assert_eq!(display_text(StepId::Photo, Some("   ")), display_text(StepId::Photo, None));
    }
}
