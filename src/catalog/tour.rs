//! Guided tour beats.

use serde::{Deserialize, Serialize};

use crate::flow::Screen;

/// Which screen a beat belongs to.
///
/// Questioning beats always carry the question they are anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum BeatTarget {
    Intro,
    Questioning { question: usize },
    Result,
}

impl BeatTarget {
    pub fn screen(&self) -> Screen {
        match self {
            Self::Intro => Screen::Intro,
            Self::Questioning { .. } => Screen::Questioning,
            Self::Result => Screen::Result,
        }
    }

    /// Anchored question index for questioning beats.
    pub fn anchored_question(&self) -> Option<usize> {
        match self {
            Self::Questioning { question } => Some(*question),
            _ => None,
        }
    }
}

/// Where the overlay card should sit. Presentation hint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Center,
    BottomRight,
    TopLeft,
    #[default]
    TopRight,
    InputNear,
}

/// One step of the guided tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourBeat {
    pub id: String,
    pub target: BeatTarget,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub placement: Placement,
}

impl TourBeat {
    fn new(id: &str, target: BeatTarget, title: &str, body: &str, placement: Placement) -> Self {
        Self {
            id: id.to_string(),
            target,
            title: title.to_string(),
            body: body.to_string(),
            placement,
        }
    }
}

/// The built-in tour: three intro beats, one per question, one result beat.
pub fn default_beats() -> Vec<TourBeat> {
    use BeatTarget::*;
    use Placement::*;

    let q = |question| Questioning { question };
    vec![
        TourBeat::new(
            "intro-welcome",
            Intro,
            "Welcome, Architect.",
            "I'll help you condense your vision into a structural blueprint.",
            TopRight,
        ),
        TourBeat::new(
            "intro-gallery",
            Intro,
            "Visual Archetypes",
            "The gallery showcases the range of constructs we can render.",
            Center,
        ),
        TourBeat::new(
            "intro-how",
            Intro,
            "Crystallization",
            "We will extract 8 core vectors from your idea. They define why it matters and how it works.",
            TopRight,
        ),
        TourBeat::new(
            "step-name",
            q(0),
            "The Blueprint Begins",
            "Give your vision a name. This anchors your idea in reality.",
            TopRight,
        ),
        TourBeat::new(
            "step-type",
            q(1),
            "The Category",
            "Is it a tool, service, or experience? Defining the 'what' focuses the render.",
            TopRight,
        ),
        TourBeat::new(
            "step-audience",
            q(2),
            "Target Resonance",
            "Who is this for? Specificity improves precision.",
            TopRight,
        ),
        TourBeat::new(
            "step-action",
            q(3),
            "The Power Verb",
            "What is the single most important action this performs?",
            TopRight,
        ),
        TourBeat::new(
            "step-outcome",
            q(4),
            "The Emotional Shift",
            "How does the user feel after using it?",
            TopRight,
        ),
        TourBeat::new(
            "step-competition",
            q(5),
            "The Displacement",
            "What does this replace? Current habits clarify your unique value.",
            TopRight,
        ),
        TourBeat::new(
            "step-form",
            q(6),
            "The Final Frame",
            "Physical? Digital? Hardware? This determines the structural output.",
            TopRight,
        ),
        TourBeat::new(
            "step-reason",
            q(7),
            "The Unfair Advantage",
            "Why is this better than anything else? Make your differentiator undeniable.",
            TopRight,
        ),
        TourBeat::new(
            "result-congrats",
            Result,
            "Blueprint Crystallized!",
            "Your vision is now a structural blueprint.",
            TopRight,
        ),
    ]
}
