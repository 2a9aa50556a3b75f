//! Question definitions for the blueprint questionnaire.

use serde::{Deserialize, Serialize};

use crate::record::RecordField;

/// One question of the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDef {
    /// Position in the sequence, contiguous from 0.
    pub index: usize,
    /// The record field this question fills.
    pub field: RecordField,
    pub title: String,
    pub prompt: String,
    pub placeholder: String,
    pub helper: String,
}

impl QuestionDef {
    fn new(
        index: usize,
        field: RecordField,
        title: &str,
        prompt: &str,
        placeholder: &str,
        helper: &str,
    ) -> Self {
        Self {
            index,
            field,
            title: title.to_string(),
            prompt: prompt.to_string(),
            placeholder: placeholder.to_string(),
            helper: helper.to_string(),
        }
    }
}

/// The built-in eight-question catalog.
pub fn default_questions() -> Vec<QuestionDef> {
    use RecordField::*;
    vec![
        QuestionDef::new(0, Name, "The Object", "What is your idea?", "e.g., DreamCatcher", "Name it."),
        QuestionDef::new(
            1,
            Category,
            "The Type",
            "What type of thing will it be?",
            "e.g., tool, game, system, service",
            "Is it an app? A device?",
        ),
        QuestionDef::new(
            2,
            Audience,
            "Target Users",
            "Who is this for?",
            "e.g., exhausted parents, indie developers",
            "Who will use it?",
        ),
        QuestionDef::new(
            3,
            CoreAction,
            "The Core Action",
            "What will it do?",
            "e.g., automate grocery lists",
            "The main verb.",
        ),
        QuestionDef::new(
            4,
            Outcome,
            "The Outcome",
            "What feeling does using it bring?",
            "e.g., stress-free, fun",
            "The result they get.",
        ),
        QuestionDef::new(
            5,
            Displaces,
            "Future Competition",
            "What is it similar to that is already out?",
            "e.g., sticky notes, hiring an assistant",
            "What does it replace?",
        ),
        QuestionDef::new(
            6,
            Form,
            "The Frame",
            "What will it be once it's done?",
            "e.g., mobile app, browser extension",
            "Delivery mechanism.",
        ),
        QuestionDef::new(
            7,
            Differentiator,
            "Reason Why",
            "Why is it better than what we have?",
            "e.g., it uses AI to predict needs",
            "The differentiator.",
        ),
    ]
}
