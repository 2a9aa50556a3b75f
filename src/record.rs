//! Blueprint record: the answer set collected by the questionnaire.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The named fields of a blueprint, in questioning order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Name,
    Category,
    Audience,
    CoreAction,
    Outcome,
    Displaces,
    Form,
    Differentiator,
}

impl RecordField {
    /// Every field, in canonical order.
    pub const ALL: [RecordField; 8] = [
        Self::Name,
        Self::Category,
        Self::Audience,
        Self::CoreAction,
        Self::Outcome,
        Self::Displaces,
        Self::Form,
        Self::Differentiator,
    ];

    /// Human-readable label used in the textual summary.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Category => "Category",
            Self::Audience => "Audience",
            Self::CoreAction => "Core action",
            Self::Outcome => "Outcome",
            Self::Displaces => "Displaces",
            Self::Form => "Form",
            Self::Differentiator => "Differentiator",
        }
    }
}

impl std::fmt::Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Audience => "audience",
            Self::CoreAction => "core_action",
            Self::Outcome => "outcome",
            Self::Displaces => "displaces",
            Self::Form => "form",
            Self::Differentiator => "differentiator",
        };
        write!(f, "{s}")
    }
}

/// In-progress answers. Any subset of fields may be present, in any order.
///
/// Values are stored trimmed; an empty value is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRecord {
    values: BTreeMap<RecordField, String>,
}

impl PartialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value for a field, if answered.
    pub fn get(&self, field: RecordField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Store a trimmed answer. Returns false (and stores nothing) when the
    /// trimmed value is empty.
    pub fn set(&mut self, field: RecordField, value: &str) -> bool {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.values.insert(field, trimmed.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Promote to a complete [`Record`] once every field is answered.
    pub fn complete(&self) -> Option<Record> {
        Some(Record {
            name: self.get(RecordField::Name)?.to_string(),
            category: self.get(RecordField::Category)?.to_string(),
            audience: self.get(RecordField::Audience)?.to_string(),
            core_action: self.get(RecordField::CoreAction)?.to_string(),
            outcome: self.get(RecordField::Outcome)?.to_string(),
            displaces: self.get(RecordField::Displaces)?.to_string(),
            form: self.get(RecordField::Form)?.to_string(),
            differentiator: self.get(RecordField::Differentiator)?.to_string(),
        })
    }
}

/// A completed blueprint. Every field holds a non-empty trimmed string.
///
/// Only obtainable through [`PartialRecord::complete`], which enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    name: String,
    category: String,
    audience: String,
    core_action: String,
    outcome: String,
    displaces: String,
    form: String,
    differentiator: String,
}

impl Record {
    pub fn get(&self, field: RecordField) -> &str {
        match field {
            RecordField::Name => &self.name,
            RecordField::Category => &self.category,
            RecordField::Audience => &self.audience,
            RecordField::CoreAction => &self.core_action,
            RecordField::Outcome => &self.outcome,
            RecordField::Displaces => &self.displaces,
            RecordField::Form => &self.form,
            RecordField::Differentiator => &self.differentiator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Render the record as the markdown summary shown on the result screen.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("# {}", self.name)];
        for field in RecordField::ALL.iter().skip(1) {
            parts.push(format!("- **{}:** {}", field.label(), self.get(*field)));
        }
        parts.join("\n")
    }
}

/// Opaque reference to a rendered artifact (URL, data URI, object key...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(pub String);

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
