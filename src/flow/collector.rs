//! Answer collector: linear question navigation over the partial record.

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::record::Record;

use super::session::Session;

/// What a collector operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum CollectorOutcome {
    /// Rejected input or out-of-range move. Session untouched.
    Unchanged,
    /// The question pointer moved to `index`.
    Moved { index: usize },
    /// The last question was confirmed and every field is answered.
    Completed(Record),
}

/// Replace the working value for the current question.
pub(super) fn set_buffer(session: &mut Session, text: String) {
    session.buffer = text;
}

/// Store the buffer into the current field and move forward.
pub(super) fn confirm(session: &mut Session, catalog: &Catalog) -> CollectorOutcome {
    let Some(question) = catalog.question(session.question_index) else {
        return CollectorOutcome::Unchanged;
    };
    if !session.partial.set(question.field, &session.buffer) {
        debug!(question = session.question_index, "Rejected blank answer");
        return CollectorOutcome::Unchanged;
    }

    if session.question_index == catalog.last_question() {
        // Buffer now mirrors the stored (trimmed) value.
        load_buffer(session, catalog);
        return match session.partial.complete() {
            Some(record) => CollectorOutcome::Completed(record),
            None => {
                warn!(
                    answered = session.partial.len(),
                    "Last question confirmed with unanswered fields"
                );
                CollectorOutcome::Unchanged
            }
        };
    }

    session.question_index += 1;
    load_buffer(session, catalog);
    CollectorOutcome::Moved {
        index: session.question_index,
    }
}

/// Move to the previous question, reloading its stored answer.
pub(super) fn back(session: &mut Session, catalog: &Catalog) -> CollectorOutcome {
    if session.question_index == 0 {
        return CollectorOutcome::Unchanged;
    }
    session.question_index -= 1;
    load_buffer(session, catalog);
    CollectorOutcome::Moved {
        index: session.question_index,
    }
}

/// Load the buffer from the current field's stored value, or empty.
pub(super) fn load_buffer(session: &mut Session, catalog: &Catalog) {
    session.buffer = catalog
        .question(session.question_index)
        .and_then(|q| session.partial.get(q.field))
        .unwrap_or_default()
        .to_string();
}
