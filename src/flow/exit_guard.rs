//! Exit guard: confirmation before abandoning an in-progress questionnaire.

use serde_json::json;

use super::session::{Screen, Session};
use super::transition::Effect;
use super::view;

/// Show the guard. Only an abandon attempt while questioning triggers it.
pub(super) fn request(session: &mut Session) -> bool {
    if session.screen != Screen::Questioning {
        return false;
    }
    session.exit_guard_visible = true;
    true
}

/// Keep building: hide the guard, questioning state untouched.
pub(super) fn cancel(session: &mut Session) {
    session.exit_guard_visible = false;
}

/// Exit anyway: the only path that discards the partial record.
pub(super) fn confirm(session: &mut Session, effects: &mut Vec<Effect>) {
    if !session.exit_guard_visible {
        return;
    }
    let answered = session.partial.len();
    view::force_reset(session);
    effects.push(Effect::log("quiz_abandoned", json!({ "answered": answered })));
}
