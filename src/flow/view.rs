//! Screen-level transitions owned by the view controller.

use serde_json::json;
use tracing::{debug, info};

use crate::catalog::{BeatTarget, Catalog};
use crate::config::CompletionPolicy;
use crate::record::Record;

use super::collector;
use super::exit_guard;
use super::session::{ArtifactState, ResultState, Screen, Session};
use super::transition::Effect;

/// Enter questioning from intro, resuming at the preserved question.
pub(super) fn start(session: &mut Session, catalog: &Catalog, effects: &mut Vec<Effect>) {
    if session.screen != Screen::Intro {
        debug!(screen = %session.screen, "start() outside intro ignored");
        return;
    }
    session.screen = Screen::Questioning;
    collector::load_buffer(session, catalog);

    let on_intro_beat = catalog
        .beat(session.tour_position)
        .is_some_and(|b| b.target == BeatTarget::Intro);
    if session.tour_active && on_intro_beat {
        if let Some(position) = catalog
            .beat_for_question(session.question_index)
            .or(catalog.first_questioning_beat())
        {
            session.tour_position = position;
        }
    }

    effects.push(Effect::log(
        "quiz_started",
        json!({ "resume_at": session.question_index }),
    ));
}

/// Move to the result screen with a freshly completed record.
pub(super) fn complete_questioning(
    session: &mut Session,
    record: Record,
    catalog: &Catalog,
    policy: CompletionPolicy,
    effects: &mut Vec<Effect>,
) {
    if session.screen != Screen::Questioning {
        debug!(screen = %session.screen, "complete_questioning() outside questioning ignored");
        return;
    }
    info!(name = record.name(), "Questionnaire completed");
    effects.push(Effect::log(
        "quiz_completed",
        json!({ "idea_name": record.name(), "idea_type": record.category() }),
    ));

    session.render_ticket += 1;
    let ticket = session.render_ticket;
    session.screen = Screen::Result;
    session.result = Some(ResultState {
        record: record.clone(),
        artifact: ArtifactState::Pending,
        ticket,
    });
    effects.push(Effect::RequestRender { ticket, record });

    if session.tour_active {
        match (policy, catalog.first_result_beat()) {
            (CompletionPolicy::AdvanceToResultBeat, Some(position)) => {
                session.tour_position = position;
            }
            _ => session.tour_active = false,
        }
    }
}

/// Reset request. While questioning this only raises the exit guard.
pub(super) fn reset(session: &mut Session, effects: &mut Vec<Effect>) {
    if exit_guard::request(session) {
        return;
    }
    effects.push(Effect::log(
        "app_reset",
        json!({ "previous_view": session.screen.to_string() }),
    ));
    *session = Session::reset_from(session);
}

/// Reset without consulting the exit guard.
pub(super) fn force_reset(session: &mut Session) {
    *session = Session::reset_from(session);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PartialRecord, RecordField};

    fn full_record() -> Record {
        let mut partial = PartialRecord::new();
        for field in RecordField::ALL {
            partial.set(field, "x");
        }
        partial.complete().unwrap()
    }

    #[test]
    fn start_outside_intro_is_ignored() {
        let catalog = Catalog::default();
        let mut session = Session::new(false);
        session.screen = Screen::Result;
        let before = session.clone();
        let mut effects = Vec::new();
        start(&mut session, &catalog, &mut effects);
        assert_eq!(session, before);
        assert!(effects.is_empty());
    }

    #[test]
    fn start_moves_tour_off_intro_beats() {
        let catalog = Catalog::default();
        let mut session = Session::new(false);
        session.tour_active = true;
        session.tour_position = 1;
        start(&mut session, &catalog, &mut Vec::new());
        assert_eq!(session.screen(), Screen::Questioning);
        assert_eq!(session.tour_position(), 3);
    }

    #[test]
    fn start_resumes_at_preserved_question() {
        let catalog = Catalog::default();
        let mut session = Session::new(false);
        session.question_index = 6;
        session.partial.set(RecordField::Form, "mobile app");
        session.tour_active = true;
        start(&mut session, &catalog, &mut Vec::new());
        assert_eq!(session.question_index(), 6);
        assert_eq!(session.buffer(), "mobile app");
        assert_eq!(session.tour_position(), 9);
    }

    #[test]
    fn completion_advances_tour_to_result_beat() {
        let catalog = Catalog::default();
        let mut session = Session::new(false);
        session.screen = Screen::Questioning;
        session.tour_active = true;
        session.tour_position = 10;
        let mut effects = Vec::new();
        complete_questioning(
            &mut session,
            full_record(),
            &catalog,
            CompletionPolicy::AdvanceToResultBeat,
            &mut effects,
        );
        assert_eq!(session.screen(), Screen::Result);
        assert_eq!(session.tour_position(), 11);
        assert!(session.tour_active());
        assert_eq!(session.result().unwrap().artifact, ArtifactState::Pending);
        assert!(effects.iter().any(|e| matches!(e, Effect::RequestRender { ticket: 1, .. })));
    }

    #[test]
    fn completion_can_deactivate_tour() {
        let catalog = Catalog::default();
        let mut session = Session::new(false);
        session.screen = Screen::Questioning;
        session.tour_active = true;
        complete_questioning(
            &mut session,
            full_record(),
            &catalog,
            CompletionPolicy::Deactivate,
            &mut Vec::new(),
        );
        assert!(!session.tour_active());
        assert!(!session.tour_completed());
    }

    #[test]
    fn reset_from_result_clears_session() {
        let mut session = Session::new(true);
        session.screen = Screen::Result;
        session.question_index = 7;
        session.partial.set(RecordField::Name, "x");
        let mut effects = Vec::new();
        reset(&mut session, &mut effects);
        assert_eq!(session.screen(), Screen::Intro);
        assert!(session.partial_record().is_empty());
        assert!(session.tour_completed());
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn reset_while_questioning_raises_guard() {
        let mut session = Session::new(false);
        session.screen = Screen::Questioning;
        session.question_index = 3;
        let mut effects = Vec::new();
        reset(&mut session, &mut effects);
        assert!(session.exit_guard_visible());
        assert_eq!(session.question_index(), 3);
        assert!(effects.is_empty());
    }
}
