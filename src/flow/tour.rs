//! Tour coordinator: the guided-tour pointer and its coupling to the
//! screen and question pointer.

use serde_json::json;
use tracing::debug;

use crate::catalog::{BeatTarget, Catalog};

use super::session::{Screen, Session};
use super::transition::Effect;
use super::view;

/// Position of the beat that should be on screen, if any.
///
/// Pure function of the four source signals; visibility is never stored.
pub fn visible_beat(
    screen: Screen,
    question_index: usize,
    tour_active: bool,
    tour_position: usize,
    catalog: &Catalog,
) -> Option<usize> {
    if !tour_active {
        return None;
    }
    let target = catalog.beat(tour_position)?.target;
    let visible = target.screen() == screen
        && (screen != Screen::Questioning || target.anchored_question() == Some(question_index));
    visible.then_some(tour_position)
}

/// Start the tour from its first beat, pulling the user back to intro.
///
/// The answer collector's state is left intact so questioning resumes
/// where it stopped.
pub(super) fn activate(session: &mut Session, catalog: &Catalog, effects: &mut Vec<Effect>) {
    if catalog.beat_count() == 0 {
        debug!("Tour has no beats; activation ignored");
        return;
    }
    session.screen = Screen::Intro;
    session.tour_position = 0;
    session.tour_active = true;
    effects.push(Effect::CancelTourTimer);
    effects.push(Effect::log("walkthrough_started", json!({})));
}

/// Delayed first-run activation. Only fires on an untouched intro screen:
/// a user who already started questioning is never pulled back by the timer.
pub(super) fn auto_activate(session: &mut Session, catalog: &Catalog, effects: &mut Vec<Effect>) {
    if session.tour_completed || session.tour_active || session.screen != Screen::Intro {
        debug!(
            completed = session.tour_completed,
            active = session.tour_active,
            screen = %session.screen,
            "Skipping tour auto-activation"
        );
        return;
    }
    activate(session, catalog, effects);
}

pub(super) fn advance(session: &mut Session, catalog: &Catalog, effects: &mut Vec<Effect>) {
    if !session.tour_active {
        return;
    }
    let next = session.tour_position + 1;
    let Some(beat) = catalog.beat(next) else {
        finish(session, effects);
        effects.push(Effect::log("walkthrough_completed", json!({})));
        return;
    };

    if beat.target.screen() == Screen::Questioning && session.screen == Screen::Intro {
        // Same transition as pressing start; it aligns the pointer with
        // the question being resumed.
        view::start(session, catalog, effects);
        session.tour_position = catalog
            .beat_for_question(session.question_index)
            .unwrap_or(next);
        return;
    }
    session.tour_position = next;
}

pub(super) fn retreat(session: &mut Session, catalog: &Catalog) {
    if !session.tour_active || session.tour_position == 0 {
        return;
    }
    let previous = session.tour_position - 1;
    let leaves_questioning = catalog
        .beat(previous)
        .is_some_and(|b| b.target == BeatTarget::Intro)
        && session.screen == Screen::Questioning;
    if leaves_questioning {
        session.screen = Screen::Intro;
    }
    session.tour_position = previous;
}

pub(super) fn skip(session: &mut Session, effects: &mut Vec<Effect>) {
    if !session.tour_active {
        return;
    }
    let position = session.tour_position;
    finish(session, effects);
    effects.push(Effect::log("walkthrough_skipped", json!({ "position": position })));
}

/// Keep the pointer on the beat anchored to the visible question.
pub(super) fn resync_to_question(session: &mut Session, catalog: &Catalog) {
    if !session.tour_active || session.screen != Screen::Questioning {
        return;
    }
    if let Some(position) = catalog.beat_for_question(session.question_index) {
        session.tour_position = position;
    }
}

/// Mark the tour permanently completed and deactivate it.
fn finish(session: &mut Session, effects: &mut Vec<Effect>) {
    session.tour_active = false;
    session.tour_completed = true;
    effects.push(Effect::PersistTourCompleted);
    effects.push(Effect::CancelTourTimer);
}
