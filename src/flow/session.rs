//! Session snapshot: the single composite state of the flow.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, QuestionDef, TourBeat};
use crate::record::{ArtifactRef, PartialRecord, Record};

use super::tour;

/// Top-level, mutually exclusive screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Intro,
    Questioning,
    Result,
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Intro => "intro",
            Self::Questioning => "questioning",
            Self::Result => "result",
        };
        write!(f, "{s}")
    }
}

/// State of the rendered artifact on the result screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactState {
    Pending,
    Ready(ArtifactRef),
    /// Render failed; the result screen shows the textual record only.
    Unavailable { reason: String },
}

/// What the result screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultState {
    pub record: Record,
    pub artifact: ArtifactState,
    /// Ticket of the render request this result is waiting on.
    pub ticket: u64,
}

/// Snapshot of the whole flow.
///
/// Transitions never mutate a snapshot handed to them; they clone it and
/// return the successor (see [`super::apply_transition`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(super) screen: Screen,
    pub(super) question_index: usize,
    pub(super) buffer: String,
    pub(super) partial: PartialRecord,
    pub(super) tour_active: bool,
    pub(super) tour_position: usize,
    /// Mirror of the persisted "tour completed" flag. Survives resets.
    pub(super) tour_completed: bool,
    pub(super) exit_guard_visible: bool,
    pub(super) result: Option<ResultState>,
    /// Last issued render ticket. Monotonic across resets.
    pub(super) render_ticket: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Session {
    /// Fresh session at the intro screen.
    pub fn new(tour_completed: bool) -> Self {
        Self {
            screen: Screen::Intro,
            question_index: 0,
            buffer: String::new(),
            partial: PartialRecord::new(),
            tour_active: false,
            tour_position: 0,
            tour_completed,
            exit_guard_visible: false,
            result: None,
            render_ticket: 0,
        }
    }

    /// Initial values, keeping only what outlives a reset.
    pub(super) fn reset_from(previous: &Session) -> Self {
        Self {
            render_ticket: previous.render_ticket,
            ..Self::new(previous.tour_completed)
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    /// Working value of the current question's input.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn partial_record(&self) -> &PartialRecord {
        &self.partial
    }

    pub fn tour_active(&self) -> bool {
        self.tour_active
    }

    pub fn tour_position(&self) -> usize {
        self.tour_position
    }

    pub fn tour_completed(&self) -> bool {
        self.tour_completed
    }

    pub fn exit_guard_visible(&self) -> bool {
        self.exit_guard_visible
    }

    pub fn result(&self) -> Option<&ResultState> {
        self.result.as_ref()
    }

    /// Whether the confirm affordance is enabled.
    pub fn can_confirm(&self) -> bool {
        self.screen == Screen::Questioning && !self.buffer.trim().is_empty()
    }

    pub fn current_question<'a>(&self, catalog: &'a Catalog) -> Option<&'a QuestionDef> {
        catalog.question(self.question_index)
    }

    /// Questionnaire progress in percent, as shown while questioning.
    pub fn progress(&self, catalog: &Catalog) -> u8 {
        let total = catalog.question_count();
        (((self.question_index + 1) * 100) / total).min(100) as u8
    }

    /// The tour beat overlay, if one is visible right now.
    pub fn tour_overlay<'a>(&self, catalog: &'a Catalog) -> Option<TourOverlay<'a>> {
        let position = tour::visible_beat(
            self.screen,
            self.question_index,
            self.tour_active,
            self.tour_position,
            catalog,
        )?;
        Some(TourOverlay {
            beat: catalog.beat(position)?,
            position,
            is_first: position == 0,
            is_last: position + 1 == catalog.beat_count(),
        })
    }
}

/// A visible tour beat together with its navigation affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourOverlay<'a> {
    pub beat: &'a TourBeat,
    pub position: usize,
    /// First beat: no back control.
    pub is_first: bool,
    /// Last beat: the advance control finishes the tour.
    pub is_last: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_at_intro() {
        let session = Session::new(false);
        assert_eq!(session.screen(), Screen::Intro);
        assert_eq!(session.question_index(), 0);
        assert!(session.partial_record().is_empty());
        assert!(!session.tour_active());
        assert!(!session.exit_guard_visible());
        assert!(session.result().is_none());
    }

    #[test]
    fn reset_keeps_tour_flag_and_ticket() {
        let mut session = Session::new(true);
        session.screen = Screen::Result;
        session.question_index = 7;
        session.render_ticket = 3;
        session.tour_active = true;

        let reset = Session::reset_from(&session);
        assert_eq!(reset.screen(), Screen::Intro);
        assert_eq!(reset.question_index(), 0);
        assert!(!reset.tour_active());
        assert!(reset.tour_completed());
        assert_eq!(reset.render_ticket, 3);
    }

    #[test]
    fn progress_counts_current_question() {
        let catalog = Catalog::default();
        let mut session = Session::new(false);
        session.screen = Screen::Questioning;
        assert_eq!(session.progress(&catalog), 12);
        session.question_index = 3;
        assert_eq!(session.progress(&catalog), 50);
        session.question_index = 7;
        assert_eq!(session.progress(&catalog), 100);
    }

    #[test]
    fn can_confirm_requires_non_blank_buffer() {
        let mut session = Session::new(false);
        session.screen = Screen::Questioning;
        session.buffer = "  ".to_string();
        assert!(!session.can_confirm());
        session.buffer = " x ".to_string();
        assert!(session.can_confirm());
    }

    #[test]
    fn overlay_flags_first_and_last() {
        let catalog = Catalog::default();
        let mut session = Session::new(false);
        session.tour_active = true;
        let overlay = session.tour_overlay(&catalog).unwrap();
        assert!(overlay.is_first);
        assert!(!overlay.is_last);
        assert_eq!(overlay.beat.id, "intro-welcome");

        session.screen = Screen::Result;
        session.tour_position = 11;
        let overlay = session.tour_overlay(&catalog).unwrap();
        assert!(overlay.is_last);
        assert_eq!(overlay.beat.id, "result-congrats");
    }

    #[test]
    fn screen_display_matches_serde() {
        for screen in [Screen::Intro, Screen::Questioning, Screen::Result] {
            let json = serde_json::to_string(&screen).unwrap();
            assert_eq!(format!("\"{screen}\""), json);
        }
    }
}
