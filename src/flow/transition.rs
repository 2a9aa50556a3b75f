//! The single transition function of the flow.
//!
//! Every user action and background event goes through
//! [`apply_transition`], which computes the successor snapshot and the
//! side effects the controller must carry out. Tour-driven screen changes
//! and navigation-driven tour resynchronization both happen here, so the
//! three state dimensions are always updated in one step.

use serde::Serialize;
use serde_json::json;

use crate::catalog::Catalog;
use crate::config::CompletionPolicy;
use crate::record::{ArtifactRef, Record};

use super::collector::{self, CollectorOutcome};
use super::exit_guard;
use super::session::{ArtifactState, Screen, Session};
use super::tour;
use super::view;

/// Settled result of a render request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Ready(ArtifactRef),
    Unavailable { reason: String },
}

/// Inputs to the flow: user actions and background events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetBuffer(String),
    Confirm,
    Back,
    Start,
    /// Abandon request; guarded while questioning.
    Reset,
    /// Reset that bypasses the exit guard.
    ForceReset,
    CancelExit,
    ConfirmExit,
    ActivateTour,
    /// One-shot delayed first-run activation.
    AutoActivateTour,
    TourAdvance,
    TourRetreat,
    TourSkip,
    RenderSettled { ticket: u64, outcome: RenderOutcome },
}

impl Action {
    /// Actions that would touch the questioning state or move the user;
    /// swallowed while the exit guard is up.
    fn blocked_by_exit_guard(&self) -> bool {
        !matches!(
            self,
            Self::CancelExit | Self::ConfirmExit | Self::ForceReset | Self::RenderSettled { .. }
        )
    }
}

/// Observable changes, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEvent {
    /// A confirm or back moved the question pointer, or the last answer
    /// completed the questionnaire.
    StepChanged { index: usize, completed: bool },
    ScreenChanged { from: Screen, to: Screen },
    TourChanged {
        active: bool,
        position: usize,
        visible: bool,
    },
    ExitGuardChanged { visible: bool },
    ArtifactSettled { ticket: u64, available: bool },
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(FlowEvent),
    Log {
        name: &'static str,
        attrs: serde_json::Value,
    },
    RequestRender { ticket: u64, record: Record },
    PersistTourCompleted,
    CancelTourTimer,
}

impl Effect {
    pub(super) fn log(name: &'static str, attrs: serde_json::Value) -> Self {
        Self::Log { name, attrs }
    }
}

/// Successor snapshot plus the effects to run.
#[derive(Debug, Clone)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn is_noop(&self, previous: &Session) -> bool {
        self.effects.is_empty() && &self.session == previous
    }
}

/// Compute the successor of `session` under `action`.
pub fn apply_transition(
    session: &Session,
    action: Action,
    catalog: &Catalog,
    policy: CompletionPolicy,
) -> Transition {
    let mut next = session.clone();
    let mut effects = Vec::new();

    if session.exit_guard_visible && action.blocked_by_exit_guard() {
        return Transition {
            session: next,
            effects,
        };
    }

    match action {
        Action::SetBuffer(text) => {
            if next.screen == Screen::Questioning {
                collector::set_buffer(&mut next, text);
            }
        }
        Action::Confirm | Action::Back if next.screen != Screen::Questioning => {}
        Action::Confirm => {
            let outcome = collector::confirm(&mut next, catalog);
            on_collector_outcome(&mut next, outcome, catalog, policy, &mut effects);
        }
        Action::Back => {
            let outcome = collector::back(&mut next, catalog);
            on_collector_outcome(&mut next, outcome, catalog, policy, &mut effects);
        }
        Action::Start => view::start(&mut next, catalog, &mut effects),
        Action::Reset => view::reset(&mut next, &mut effects),
        Action::ForceReset => view::force_reset(&mut next),
        Action::CancelExit => exit_guard::cancel(&mut next),
        Action::ConfirmExit => exit_guard::confirm(&mut next, &mut effects),
        Action::ActivateTour => tour::activate(&mut next, catalog, &mut effects),
        Action::AutoActivateTour => tour::auto_activate(&mut next, catalog, &mut effects),
        Action::TourAdvance => tour::advance(&mut next, catalog, &mut effects),
        Action::TourRetreat => tour::retreat(&mut next, catalog),
        Action::TourSkip => tour::skip(&mut next, &mut effects),
        Action::RenderSettled { ticket, outcome } => settle_render(&mut next, ticket, outcome),
    }

    notify_changes(session, &next, catalog, &mut effects);
    Transition {
        session: next,
        effects,
    }
}

fn on_collector_outcome(
    session: &mut Session,
    outcome: CollectorOutcome,
    catalog: &Catalog,
    policy: CompletionPolicy,
    effects: &mut Vec<Effect>,
) {
    match outcome {
        CollectorOutcome::Unchanged => {}
        CollectorOutcome::Moved { index } => {
            tour::resync_to_question(session, catalog);
            effects.push(Effect::Notify(FlowEvent::StepChanged {
                index,
                completed: false,
            }));
            effects.push(Effect::log(
                "step_changed",
                json!({ "index": index, "completed": false }),
            ));
        }
        CollectorOutcome::Completed(record) => {
            let index = session.question_index;
            effects.push(Effect::Notify(FlowEvent::StepChanged {
                index,
                completed: true,
            }));
            effects.push(Effect::log(
                "step_changed",
                json!({ "index": index, "completed": true }),
            ));
            view::complete_questioning(session, record, catalog, policy, effects);
        }
    }
}

fn settle_render(session: &mut Session, ticket: u64, outcome: RenderOutcome) {
    let Some(result) = session.result.as_mut() else {
        return;
    };
    if result.ticket != ticket || result.artifact != ArtifactState::Pending {
        return;
    }
    result.artifact = match outcome {
        RenderOutcome::Ready(artifact) => ArtifactState::Ready(artifact),
        RenderOutcome::Unavailable { reason } => ArtifactState::Unavailable { reason },
    };
}

/// Derive change notifications by diffing the two snapshots.
fn notify_changes(before: &Session, after: &Session, catalog: &Catalog, effects: &mut Vec<Effect>) {
    if before.screen != after.screen {
        effects.push(Effect::Notify(FlowEvent::ScreenChanged {
            from: before.screen,
            to: after.screen,
        }));
    }

    if before.exit_guard_visible != after.exit_guard_visible {
        effects.push(Effect::Notify(FlowEvent::ExitGuardChanged {
            visible: after.exit_guard_visible,
        }));
    }

    let was_visible = visible(before, catalog);
    let is_visible = visible(after, catalog);
    if before.tour_active != after.tour_active
        || before.tour_position != after.tour_position
        || was_visible != is_visible
    {
        effects.push(Effect::Notify(FlowEvent::TourChanged {
            active: after.tour_active,
            position: after.tour_position,
            visible: is_visible,
        }));
    }

    if let Some(result) = after.result.as_ref() {
        let was_pending = before
            .result
            .as_ref()
            .is_some_and(|r| r.ticket == result.ticket && r.artifact == ArtifactState::Pending);
        if was_pending && result.artifact != ArtifactState::Pending {
            effects.push(Effect::Notify(FlowEvent::ArtifactSettled {
                ticket: result.ticket,
                available: matches!(result.artifact, ArtifactState::Ready(_)),
            }));
        }
    }
}

fn visible(session: &Session, catalog: &Catalog) -> bool {
    tour::visible_beat(
        session.screen,
        session.question_index,
        session.tour_active,
        session.tour_position,
        catalog,
    )
    .is_some()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::record::RecordField;

    const POLICY: CompletionPolicy = CompletionPolicy::AdvanceToResultBeat;

    struct Harness {
        session: Session,
        catalog: Catalog,
        effects: Vec<Effect>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                session: Session::new(false),
                catalog: Catalog::default(),
                effects: Vec::new(),
            }
        }

        fn apply(&mut self, action: Action) -> &mut Self {
            let transition = apply_transition(&self.session, action, &self.catalog, POLICY);
            self.session = transition.session;
            self.effects = transition.effects;
            self
        }

        fn answer(&mut self, text: &str) -> &mut Self {
            self.apply(Action::SetBuffer(text.to_string()));
            self.apply(Action::Confirm)
        }

        fn notified(&self, event: &FlowEvent) -> bool {
            self.effects.contains(&Effect::Notify(event.clone()))
        }
    }

    #[test]
    fn input_does_not_reach_collector_outside_questioning() {
        let mut h = Harness::new();
        h.apply(Action::SetBuffer("early".to_string()));
        h.apply(Action::Confirm);
        assert_eq!(h.session, Session::new(false));
    }

    #[test]
    fn blank_confirm_emits_nothing() {
        let mut h = Harness::new();
        h.apply(Action::Start);
        h.apply(Action::SetBuffer("   ".to_string()));
        let before = h.session.clone();
        let transition = apply_transition(&before, Action::Confirm, &h.catalog, POLICY);
        assert!(transition.is_noop(&before));
    }

    #[test]
    fn back_at_zero_emits_nothing() {
        let mut h = Harness::new();
        h.apply(Action::Start);
        let before = h.session.clone();
        let transition = apply_transition(&before, Action::Back, &h.catalog, POLICY);
        assert!(transition.is_noop(&before));
    }

    #[test]
    fn confirm_notifies_step_change() {
        let mut h = Harness::new();
        h.apply(Action::Start);
        h.answer("DreamCatcher");
        assert!(h.notified(&FlowEvent::StepChanged {
            index: 1,
            completed: false
        }));
    }

    #[test]
    fn last_confirm_completes_and_requests_render() {
        let mut h = Harness::new();
        h.apply(Action::Start);
        for i in 0..8 {
            h.answer(&format!("answer {i}"));
        }
        assert_eq!(h.session.screen(), Screen::Result);
        assert!(h.notified(&FlowEvent::StepChanged {
            index: 7,
            completed: true
        }));
        assert!(h.notified(&FlowEvent::ScreenChanged {
            from: Screen::Questioning,
            to: Screen::Result
        }));
        let record = h.session.result().unwrap().record.clone();
        assert_eq!(record.get(RecordField::Differentiator), "answer 7");
        assert!(h
            .effects
            .contains(&Effect::RequestRender { ticket: 1, record }));
    }

    #[test]
    fn answers_are_last_confirmed_values_regardless_of_order() {
        let mut h = Harness::new();
        h.apply(Action::Start);
        h.answer("a0").answer("a1").answer("a2");
        h.apply(Action::Back).apply(Action::Back).apply(Action::Back);
        h.answer("b0");
        h.answer("a1");
        h.answer("c2");
        h.apply(Action::Back).apply(Action::Back);
        h.answer("c1");

        let partial = h.session.partial_record();
        assert_eq!(partial.get(RecordField::Name), Some("b0"));
        assert_eq!(partial.get(RecordField::Category), Some("c1"));
        assert_eq!(partial.get(RecordField::Audience), Some("c2"));
        assert_eq!(partial.len(), 3);
        assert_eq!(h.session.question_index(), 2);
    }

    #[test]
    fn terminal_confirm_logs_completed_step() {
        let mut h = Harness::new();
        h.apply(Action::Start);
        for i in 0..8 {
            h.answer(&format!("answer {i}"));
        }
        assert!(h.effects.contains(&Effect::log(
            "step_changed",
            json!({ "index": 7, "completed": true })
        )));
        assert!(h.effects.iter().any(|e| matches!(e, Effect::Log { name: "quiz_completed", .. })));
    }

    #[test]
    fn random_confirm_back_sequences_keep_last_confirmed_values() {
        let catalog = Catalog::default();
        let inputs = ["", "  ", "alpha", " beta ", "gamma", "delta  "];

        for seed in 0..500u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut session = apply_transition(&Session::new(true), Action::Start, &catalog, POLICY).session;
            let mut expected: BTreeMap<RecordField, String> = BTreeMap::new();
            let mut index = 0usize;

            for _ in 0..30 {
                if rng.gen_bool(0.3) {
                    session = apply_transition(&session, Action::Back, &catalog, POLICY).session;
                    index = index.saturating_sub(1);
                    continue;
                }

                let text = inputs[rng.gen_range(0..inputs.len())];
                session = apply_transition(&session, Action::SetBuffer(text.to_string()), &catalog, POLICY)
                    .session;
                session = apply_transition(&session, Action::Confirm, &catalog, POLICY).session;
                if text.trim().is_empty() {
                    continue;
                }
                let field = catalog.question(index).unwrap().field;
                expected.insert(field, text.trim().to_string());
                if index == catalog.last_question() {
                    break;
                }
                index += 1;
            }

            for field in RecordField::ALL {
                let stored = match session.result() {
                    Some(result) => Some(result.record.get(field)),
                    None => session.partial_record().get(field),
                };
                assert_eq!(stored, expected.get(&field).map(String::as_str), "seed {seed}, field {field}");
            }
            if session.screen() == Screen::Questioning {
                assert_eq!(session.question_index(), index, "seed {seed}");
            } else {
                assert_eq!(expected.len(), RecordField::ALL.len(), "seed {seed}");
            }
        }
    }

    #[test]
    fn navigation_resyncs_active_tour() {
        let mut h = Harness::new();
        h.apply(Action::ActivateTour);
        h.apply(Action::Start);
        assert_eq!(h.session.tour_position(), 3);

        h.answer("DreamCatcher");
        assert_eq!(h.session.tour_position(), 4);
        assert!(h.session.tour_overlay(&h.catalog).is_some());

        h.apply(Action::Back);
        assert_eq!(h.session.tour_position(), 3);
    }

    #[test]
    fn tour_advance_from_last_intro_beat_starts_questioning() {
        let mut h = Harness::new();
        h.apply(Action::ActivateTour);
        h.apply(Action::TourAdvance).apply(Action::TourAdvance);
        assert_eq!(h.session.tour_position(), 2);

        h.apply(Action::TourAdvance);
        assert_eq!(h.session.screen(), Screen::Questioning);
        assert_eq!(h.session.question_index(), 0);
        assert_eq!(h.session.tour_position(), 3);
        assert!(h.notified(&FlowEvent::TourChanged {
            active: true,
            position: 3,
            visible: true
        }));
    }

    #[test]
    fn activation_mid_questionnaire_resumes_at_anchored_beat() {
        let mut h = Harness::new();
        h.apply(Action::Start);
        for i in 0..6 {
            h.answer(&format!("answer {i}"));
        }
        assert_eq!(h.session.question_index(), 6);

        h.apply(Action::ActivateTour);
        assert_eq!(h.session.screen(), Screen::Intro);
        assert_eq!(h.session.tour_position(), 0);

        h.apply(Action::TourAdvance).apply(Action::TourAdvance).apply(Action::TourAdvance);
        assert_eq!(h.session.screen(), Screen::Questioning);
        assert_eq!(h.session.question_index(), 6);
        assert_eq!(h.session.tour_position(), 9);
        assert_eq!(h.session.partial_record().len(), 6);
    }

    #[test]
    fn exit_guard_blocks_questioning_actions() {
        let mut h = Harness::new();
        h.apply(Action::Start);
        h.answer("DreamCatcher");
        h.apply(Action::Reset);
        assert!(h.session.exit_guard_visible());

        let guarded = h.session.clone();
        for action in [
            Action::SetBuffer("x".to_string()),
            Action::Confirm,
            Action::Back,
            Action::Reset,
            Action::ActivateTour,
            Action::TourAdvance,
        ] {
            let transition = apply_transition(&guarded, action, &h.catalog, POLICY);
            assert!(transition.is_noop(&guarded));
        }

        h.apply(Action::ConfirmExit);
        assert_eq!(h.session.screen(), Screen::Intro);
        assert!(h.session.partial_record().is_empty());
        assert!(h.notified(&FlowEvent::ExitGuardChanged { visible: false }));
    }

    #[test]
    fn stale_render_outcome_is_dropped() {
        let mut h = Harness::new();
        h.apply(Action::Start);
        for i in 0..8 {
            h.answer(&format!("answer {i}"));
        }
        h.apply(Action::RenderSettled {
            ticket: 99,
            outcome: RenderOutcome::Ready(ArtifactRef("late".to_string())),
        });
        assert_eq!(h.session.result().unwrap().artifact, ArtifactState::Pending);

        h.apply(Action::RenderSettled {
            ticket: 1,
            outcome: RenderOutcome::Unavailable {
                reason: "boom".to_string(),
            },
        });
        assert_eq!(
            h.session.result().unwrap().artifact,
            ArtifactState::Unavailable {
                reason: "boom".to_string()
            }
        );
        assert!(h.notified(&FlowEvent::ArtifactSettled {
            ticket: 1,
            available: false
        }));
    }

    #[test]
    fn input_replay_is_deterministic() {
        let script = [
            Action::ActivateTour,
            Action::TourAdvance,
            Action::Start,
            Action::SetBuffer("x".to_string()),
            Action::Confirm,
            Action::TourRetreat,
            Action::Start,
            Action::Back,
            Action::TourSkip,
        ];
        let run = || {
            let mut h = Harness::new();
            for action in script.clone() {
                h.apply(action);
            }
            h.session
        };
        assert_eq!(run(), run());
    }
}
