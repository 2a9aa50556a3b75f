//! ViewController: owns the live session and runs transition effects.
//!
//! The controller is the only place the flow touches the outside world:
//! the render service, the flag store, telemetry and the host's unload
//! guard. Background work (render completion, the first-run tour timer)
//! comes back in as ordinary [`Action`]s on an internal channel, so every
//! state change still goes through [`apply_transition`].

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::FlowConfig;
use crate::record::Record;
use crate::render::Renderer;
use crate::store::FlagStore;
use crate::telemetry::Telemetry;
use crate::unload::UnloadGuard;

use super::session::{Screen, Session, TourOverlay};
use super::transition::{Action, Effect, FlowEvent, RenderOutcome, apply_transition};

/// Default broadcast channel capacity.
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// External collaborators of the flow.
#[derive(Clone)]
pub struct FlowDeps {
    pub renderer: Arc<dyn Renderer>,
    pub flags: Arc<dyn FlagStore>,
    pub telemetry: Arc<dyn Telemetry>,
    pub unload: Arc<dyn UnloadGuard>,
}

pub struct ViewController {
    session: Session,
    catalog: Arc<Catalog>,
    config: FlowConfig,
    deps: FlowDeps,
    /// Correlates all telemetry of one run.
    session_id: Uuid,
    background_tx: mpsc::UnboundedSender<Action>,
    background_rx: Option<mpsc::UnboundedReceiver<Action>>,
    events_tx: broadcast::Sender<FlowEvent>,
    tour_timer: Option<JoinHandle<()>>,
}

impl ViewController {
    /// Load the tour flag, log `app_start` and arm the first-run tour timer.
    ///
    /// An unreadable flag counts as unset.
    pub async fn start_up(catalog: Arc<Catalog>, config: FlowConfig, deps: FlowDeps) -> Self {
        let tour_completed = match deps.flags.get_flag(&config.tour_flag_key).await {
            Ok(set) => set,
            Err(e) => {
                warn!(key = %config.tour_flag_key, error = %e, "Failed to read tour flag; treating as unset");
                false
            }
        };

        let (background_tx, background_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);

        let mut controller = Self {
            session: Session::new(tour_completed),
            catalog,
            config,
            deps,
            session_id: Uuid::new_v4(),
            background_tx,
            background_rx: Some(background_rx),
            events_tx,
            tour_timer: None,
        };

        info!(
            session_id = %controller.session_id,
            tour_completed,
            "Flow started"
        );
        controller.log("app_start", json!({ "tour_completed": tour_completed }));

        if !tour_completed {
            controller.schedule_tour();
        }
        controller
    }

    fn schedule_tour(&mut self) {
        let delay = self.config.tour_delay;
        let tx = self.background_tx.clone();
        debug!(delay_ms = delay.as_millis() as u64, "Scheduling first-run tour");
        self.tour_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Action::AutoActivateTour);
        }));
    }

    /// Apply one action and carry out its effects.
    ///
    /// Returns the change notifications the action produced.
    pub async fn dispatch(&mut self, action: Action) -> Vec<FlowEvent> {
        debug!(?action, "Dispatching");
        let transition = apply_transition(
            &self.session,
            action,
            &self.catalog,
            self.config.completion_policy,
        );
        let previous = std::mem::replace(&mut self.session, transition.session);
        self.sync_unload_guard(previous.screen(), self.session.screen());

        let mut notified = Vec::new();
        for effect in transition.effects {
            match effect {
                Effect::Notify(event) => {
                    // No subscribers is fine.
                    let _ = self.events_tx.send(event.clone());
                    notified.push(event);
                }
                Effect::Log { name, attrs } => self.log(name, attrs),
                Effect::RequestRender { ticket, record } => self.spawn_render(ticket, record),
                Effect::PersistTourCompleted => self.persist_tour_completed().await,
                Effect::CancelTourTimer => self.cancel_tour_timer(),
            }
        }
        notified
    }

    fn sync_unload_guard(&self, before: Screen, after: Screen) {
        if before == after {
            return;
        }
        if after == Screen::Questioning {
            self.deps.unload.arm();
        } else if before == Screen::Questioning {
            self.deps.unload.disarm();
        }
    }

    fn log(&self, name: &str, attrs: serde_json::Value) {
        let attrs = match attrs {
            serde_json::Value::Object(mut map) => {
                map.insert("session_id".to_string(), json!(self.session_id));
                serde_json::Value::Object(map)
            }
            other => other,
        };
        self.deps.telemetry.log_event(name, &attrs);
    }

    fn spawn_render(&self, ticket: u64, record: Record) {
        let renderer = Arc::clone(&self.deps.renderer);
        let telemetry = Arc::clone(&self.deps.telemetry);
        let tx = self.background_tx.clone();
        let session_id = self.session_id;

        tokio::spawn(async move {
            let started = Instant::now();
            let result = renderer.render(&record).await;
            let latency_ms = started.elapsed().as_millis() as u64;

            let outcome = match result {
                Ok(artifact) => {
                    info!(ticket, latency_ms, backend = renderer.name(), "Render completed");
                    telemetry.log_event(
                        "render_call",
                        &json!({
                            "latency_ms": latency_ms,
                            "status": "ok",
                            "backend": renderer.name(),
                            "session_id": session_id,
                        }),
                    );
                    RenderOutcome::Ready(artifact)
                }
                Err(e) => {
                    warn!(ticket, latency_ms, error = %e, "Render failed");
                    telemetry.log_event(
                        "render_call",
                        &json!({
                            "latency_ms": latency_ms,
                            "status": "error",
                            "error": e.to_string(),
                            "backend": renderer.name(),
                            "session_id": session_id,
                        }),
                    );
                    RenderOutcome::Unavailable {
                        reason: e.to_string(),
                    }
                }
            };

            if tx.send(Action::RenderSettled { ticket, outcome }).is_err() {
                debug!(ticket, "Controller gone before render settled");
            }
        });
    }

    async fn persist_tour_completed(&self) {
        let key = &self.config.tour_flag_key;
        match self.deps.flags.set_flag(key).await {
            Ok(()) => debug!(key = %key, "Tour flag persisted"),
            Err(e) => warn!(key = %key, error = %e, "Failed to persist tour flag"),
        }
    }

    fn cancel_tour_timer(&mut self) {
        if let Some(timer) = self.tour_timer.take() {
            timer.abort();
        }
    }

    /// Wait for the next background event (render result, tour timer) and
    /// apply it. Returns `None` once the receiver has been taken.
    pub async fn next_background(&mut self) -> Option<Vec<FlowEvent>> {
        let action = self.background_rx.as_mut()?.recv().await?;
        Some(self.dispatch(action).await)
    }

    /// Apply every background event that is already queued.
    pub async fn drain_background(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let Some(rx) = self.background_rx.as_mut() else {
                break;
            };
            let Ok(action) = rx.try_recv() else {
                break;
            };
            self.dispatch(action).await;
            applied += 1;
        }
        applied
    }

    /// Hand the background receiver to a caller that wants to multiplex it
    /// with other inputs. Events must then be fed back through [`Self::dispatch`].
    pub fn take_background_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<Action>> {
        self.background_rx.take()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.events_tx.subscribe()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn tour_overlay(&self) -> Option<TourOverlay<'_>> {
        self.session.tour_overlay(&self.catalog)
    }

    /// Whether the first-run tour timer is still pending.
    pub fn tour_timer_pending(&self) -> bool {
        self.tour_timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub async fn set_buffer(&mut self, text: impl Into<String>) -> Vec<FlowEvent> {
        self.dispatch(Action::SetBuffer(text.into())).await
    }

    pub async fn confirm(&mut self) -> Vec<FlowEvent> {
        self.dispatch(Action::Confirm).await
    }

    pub async fn back(&mut self) -> Vec<FlowEvent> {
        self.dispatch(Action::Back).await
    }

    pub async fn start(&mut self) -> Vec<FlowEvent> {
        self.dispatch(Action::Start).await
    }

    pub async fn reset(&mut self) -> Vec<FlowEvent> {
        self.dispatch(Action::Reset).await
    }

    pub async fn force_reset(&mut self) -> Vec<FlowEvent> {
        self.dispatch(Action::ForceReset).await
    }

    pub async fn cancel_exit(&mut self) -> Vec<FlowEvent> {
        self.dispatch(Action::CancelExit).await
    }

    pub async fn confirm_exit(&mut self) -> Vec<FlowEvent> {
        self.dispatch(Action::ConfirmExit).await
    }

    pub async fn activate_tour(&mut self) -> Vec<FlowEvent> {
        self.dispatch(Action::ActivateTour).await
    }

    pub async fn tour_advance(&mut self) -> Vec<FlowEvent> {
        self.dispatch(Action::TourAdvance).await
    }

    pub async fn tour_retreat(&mut self) -> Vec<FlowEvent> {
        self.dispatch(Action::TourRetreat).await
    }

    pub async fn tour_skip(&mut self) -> Vec<FlowEvent> {
        self.dispatch(Action::TourSkip).await
    }

    /// Stop background work and release the unload guard.
    pub fn shutdown(&mut self) {
        self.cancel_tour_timer();
        self.deps.unload.disarm();
        info!(session_id = %self.session_id, screen = %self.session.screen(), "Flow shut down");
    }
}

impl Drop for ViewController {
    fn drop(&mut self) {
        self.cancel_tour_timer();
    }
}
