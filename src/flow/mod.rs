//! The view/step/tour coordination core.
//!
//! One [`Session`] snapshot holds the screen, the question pointer and the
//! tour pointer. [`apply_transition`] is the only way to move between
//! snapshots; [`ViewController`] owns the current snapshot and runs the
//! resulting effects against the external collaborators.

mod collector;
pub mod controller;
mod exit_guard;
pub mod session;
pub mod tour;
pub mod transition;
mod view;

pub use controller::{FlowDeps, ViewController};
pub use session::{ArtifactState, ResultState, Screen, Session, TourOverlay};
pub use tour::visible_beat;
pub use transition::{Action, Effect, FlowEvent, RenderOutcome, Transition, apply_transition};
