//! Blueprint Guide: guided questionnaire flow with an optional product tour.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod record;
pub mod render;
pub mod store;
pub mod telemetry;
pub mod unload;
