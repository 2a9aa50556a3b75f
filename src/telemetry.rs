//! Telemetry sink: fire-and-forget product events.
//!
//! The flow never waits on telemetry and a sink has no way to report
//! failure back into it.

use std::sync::Mutex;

use tracing::info;

/// Event sink consumed by the flow controller.
pub trait Telemetry: Send + Sync {
    fn log_event(&self, name: &str, attrs: &serde_json::Value);
}

/// Default sink: every event becomes a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn log_event(&self, name: &str, attrs: &serde_json::Value) {
        info!(target: "telemetry", event = name, attrs = %attrs, "Event: {name}");
    }
}

/// Sink that keeps events in memory, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct MemoryTelemetry {
    events: Mutex<Vec<(String, serde_json::Value)>>,
}

impl MemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> Vec<(String, serde_json::Value)> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Names of the recorded events, oldest first.
    pub fn names(&self) -> Vec<String> {
        self.events().into_iter().map(|(name, _)| name).collect()
    }
}

impl Telemetry for MemoryTelemetry {
    fn log_event(&self, name: &str, attrs: &serde_json::Value) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push((name.to_string(), attrs.clone()));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::prelude::*;

    use super::*;
    use crate::config::DEFAULT_LOG_FILTER;

    /// Layer that counts the events reaching it.
    struct CountingLayer(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CountingLayer {
        fn on_event(&self, _event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn tracing_sink_is_visible_under_default_filter() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(DEFAULT_LOG_FILTER))
            .with(CountingLayer(count.clone()));

        tracing::subscriber::with_default(subscriber, || {
            TracingTelemetry.log_event("app_start", &serde_json::json!({}));
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemoryTelemetry::new();
        sink.log_event("app_start", &serde_json::json!({}));
        sink.log_event("quiz_started", &serde_json::json!({"resume_at": 0}));
        assert_eq!(sink.names(), vec!["app_start", "quiz_started"]);
        assert_eq!(sink.events()[1].1["resume_at"], 0);
    }

    #[test]
    fn tracing_sink_accepts_any_attrs() {
        TracingTelemetry.log_event("render_call", &serde_json::json!({"latency_ms": 12}));
        TracingTelemetry.log_event("app_reset", &serde_json::Value::Null);
    }
}
