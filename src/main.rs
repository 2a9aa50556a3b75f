use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use blueprint_guide::catalog::Catalog;
use blueprint_guide::cli;
use blueprint_guide::config::{DEFAULT_LOG_FILTER, FlowConfig};
use blueprint_guide::flow::{FlowDeps, ViewController};
use blueprint_guide::render::{HttpRenderer, Renderer, UnavailableRenderer};
use blueprint_guide::store::{FlagStore, LibSqlFlagStore, MemoryFlagStore};
use blueprint_guide::telemetry::TracingTelemetry;
use blueprint_guide::unload::UnloadLatch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = FlowConfig::from_env().context("Invalid configuration")?;

    // Initialize tracing: stderr always, plus a daily log file when configured.
    let (file_layer, _log_guard) = match config.log_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "blueprint-guide.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    eprintln!("Blueprint Guide v{}", env!("CARGO_PKG_VERSION"));

    let catalog = match config.catalog_path.as_deref() {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => Catalog::default(),
    };

    // ── Flag store ───────────────────────────────────────────────────────
    // A broken database only costs the "tour completed" memory.
    let flags: Arc<dyn FlagStore> = match LibSqlFlagStore::new_local(&config.db_path).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(
                path = %config.db_path.display(),
                error = %e,
                "Flag store unavailable; tour progress will not persist"
            );
            Arc::new(MemoryFlagStore::new())
        }
    };

    let renderer: Arc<dyn Renderer> = match config.render.clone() {
        Some(render) => {
            eprintln!("   Render endpoint: {}", render.url);
            Arc::new(HttpRenderer::new(render).context("Failed to set up renderer")?)
        }
        None => {
            eprintln!("   Render endpoint: none (BLUEPRINT_RENDER_URL not set)");
            Arc::new(UnavailableRenderer)
        }
    };

    let latch = Arc::new(UnloadLatch::new());
    let deps = FlowDeps {
        renderer,
        flags,
        telemetry: Arc::new(TracingTelemetry),
        unload: latch.clone(),
    };

    let controller = ViewController::start_up(Arc::new(catalog), config, deps).await;
    cli::run(controller, latch).await;
    Ok(())
}
