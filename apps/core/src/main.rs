// EscapeStress Backend Entry Point

use anyhow::{bail, Context};
use escapestress_core::brain::StressAnalyzer;
use escapestress_core::config::Settings;
use escapestress_core::database::Store;
use escapestress_core::knowledge::load_knowledge;
use escapestress_core::logging::init_tracing;
use escapestress_core::preflight::run_preflight_checks;
use escapestress_core::server::{self, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let settings = Settings::from_env().context("Invalid configuration")?;
    init_tracing(settings.log_format);
    info!("🚀 EscapeStress starting...");

    let store = Store::new(&settings.store)?;

    let report = run_preflight_checks(&settings, &store).await;
    if !report.ready_to_start {
        error!("{}", report.summary);
        bail!("Preflight failed: {}", report.summary);
    }

    store.ensure_schema().await.context("Failed to prepare schema")?;
    store.seed_resources().await.context("Failed to seed resources")?;

    // Missing or corrupt model is fatal.
    let analyzer = StressAnalyzer::from_path(&settings.model_path)?;
    let knowledge = load_knowledge(&settings.knowledge_path)?;

    let state = AppState::new(analyzer, knowledge, store);
    let app = server::router(state, Some(settings.paths.static_dir()));

    let addr = settings.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind {}", addr))?;
    info!("EscapeStress listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("EscapeStress stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
