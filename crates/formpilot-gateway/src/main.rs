use std::net::SocketAddr;
use std::sync::Arc;

use formpilot_gateway::app;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formpilot_gateway=info,tower_http=debug".into()),
        )
        .init();

    let config_path = std::env::var("FORMPILOT_CONFIG").ok();
    let config = formpilot_core::FormPilotConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("config load failed ({}), using defaults", e);
        formpilot_core::FormPilotConfig::default()
    });

    let host = config.backend_host.clone();
    let port = config.backend_port;
    let state = Arc::new(app::AppState::new(config));

    tokio::spawn(sweep_expired_sessions(state.clone()));

    let router = app::build_router(state);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!("FormPilot gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Evicts expired sessions on a fixed cadence so `SESSION_TIMEOUT_SEC` has
/// runtime effect. Never exits; the task dies with the process.
async fn sweep_expired_sessions(state: Arc<app::AppState>) {
    const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let swept = state.sessions.sweep_expired();
        if swept > 0 {
            tracing::debug!(swept, "session sweep pass complete");
        }
    }
}
