use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use formpilot_core::FormPilotConfig;
use formpilot_llm::{LlmClient, OpenAiCompatClient};
use formpilot_sessions::SessionStore;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Central shared state — passed as `Arc<AppState>` to every handler.
pub struct AppState {
    pub config: FormPilotConfig,
    pub sessions: SessionStore,
    pub llm: Box<dyn LlmClient>,
}

impl AppState {
    pub fn new(config: FormPilotConfig) -> Self {
        let llm = OpenAiCompatClient::new(
            config.llm_api_endpoint.clone(),
            config.llm_api_key.clone(),
            config.llm_model_name.clone(),
            config.llm_request_timeout_sec,
        );
        Self::with_llm(config, Box::new(llm))
    }

    /// Swap in an arbitrary `LlmClient` — used by tests to wire a
    /// `StubLlmClient` instead of a real HTTP endpoint.
    pub fn with_llm(config: FormPilotConfig, llm: Box<dyn LlmClient>) -> Self {
        let sessions = SessionStore::new(config.session_timeout_sec);
        Self { config, sessions, llm }
    }
}

fn cors_layer(config: &FormPilotConfig) -> CorsLayer {
    let origins = config.cors_origins();
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(parsed)
    };
    CorsLayer::new().allow_origin(allow_origin).allow_methods(tower_http::cors::Any).allow_headers(tower_http::cors::Any)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);
    Router::new()
        .route("/api/chat", post(crate::http::chat::chat_handler))
        .route("/api/schemas", get(crate::http::schemas::list_schemas))
        .route("/api/schemas/{filename}", get(crate::http::schemas::get_schema))
        .route("/api/sessions/reset", post(crate::http::sessions::reset_session))
        .route("/api/health", get(crate::http::health::health_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
