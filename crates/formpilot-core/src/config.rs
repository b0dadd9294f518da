use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

fn default_model_name() -> String {
    "default".to_string()
}

fn default_llm_timeout_sec() -> u64 {
    300
}

fn default_session_timeout_sec() -> u64 {
    1800
}

fn default_cors_origins() -> String {
    "*".to_string()
}

fn default_backend_host() -> String {
    "0.0.0.0".to_string()
}

fn default_backend_port() -> u16 {
    8000
}

fn default_schemas_dir() -> String {
    "./schemas".to_string()
}

/// Process configuration, loaded from an optional TOML file plus environment
/// variables.
///
/// Env vars are matched by their literal names (no common prefix) — this is
/// a fixed external contract, not FormPilot's own naming convention, so
/// `#[serde(rename = "...")]` is used on every field instead of relying on a
/// single `Env::prefixed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormPilotConfig {
    #[serde(rename = "LLM_API_ENDPOINT", default)]
    pub llm_api_endpoint: String,

    #[serde(rename = "LLM_API_KEY", default)]
    pub llm_api_key: String,

    #[serde(rename = "LLM_MODEL_NAME", default = "default_model_name")]
    pub llm_model_name: String,

    #[serde(rename = "LLM_REQUEST_TIMEOUT_SEC", default = "default_llm_timeout_sec")]
    pub llm_request_timeout_sec: u64,

    #[serde(rename = "SESSION_TIMEOUT_SEC", default = "default_session_timeout_sec")]
    pub session_timeout_sec: u64,

    #[serde(rename = "CORS_ALLOWED_ORIGINS", default = "default_cors_origins")]
    pub cors_allowed_origins: String,

    #[serde(rename = "BACKEND_HOST", default = "default_backend_host")]
    pub backend_host: String,

    #[serde(rename = "BACKEND_PORT", default = "default_backend_port")]
    pub backend_port: u16,

    /// An ambient addition so `/api/schemas` has somewhere to read `.md`
    /// files from.
    #[serde(rename = "FORMPILOT_SCHEMAS_DIR", default = "default_schemas_dir")]
    pub schemas_dir: String,
}

impl Default for FormPilotConfig {
    fn default() -> Self {
        Self {
            llm_api_endpoint: String::new(),
            llm_api_key: String::new(),
            llm_model_name: default_model_name(),
            llm_request_timeout_sec: default_llm_timeout_sec(),
            session_timeout_sec: default_session_timeout_sec(),
            cors_allowed_origins: default_cors_origins(),
            backend_host: default_backend_host(),
            backend_port: default_backend_port(),
            schemas_dir: default_schemas_dir(),
        }
    }
}

impl FormPilotConfig {
    /// Load configuration: explicit path > `FORMPILOT_CONFIG` env var > no
    /// file at all, in every case layered under the enumerated environment
    /// variables and the built-in defaults. Explicit argument beats env var
    /// beats on-disk default.
    pub fn load(explicit_path: Option<&str>) -> figment::error::Result<Self> {
        let path = explicit_path
            .map(|s| s.to_string())
            .or_else(|| std::env::var("FORMPILOT_CONFIG").ok());

        let mut figment = Figment::from(Serialized::defaults(FormPilotConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::raw()).extract()
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
