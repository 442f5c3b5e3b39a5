//! Environment-driven configuration.
//!
//! All knobs come from the process environment; nothing is read from disk.
//! Missing `GLM_API_KEY` is not an error: the server starts without a
//! completion provider and chat falls back to an explanatory reply.

use std::path::PathBuf;

use secrecy::SecretString;

const DEFAULT_GLM_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";
const DEFAULT_GLM_MODEL: &str = "glm-4-flash";

#[derive(Clone)]
pub struct Config {
    /// Directory for the SQLite database, `~/.studium` by default.
    pub data_dir: PathBuf,
    /// API key for the GLM completion endpoint. `None` disables the provider.
    pub glm_api_key: Option<SecretString>,
    pub glm_base_url: String,
    pub glm_model: String,
}

impl Config {
    /// Read configuration from `STUDIUM_DATA_DIR`, `GLM_API_KEY`,
    /// `GLM_BASE_URL`, and `GLM_MODEL`.
    pub fn from_env() -> Self {
        let glm_api_key = std::env::var("GLM_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        if glm_api_key.is_none() {
            tracing::warn!("GLM_API_KEY not set, chat replies will use the fallback message");
        }

        Self {
            data_dir: resolve_data_dir(),
            glm_api_key,
            glm_base_url: std::env::var("GLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GLM_BASE_URL.to_string()),
            glm_model: std::env::var("GLM_MODEL")
                .unwrap_or_else(|_| DEFAULT_GLM_MODEL.to_string()),
        }
    }

    /// Connection URL for the SQLite database inside `data_dir`.
    pub fn database_url(&self) -> String {
        format!("sqlite://{}/studium.db?mode=rwc", self.data_dir.display())
    }
}

/// Resolve the data directory from `STUDIUM_DATA_DIR`, falling back to
/// `~/.studium`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STUDIUM_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".studium")
}
