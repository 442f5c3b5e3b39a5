//! Application state wiring all services together.
//!
//! `AppState` holds the concrete service instances used by the REST API
//! and WebSocket handlers. The chat service is generic over repository and
//! provider traits, but `AppState` pins it to the infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use studium_core::chat::service::ChatService;
use studium_core::presence::PresenceEngine;
use studium_infra::config::Config;
use studium_infra::llm::GlmProvider;
use studium_infra::sqlite::pool::DatabasePool;
use studium_infra::sqlite::SqliteChatRepository;

/// Concrete type alias for the chat service pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteChatRepository, GlmProvider>;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub presence: Arc<PresenceEngine>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the DB, wire services.
    pub async fn init(config: &Config) -> anyhow::Result<Self> {
        // Ensure data directory exists
        tokio::fs::create_dir_all(&config.data_dir).await?;

        let db_pool = DatabasePool::new(&config.database_url()).await?;

        let provider = config
            .glm_api_key
            .as_ref()
            .map(|key| GlmProvider::new(key, &config.glm_base_url, &config.glm_model));

        let chat_repo = SqliteChatRepository::new(db_pool.clone());
        let chat_service = ChatService::new(chat_repo, provider);

        Ok(Self {
            chat_service: Arc::new(chat_service),
            presence: Arc::new(PresenceEngine::new()),
            data_dir: config.data_dir.clone(),
            db_pool,
        })
    }
}
