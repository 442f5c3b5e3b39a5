//! SQLite persistence layer.

pub mod chat;
pub mod pool;

pub use chat::SqliteChatRepository;
pub use pool::DatabasePool;
