//! Chat sessions: durable per-session history, bounded retention, and
//! the send orchestration that feeds the completion provider.

pub mod formatting;
pub mod repository;
pub mod retention;
pub mod service;
pub mod title;

#[cfg(test)]
pub(crate) mod test_repo;
