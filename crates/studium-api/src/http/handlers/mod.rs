//! HTTP request handlers for the REST API.

pub mod chat;
pub mod session;
pub mod ws;
