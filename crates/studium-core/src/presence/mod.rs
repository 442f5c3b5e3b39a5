//! Real-time presence and room broadcast.
//!
//! The presence engine tracks which connections exist, who they are, and
//! which room they occupy, and fans membership/chat events out to every
//! connection in the affected room. State lives entirely in memory and is
//! scoped to the process lifetime; it is rebuilt from scratch after a
//! restart as clients reconnect.

pub mod engine;
pub mod registry;
pub mod rooms;

pub use engine::PresenceEngine;
