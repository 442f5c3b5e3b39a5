//! LLM request/response types.
//!
//! These model the data shapes exchanged with a completion provider:
//! the conversation sent out and the single reply that comes back.
//! Unlike stored turns ([`crate::chat::TurnRole`]), request messages may
//! carry a `system` role for the instruction prompt.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chat::TurnRole;

/// Role of a message in a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl From<TurnRole> for MessageRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        }
    }
}

/// A single message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// Request to a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier. An empty string means "use the provider's
    /// configured default model".
    pub model: String,
    pub messages: Vec<Message>,
    /// System instruction, sent as the leading system message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Response from a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    /// Model that actually served the request.
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_from_turn_role() {
        assert_eq!(MessageRole::from(TurnRole::User), MessageRole::User);
        assert_eq!(
            MessageRole::from(TurnRole::Assistant),
            MessageRole::Assistant
        );
    }

    #[test]
    fn test_request_skips_absent_fields() {
        let request = CompletionRequest {
            model: String::new(),
            messages: Vec::new(),
            system: None,
            max_tokens: 1500,
            temperature: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("system"));
        assert!(!json.contains("temperature"));
    }
}
