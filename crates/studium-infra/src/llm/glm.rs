//! GLM completion provider over the OpenAI-compatible API.
//!
//! Talks to the Zhipu endpoint (`https://open.bigmodel.cn/api/paas/v4`)
//! using [`async_openai`] for type-safe request/response handling. One
//! request, one response; the service layer owns the deadline.

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use async_openai::Client;
use secrecy::{ExposeSecret, SecretString};

use studium_core::llm::CompletionProvider;
use studium_types::error::CompletionError;
use studium_types::llm::{CompletionRequest, CompletionResponse, MessageRole};

/// GLM-backed implementation of `CompletionProvider`.
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct GlmProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GlmProvider {
    pub fn new(api_key: &SecretString, base_url: &str, model: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(base_url);

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic
    /// [`CompletionRequest`].
    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        if let Some(ref system) = request.system {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(system.clone()),
                    name: None,
                },
            ));
        }

        for msg in &request.messages {
            let oai_msg = match msg.role {
                MessageRole::System => {
                    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                        content: ChatCompletionRequestSystemMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    })
                }
                MessageRole::User => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                        name: None,
                    })
                }
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                        content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                            msg.content.clone(),
                        )),
                        refusal: None,
                        name: None,
                        audio: None,
                        tool_calls: None,
                        function_call: None,
                    })
                }
            };
            messages.push(oai_msg);
        }

        // Use the model from the request if set, otherwise the configured one
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        }
    }
}

impl CompletionProvider for GlmProvider {
    fn name(&self) -> &str {
        "glm"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let oai_request = self.build_request(request);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(|e| CompletionError::Service(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| {
                CompletionError::Malformed("response carried no message content".to_string())
            })?;

        Ok(CompletionResponse {
            content,
            model: response.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studium_types::llm::Message;

    fn provider() -> GlmProvider {
        GlmProvider::new(
            &SecretString::from("test-key"),
            "https://open.bigmodel.cn/api/paas/v4",
            "glm-4-flash",
        )
    }

    #[test]
    fn test_build_request_prepends_system() {
        let request = CompletionRequest {
            model: String::new(),
            messages: vec![Message {
                role: MessageRole::User,
                content: "hello".to_string(),
            }],
            system: Some("be concise".to_string()),
            max_tokens: 1500,
            temperature: Some(0.7),
        };

        let built = provider().build_request(&request);
        assert_eq!(built.model, "glm-4-flash");
        assert_eq!(built.messages.len(), 2);
        assert!(matches!(
            built.messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        assert_eq!(built.max_completion_tokens, Some(1500));
    }

    #[test]
    fn test_build_request_honors_explicit_model() {
        let request = CompletionRequest {
            model: "glm-4-plus".to_string(),
            messages: vec![],
            system: None,
            max_tokens: 100,
            temperature: None,
        };

        let built = provider().build_request(&request);
        assert_eq!(built.model, "glm-4-plus");
        assert!(built.temperature.is_none());
    }
}
