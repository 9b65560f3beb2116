//! OpenAI chat-completion implementation.

use super::{ChatModel, ConversationTurn, Role};
use crate::config::ChatSettings;
use crate::error::{Result, VidqaError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat model backed by the OpenAI chat-completions API.
pub struct OpenAIChat {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChat {
    /// Create a chat client for the given model and temperature.
    pub fn new(model: &str, temperature: f32) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            temperature,
        })
    }

    /// Create a chat client from the `[chat]` settings.
    pub fn from_settings(settings: &ChatSettings) -> Result<Self> {
        Self::new(&settings.model, settings.temperature)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Convert a conversation turn into an API message.
fn to_request_message(turn: &ConversationTurn) -> Result<ChatCompletionRequestMessage> {
    let message = match turn.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(turn.content.clone())
            .build()
            .map_err(|e| VidqaError::Chat(e.to_string()))?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(turn.content.clone())
            .build()
            .map_err(|e| VidqaError::Chat(e.to_string()))?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(turn.content.clone())
            .build()
            .map_err(|e| VidqaError::Chat(e.to_string()))?
            .into(),
    };
    Ok(message)
}

#[async_trait]
impl ChatModel for OpenAIChat {
    #[instrument(skip(self, turns), fields(model = %self.model, messages = turns.len()))]
    async fn complete(&self, turns: &[ConversationTurn]) -> Result<String> {
        let messages = turns
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| VidqaError::Chat(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| VidqaError::Chat(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| VidqaError::Chat("Empty response from model".to_string()))?;

        debug!("Received {} chars from model", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_convert_to_matching_message_kinds() {
        let system = to_request_message(&ConversationTurn::system("s")).unwrap();
        let user = to_request_message(&ConversationTurn::user("u")).unwrap();
        let assistant = to_request_message(&ConversationTurn::assistant("a")).unwrap();

        assert!(matches!(system, ChatCompletionRequestMessage::System(_)));
        assert!(matches!(user, ChatCompletionRequestMessage::User(_)));
        assert!(matches!(assistant, ChatCompletionRequestMessage::Assistant(_)));
    }

    #[test]
    fn test_from_settings() {
        let chat = OpenAIChat::from_settings(&ChatSettings::default()).unwrap();
        assert_eq!(chat.model(), "gpt-4o-mini");
    }
}
