//! Conversation state and the chat-completion seam.
//!
//! A [`Conversation`] is an append-only log of turns whose first entry is
//! always the system instruction. [`reply`] is the only place turns are
//! appended during an interaction.

mod openai;

pub use openai::OpenAIChat;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Session-scoped conversation history.
#[derive(Debug, Clone)]
pub struct Conversation {
    system_prompt: String,
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    /// Start a conversation holding only the system instruction.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        Self {
            turns: vec![ConversationTurn::system(system_prompt.clone())],
            system_prompt,
        }
    }

    /// All turns, system instruction first.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Mutable access for callers that edit history directly.
    ///
    /// The system turn is restored by [`Conversation::ensure_system_turn`] at
    /// the start of the next interaction.
    pub fn turns_mut(&mut self) -> &mut Vec<ConversationTurn> {
        &mut self.turns
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Make the first turn the canonical system instruction again.
    pub fn ensure_system_turn(&mut self) {
        match self.turns.first_mut() {
            Some(first) if first.role == Role::System => {
                if first.content != self.system_prompt {
                    first.content = self.system_prompt.clone();
                }
            }
            _ => self
                .turns
                .insert(0, ConversationTurn::system(self.system_prompt.clone())),
        }
    }

    /// Drop everything except the system instruction.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.turns
            .push(ConversationTurn::system(self.system_prompt.clone()));
    }

    /// Most recent assistant reply, if any.
    pub fn last_reply(&self) -> Option<&ConversationTurn> {
        self.turns.iter().rev().find(|t| t.role == Role::Assistant)
    }

    fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    fn pop_if(&mut self, role: Role) {
        if self.turns.last().is_some_and(|t| t.role == role) {
            self.turns.pop();
        }
    }
}

/// Trait for chat-completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the full message list and return the assistant's text.
    async fn complete(&self, turns: &[ConversationTurn]) -> Result<String>;
}

/// Append `user_content` as a user turn, ask the model, and append its reply.
///
/// On failure the pending user turn is removed again and the error returned.
#[instrument(skip_all, fields(turns = conversation.len()))]
pub async fn reply(
    model: &dyn ChatModel,
    conversation: &mut Conversation,
    user_content: &str,
) -> Result<ConversationTurn> {
    conversation.ensure_system_turn();
    conversation.push(ConversationTurn::user(user_content));

    match model.complete(conversation.turns()).await {
        Ok(text) => {
            let turn = ConversationTurn::assistant(text);
            conversation.push(turn.clone());
            debug!("Conversation now has {} turns", conversation.len());
            Ok(turn)
        }
        Err(e) => {
            conversation.pop_if(Role::User);
            Err(e)
        }
    }
}
