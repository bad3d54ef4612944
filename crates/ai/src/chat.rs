use anyhow::anyhow;
use async_openai::types::chat::{
  ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
  ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
  CreateChatCompletionRequestArgs,
};
use ollamate_shared::{AppEnv, AppError, Message, MessageRole};

use crate::client::openai_client;

fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage, AppError> {
  let converted = match message.role {
    MessageRole::System => ChatCompletionRequestMessage::System(
      ChatCompletionRequestSystemMessageArgs::default()
        .content(message.content.as_str())
        .build()?,
    ),
    MessageRole::User => ChatCompletionRequestMessage::User(
      ChatCompletionRequestUserMessageArgs::default()
        .content(message.content.as_str())
        .build()?,
    ),
    MessageRole::Assistant => ChatCompletionRequestMessage::Assistant(
      ChatCompletionRequestAssistantMessageArgs::default()
        .content(message.content.as_str())
        .build()?,
    ),
  };
  Ok(converted)
}

/// Send a conversation to the chat model and return the assistant's reply.
pub async fn chat(env: &AppEnv, messages: &[Message]) -> Result<String, AppError> {
  if messages.is_empty() {
    return Err(anyhow!("chat needs at least one message").into());
  }

  let messages = messages
    .iter()
    .map(to_request_message)
    .collect::<Result<Vec<_>, _>>()?;

  let request = CreateChatCompletionRequestArgs::default()
    .model(&env.ollama_chat_model)
    .messages(messages)
    .build()?;

  tracing::debug!(model = %env.ollama_chat_model, "sending chat completion");

  openai_client(env)
    .chat()
    .create(request)
    .await
    .map(|r| r.choices.into_iter())?
    .filter_map(|c| c.message.content)
    .last()
    .ok_or_else(|| anyhow!("empty message content").into())
}
