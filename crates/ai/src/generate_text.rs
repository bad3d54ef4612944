use ollamate_shared::{AppEnv, AppError, Message};

use crate::chat;

/// One-shot completion of `prompt`, optionally steered by a system prompt.
pub async fn generate_text(
  env: &AppEnv,
  prompt: &str,
  system: Option<&str>,
) -> Result<String, AppError> {
  let mut messages = Vec::with_capacity(2);
  if let Some(system) = system {
    messages.push(Message::system(system));
  }
  messages.push(Message::user(prompt));

  chat(env, &messages).await
}
