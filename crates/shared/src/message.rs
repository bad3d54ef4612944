use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
  System,
  User,
  Assistant,
}

impl fmt::Display for MessageRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::System => "system",
      Self::User => "user",
      Self::Assistant => "assistant",
    })
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
  pub role: MessageRole,
  pub content: String,
}

impl Message {
  pub fn system(content: impl Into<String>) -> Self {
    Self {
      role: MessageRole::System,
      content: content.into(),
    }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self {
      role: MessageRole::User,
      content: content.into(),
    }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self {
      role: MessageRole::Assistant,
      content: content.into(),
    }
  }
}
