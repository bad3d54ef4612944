mod client;

mod chat;
pub use chat::chat;

mod embed;
pub use embed::embed;

mod embed_many;
pub use embed_many::embed_many;

mod generate_text;
pub use generate_text::generate_text;

mod list_models;
pub use list_models::{ModelDetails, ModelInfo, list_models};

mod retry;
pub use retry::{RetryPolicy, generate_with_retry, retry};
