use mockito::{Matcher, Server};
use ollamate_ai::{
  RetryPolicy, chat, embed, embed_many, generate_text, generate_with_retry, list_models,
};
use ollamate_shared::{AppEnv, Message};
use serde_json::json;
use std::time::Duration;

fn env_for(server: &Server) -> AppEnv {
  AppEnv {
    ollama_base_url: server.url(),
    ..AppEnv::default()
  }
}

fn chat_body(content: &str) -> String {
  json!({
    "id": "chatcmpl-1",
    "object": "chat.completion",
    "created": 1_700_000_000,
    "model": "llama3.2",
    "choices": [{
      "index": 0,
      "message": { "role": "assistant", "content": content },
      "finish_reason": "stop"
    }],
    "usage": { "prompt_tokens": 5, "completion_tokens": 3, "total_tokens": 8 }
  })
  .to_string()
}

fn embedding_body(vectors: &[(u32, Vec<f32>)]) -> String {
  let data: Vec<_> = vectors
    .iter()
    .map(|(index, embedding)| {
      json!({ "object": "embedding", "index": index, "embedding": embedding })
    })
    .collect();
  json!({
    "object": "list",
    "model": "nomic-embed-text",
    "data": data,
    "usage": { "prompt_tokens": 4, "total_tokens": 4 }
  })
  .to_string()
}

fn unavailable() -> String {
  json!({
    "error": {
      "message": "server busy, please try again",
      "type": "server_error",
      "param": null,
      "code": null
    }
  })
  .to_string()
}

fn bad_request() -> String {
  json!({
    "error": {
      "message": "model \"missing\" not found",
      "type": "invalid_request_error",
      "param": null,
      "code": null
    }
  })
  .to_string()
}

#[tokio::test]
async fn list_models_reads_native_tags() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("GET", "/api/tags")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(
      json!({
        "models": [{
          "name": "llama3.2:latest",
          "model": "llama3.2:latest",
          "modified_at": "2024-10-01T09:30:00.123456789-07:00",
          "size": 2_019_393_189_u64,
          "digest": "a80c4f17acd5",
          "details": {
            "parent_model": "",
            "format": "gguf",
            "family": "llama",
            "families": ["llama"],
            "parameter_size": "3.2B",
            "quantization_level": "Q4_K_M"
          }
        }, {
          "name": "nomic-embed-text:latest",
          "modified_at": "2024-09-12T18:00:00Z",
          "size": 274_302_450_u64,
          "digest": "0a109f422b47"
        }]
      })
      .to_string(),
    )
    .create_async()
    .await;

  let models = list_models(&env_for(&server)).await.unwrap();
  mock.assert_async().await;

  assert_eq!(models.len(), 2);
  assert_eq!(models[0].name, "llama3.2:latest");
  assert_eq!(models[0].size, 2_019_393_189);
  assert_eq!(models[0].details.parameter_size.as_deref(), Some("3.2B"));
  assert_eq!(models[0].modified_at.to_rfc3339(), "2024-10-01T16:30:00.123456789+00:00");
  assert_eq!(models[1].details.family, None);
}

#[tokio::test]
async fn list_models_surfaces_http_errors() {
  let mut server = Server::new_async().await;
  let _mock = server
    .mock("GET", "/api/tags")
    .with_status(500)
    .create_async()
    .await;

  assert!(list_models(&env_for(&server)).await.is_err());
}

#[tokio::test]
async fn generate_text_sends_system_and_user_messages() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("POST", "/v1/chat/completions")
    .match_body(Matcher::AllOf(vec![
      Matcher::PartialJson(json!({ "model": "llama3.2" })),
      Matcher::Regex(r#""role":"system""#.to_owned()),
      Matcher::Regex("Answer in one word.".to_owned()),
      Matcher::Regex("Capital of France\\?".to_owned()),
    ]))
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(chat_body("Paris"))
    .create_async()
    .await;

  let reply = generate_text(
    &env_for(&server),
    "Capital of France?",
    Some("Answer in one word."),
  )
  .await
  .unwrap();

  mock.assert_async().await;
  assert_eq!(reply, "Paris");
}

#[tokio::test]
async fn generate_with_retry_stops_after_policy_attempts() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("POST", "/v1/chat/completions")
    .with_status(400)
    .with_header("content-type", "application/json")
    .with_body(bad_request())
    .expect(3)
    .create_async()
    .await;

  let err = generate_with_retry(
    &env_for(&server),
    "hello",
    None,
    RetryPolicy::new(3, Duration::from_millis(1)),
  )
  .await
  .unwrap_err();

  mock.assert_async().await;
  assert!(err.to_string().starts_with("gave up after 3 attempt(s)"));
}

#[tokio::test]
async fn server_errors_cost_one_request_per_attempt() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("POST", "/v1/chat/completions")
    .with_status(503)
    .with_header("content-type", "application/json")
    .with_body(unavailable())
    .expect(2)
    .create_async()
    .await;

  let result = tokio::time::timeout(
    Duration::from_secs(5),
    generate_with_retry(
      &env_for(&server),
      "hello",
      None,
      RetryPolicy::new(2, Duration::from_millis(1)),
    ),
  )
  .await
  .expect("retry must not outlive its policy");

  mock.assert_async().await;
  assert!(
    result
      .unwrap_err()
      .to_string()
      .starts_with("gave up after 2 attempt(s)")
  );
}

#[tokio::test]
async fn generate_with_retry_recovers_from_a_busy_daemon() {
  let mut server = Server::new_async().await;
  // The first mock answers until its hit count is reached, then the second takes over
  let busy = server
    .mock("POST", "/v1/chat/completions")
    .with_status(503)
    .with_header("content-type", "application/json")
    .with_body(unavailable())
    .expect(2)
    .create_async()
    .await;
  let ok = server
    .mock("POST", "/v1/chat/completions")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(chat_body("Hello there"))
    .expect(1)
    .create_async()
    .await;

  let reply = tokio::time::timeout(
    Duration::from_secs(5),
    generate_with_retry(
      &env_for(&server),
      "hello",
      None,
      RetryPolicy::new(3, Duration::from_millis(1)),
    ),
  )
  .await
  .expect("retry must not outlive its policy")
  .unwrap();

  busy.assert_async().await;
  ok.assert_async().await;
  assert_eq!(reply, "Hello there");
}

#[tokio::test]
async fn chat_sends_the_whole_history_in_order() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("POST", "/v1/chat/completions")
    .match_body(Matcher::AllOf(vec![
      Matcher::Regex(r#""role":"assistant""#.to_owned()),
      Matcher::Regex(r#""Be terse\.".*"Hi".*"Hello!".*"Name a colour""#.to_owned()),
    ]))
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(chat_body("Teal"))
    .create_async()
    .await;

  let history = vec![
    Message::system("Be terse."),
    Message::user("Hi"),
    Message::assistant("Hello!"),
    Message::user("Name a colour"),
  ];
  let reply = chat(&env_for(&server), &history).await.unwrap();

  mock.assert_async().await;
  assert_eq!(reply, "Teal");
}

#[tokio::test]
async fn chat_rejects_an_empty_history() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("POST", "/v1/chat/completions")
    .expect(0)
    .create_async()
    .await;

  let err = chat(&env_for(&server), &[]).await.unwrap_err();

  mock.assert_async().await;
  assert_eq!(err.to_string(), "chat needs at least one message");
}

#[tokio::test]
async fn embed_returns_the_vector() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("POST", "/v1/embeddings")
    .match_body(Matcher::PartialJson(json!({ "model": "nomic-embed-text" })))
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(embedding_body(&[(0, vec![0.25, -0.5, 1.0])]))
    .create_async()
    .await;

  let vector = embed(&env_for(&server), "a cat").await.unwrap();

  mock.assert_async().await;
  assert_eq!(vector, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn embed_many_restores_input_order() {
  let mut server = Server::new_async().await;
  let _mock = server
    .mock("POST", "/v1/embeddings")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(embedding_body(&[(1, vec![0.0, 1.0]), (0, vec![1.0, 0.0])]))
    .create_async()
    .await;

  let inputs = vec!["first".to_owned(), "second".to_owned()];
  let vectors = embed_many(&env_for(&server), &inputs).await.unwrap();

  assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn embed_many_rejects_count_mismatch() {
  let mut server = Server::new_async().await;
  let _mock = server
    .mock("POST", "/v1/embeddings")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(embedding_body(&[(0, vec![1.0, 0.0])]))
    .create_async()
    .await;

  let inputs = vec!["first".to_owned(), "second".to_owned()];
  let err = embed_many(&env_for(&server), &inputs).await.unwrap_err();

  assert!(err.to_string().contains("expected 2, got 1"));
}

#[tokio::test]
async fn embed_many_skips_the_request_for_no_inputs() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("POST", "/v1/embeddings")
    .expect(0)
    .create_async()
    .await;

  let vectors = embed_many(&env_for(&server), &[]).await.unwrap();

  mock.assert_async().await;
  assert!(vectors.is_empty());
}
