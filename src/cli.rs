use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use ollamate_ai::{RetryPolicy, chat, embed, generate_with_retry, list_models};
use ollamate_core::{
  DaemonEmbedder, Exchange, compare_texts, compare_texts_batched, format_embedding,
  format_exchange, format_models, format_similarity,
};
use ollamate_shared::{AppEnv, AppError, Message, MessageRole};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Talk to a local model daemon.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// List installed models.
  Models,
  /// Complete a single prompt, retrying on failure.
  Generate(GenerateArgs),
  /// Interactive chat; an empty line or EOF ends the session.
  Chat(ChatArgs),
  /// Embed one text and summarize the vector.
  Embed(EmbedArgs),
  /// Embed several texts and print their pairwise cosine similarity.
  Similarity(SimilarityArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
  prompt: String,
  #[arg(long)]
  system: Option<String>,
  /// Override the chat model.
  #[arg(long)]
  model: Option<String>,
  /// Total attempts, including the first.
  #[arg(long)]
  attempts: Option<u32>,
  /// Pause between attempts, in milliseconds.
  #[arg(long)]
  delay_ms: Option<u64>,
}

#[derive(Debug, Args)]
struct ChatArgs {
  #[arg(long)]
  system: Option<String>,
  #[arg(long)]
  model: Option<String>,
}

#[derive(Debug, Args)]
struct EmbedArgs {
  text: String,
  /// Override the embedding model.
  #[arg(long)]
  model: Option<String>,
}

#[derive(Debug, Args)]
struct SimilarityArgs {
  #[arg(required = true)]
  texts: Vec<String>,
  #[arg(long)]
  model: Option<String>,
  /// Embed all texts in a single request instead of one request per text.
  #[arg(long)]
  batch: bool,
}

fn with_chat_model(env: &AppEnv, model: Option<String>) -> AppEnv {
  let mut env = env.clone();
  if let Some(model) = model {
    env.ollama_chat_model = model;
  }
  env
}

fn with_embedding_model(env: &AppEnv, model: Option<String>) -> AppEnv {
  let mut env = env.clone();
  if let Some(model) = model {
    env.ollama_embedding_model = model;
  }
  env
}

pub async fn run(cli: Cli, env: &AppEnv) -> Result<(), AppError> {
  match cli.command {
    Command::Models => {
      let models = list_models(env).await?;
      println!("{}", format_models(&models));
    }
    Command::Generate(args) => generate(env, args).await?,
    Command::Chat(args) => chat_session(env, args).await?,
    Command::Embed(args) => {
      let env = with_embedding_model(env, args.model);
      let vector = embed(&env, &args.text).await?;
      println!(
        "{}",
        format_embedding(&env.ollama_embedding_model, &args.text, &vector)
      );
    }
    Command::Similarity(args) => {
      let env = with_embedding_model(env, args.model);
      let comparison = if args.batch {
        compare_texts_batched(&env, &args.texts).await?
      } else {
        compare_texts(&DaemonEmbedder::new(&env), &args.texts).await?
      };
      println!("{}", format_similarity(&comparison));
    }
  }
  Ok(())
}

async fn generate(env: &AppEnv, args: GenerateArgs) -> Result<(), AppError> {
  let env = with_chat_model(env, args.model);
  let mut policy = RetryPolicy::from_env(&env);
  if let Some(attempts) = args.attempts {
    policy.attempts = attempts;
  }
  if let Some(delay_ms) = args.delay_ms {
    policy.delay = Duration::from_millis(delay_ms);
  }

  let started = Instant::now();
  let response = generate_with_retry(&env, &args.prompt, args.system.as_deref(), policy).await?;

  let mut messages = Vec::with_capacity(2);
  if let Some(system) = args.system {
    messages.push(Message::system(system));
  }
  messages.push(Message::user(args.prompt));

  println!(
    "{}",
    format_exchange(&Exchange {
      model: env.ollama_chat_model.clone(),
      messages,
      response,
      elapsed: started.elapsed(),
    })
  );
  Ok(())
}

async fn chat_session(env: &AppEnv, args: ChatArgs) -> Result<(), AppError> {
  let env = with_chat_model(env, args.model);
  let mut history = Vec::new();
  if let Some(system) = args.system {
    history.push(Message::system(system));
  }

  let mut stdout = tokio::io::stdout();
  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  loop {
    stdout.write_all(b"> ").await?;
    stdout.flush().await?;

    let Some(line) = lines.next_line().await? else {
      break;
    };
    let line = line.trim();
    if line.is_empty() {
      break;
    }

    history.push(Message::user(line));
    let started = Instant::now();
    let reply = match chat(&env, &history).await {
      Ok(reply) => reply,
      Err(err) => {
        // keep the session usable; drop the unanswered turn
        history.pop();
        tracing::error!(error = %err, "chat request failed");
        continue;
      }
    };
    tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "chat reply");

    println!("{}\n", reply.trim());
    history.push(Message::assistant(reply));
  }

  let turns = history
    .iter()
    .filter(|m| m.role == MessageRole::Assistant)
    .count();
  tracing::info!(turns, "chat session ended");
  Ok(())
}
