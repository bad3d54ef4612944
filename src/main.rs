use clap::Parser;
use ollamate_shared::{APP_ENV, AppError};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use crate::cli::{Cli, run};

#[tokio::main]
async fn main() -> Result<(), AppError> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
          "{}=info,ollamate_ai=info,ollamate_core=info",
          env!("CARGO_CRATE_NAME")
        )
        .into()
      }),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .with(ErrorLayer::default())
    .init();

  run(Cli::parse(), &APP_ENV).await
}
