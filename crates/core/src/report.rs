use std::fmt::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_humanize::HumanTime;
use ollamate_ai::ModelInfo;
use ollamate_shared::Message;

use crate::compare::Comparison;

/// Longest label shown in a similarity table header before it is cut.
const LABEL_WIDTH: usize = 24;

/// One request/response round trip with the chat model.
#[derive(Debug, Clone)]
pub struct Exchange {
  pub model: String,
  pub messages: Vec<Message>,
  pub response: String,
  pub elapsed: Duration,
}

/// Bytes as a short human-readable size (`1.88 GB`, `261.6 MB`, ...).
#[must_use]
pub fn format_size(bytes: u64) -> String {
  const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

  if bytes < 1024 {
    return format!("{bytes} B");
  }

  let mut value = bytes as f64 / 1024.0;
  let mut unit = 0;
  while value >= 1024.0 && unit < UNITS.len() - 1 {
    value /= 1024.0;
    unit += 1;
  }

  if value >= 100.0 {
    format!("{value:.1} {}", UNITS[unit])
  } else {
    format!("{value:.2} {}", UNITS[unit])
  }
}

fn truncate_label(text: &str) -> String {
  let text = text.replace(['\n', '|'], " ");
  if text.chars().count() <= LABEL_WIDTH {
    text
  } else {
    let cut: String = text.chars().take(LABEL_WIDTH - 1).collect();
    format!("{cut}…")
  }
}

fn or_dash(value: Option<&str>) -> &str {
  value.filter(|v| !v.is_empty()).unwrap_or("-")
}

#[must_use]
pub fn format_models(models: &[ModelInfo]) -> String {
  format_models_at(models, Utc::now())
}

/// [`format_models`] with a fixed "now" for the relative modified times.
#[must_use]
pub fn format_models_at(models: &[ModelInfo], now: DateTime<Utc>) -> String {
  let mut out = String::new();

  let _ = writeln!(out, "## Models");
  if models.is_empty() {
    let _ = writeln!(out, "No models installed.");
    return out.trim_end().to_string();
  }

  let _ = writeln!(
    out,
    "| Name | Size | Modified | Family | Parameters | Quantization |"
  );
  let _ = writeln!(out, "|---|---:|---|---|---|---|");

  for model in models {
    let modified = HumanTime::from(model.modified_at.signed_duration_since(now));
    let _ = writeln!(
      out,
      "| {} | {} | {modified} | {} | {} | {} |",
      model.name,
      format_size(model.size),
      or_dash(model.details.family.as_deref()),
      or_dash(model.details.parameter_size.as_deref()),
      or_dash(model.details.quantization_level.as_deref()),
    );
  }

  let total: u64 = models.iter().map(|m| m.size).sum();
  let _ = writeln!(
    out,
    "\n**Total:** {} model{}, {}",
    models.len(),
    if models.len() == 1 { "" } else { "s" },
    format_size(total)
  );

  out.trim_end().to_string()
}

#[must_use]
pub fn format_exchange(exchange: &Exchange) -> String {
  let mut out = String::new();

  let _ = writeln!(out, "## {}", exchange.model);
  let _ = writeln!(
    out,
    "**Elapsed:** {:.2}s\n",
    exchange.elapsed.as_secs_f64()
  );

  // ── Conversation ──
  let _ = writeln!(out, "### Prompt");
  for msg in &exchange.messages {
    let _ = writeln!(out, "- {}: \"{}\"", msg.role, msg.content);
  }
  let _ = writeln!(out);

  // ── Response ──
  let _ = writeln!(out, "### Response");
  let _ = writeln!(out, "{}", exchange.response.trim());

  out.trim_end().to_string()
}

/// Embedding vector summary: dimensions, norm and a short preview.
#[must_use]
pub fn format_embedding(model: &str, text: &str, vector: &[f32]) -> String {
  const PREVIEW: usize = 8;

  let mut out = String::new();
  let norm = vector
    .iter()
    .map(|&x| f64::from(x) * f64::from(x))
    .sum::<f64>()
    .sqrt();

  let _ = writeln!(out, "## Embedding");
  let _ = writeln!(out, "**Model:** {model}");
  let _ = writeln!(out, "**Text:** \"{text}\"");
  let _ = writeln!(out, "**Dimensions:** {}", vector.len());
  let _ = writeln!(out, "**Norm:** {norm:.4}");

  let preview = vector
    .iter()
    .take(PREVIEW)
    .map(|x| format!("{x:.4}"))
    .collect::<Vec<_>>()
    .join(", ");
  let ellipsis = if vector.len() > PREVIEW { ", …" } else { "" };
  let _ = writeln!(out, "**Values:** [{preview}{ellipsis}]");

  out.trim_end().to_string()
}

#[must_use]
pub fn format_similarity(comparison: &Comparison) -> String {
  let mut out = String::new();

  let _ = writeln!(out, "## Similarity");
  if comparison.matrix().is_empty() {
    let _ = writeln!(out, "Nothing to compare.");
    return out.trim_end().to_string();
  }

  let labels: Vec<String> = comparison
    .texts()
    .iter()
    .map(|t| truncate_label(t))
    .collect();

  let _ = write!(out, "| |");
  for label in &labels {
    let _ = write!(out, " {label} |");
  }
  let _ = writeln!(out);
  let _ = writeln!(out, "|---|{}", "---:|".repeat(labels.len()));

  for (label, row) in labels.iter().zip(comparison.matrix().rows()) {
    let _ = write!(out, "| **{label}** |");
    for score in row {
      let _ = write!(out, " {score:.4} |");
    }
    let _ = writeln!(out);
  }

  if let Some((a, b, score)) = comparison.most_similar() {
    let _ = writeln!(
      out,
      "\n**Most similar:** \"{}\" ↔ \"{}\" ({score:.4})",
      truncate_label(a),
      truncate_label(b)
    );
  }

  out.trim_end().to_string()
}
