//! Prompt improvement via a single model call.
//!
//! Wraps the user's prompt in a rewriting instruction, sends it through the
//! same fan-out core to one model, and extracts the improved prompt from the
//! reply text. Models wrap their answer in code fences or a label often
//! enough that the extraction strips both.

use std::time::Duration;

use crate::dispatch::dispatch;
use crate::models::ModelConfig;

/// Instruction prepended to the user's prompt.
const IMPROVE_INSTRUCTION: &str = "You are a prompt engineer. Rewrite the following prompt to be \
clearer, more specific, and more likely to produce a high-quality answer. Keep the original \
language and intent. Return only the improved prompt, with no commentary.";

/// Ask one model to improve a prompt.
///
/// Returns the extracted improved prompt, or an error when the model call
/// fails (the per-call failure taxonomy is flattened into the error message).
pub async fn improve_prompt(
    prompt: &str,
    model: &ModelConfig,
    timeout: Duration,
) -> anyhow::Result<String> {
    let meta_prompt = format!("{}\n\n{}", IMPROVE_INSTRUCTION, prompt);

    let batch = dispatch(&meta_prompt, std::slice::from_ref(model), timeout).await;
    let outcome = batch
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Dispatch returned an empty batch"))?;

    if !outcome.success {
        anyhow::bail!(
            "{} could not improve the prompt: {}",
            outcome.model_name,
            outcome.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    Ok(extract_improved(&outcome.response))
}

/// Pull the improved prompt out of a model reply.
///
/// Strips a surrounding code fence and a leading "Improved prompt:" style
/// label; everything else is returned trimmed, as-is.
pub fn extract_improved(reply: &str) -> String {
    let mut text = reply.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the opening fence line (it may carry a language tag)
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
        text = text.trim_end().trim_end_matches("```").trim_end();
    }

    let lowered = text.to_lowercase();
    for label in ["improved prompt:", "improved:"] {
        if lowered.starts_with(label) {
            text = text[label.len()..].trim_start();
            break;
        }
    }

    text.trim().to_string()
}

// =============================================================================
// Tests
// =============================================================================
