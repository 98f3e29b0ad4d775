//! Concurrent fan-out of one prompt to many models.
//!
//! [`dispatch`] issues one call per model concurrently, applies the same
//! per-call timeout to each, and captures every outcome - success, typed
//! failure, or panic - independently. The returned batch always has one
//! [`CallOutcome`] per input model, in input order, so callers can zip
//! outcomes back to their configs by position. Nothing is retried, and no
//! single model can abort its siblings or the batch.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::credentials;
use crate::models::ModelConfig;
use crate::providers::{self, ProviderClient, Reply, SendError};

// =============================================================================
// Outcome
// =============================================================================

/// Result of one model call within a fan-out batch.
///
/// Constructed exactly once per model per dispatch and never mutated after.
/// `error` is present iff `success` is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallOutcome {
    /// Database id of the originating model config.
    pub model_id: i64,
    /// Display name of the originating model config.
    pub model_name: String,
    /// The prompt that was sent.
    pub prompt_text: String,
    /// Response text; empty on failure.
    pub response: String,
    /// Provider-reported token usage, 0 if unavailable.
    pub tokens: u32,
    /// Whether the call produced a usable response.
    pub success: bool,
    /// Failure description when `success` is false.
    pub error: Option<String>,
}

impl CallOutcome {
    fn ok(model: &ModelConfig, prompt: &str, reply: Reply) -> Self {
        Self {
            model_id: model.id,
            model_name: model.name.clone(),
            prompt_text: prompt.to_string(),
            response: reply.content,
            tokens: reply.tokens,
            success: true,
            error: None,
        }
    }

    fn failed(model: &ModelConfig, prompt: &str, error: String) -> Self {
        Self {
            model_id: model.id,
            model_name: model.name.clone(),
            prompt_text: prompt.to_string(),
            response: String::new(),
            tokens: 0,
            success: false,
            error: Some(error),
        }
    }
}

// =============================================================================
// Fan-out dispatcher
// =============================================================================

/// Send a prompt to every model in the list concurrently.
///
/// Credentials are resolved from the environment by each config's
/// `api_key_env` name; a missing credential becomes a `NotConfigured`
/// outcome without any network I/O.
pub async fn dispatch(
    prompt: &str,
    models: &[ModelConfig],
    timeout: Duration,
) -> Vec<CallOutcome> {
    credentials::init();

    let clients = models
        .iter()
        .map(|model| {
            let api_key = credentials::resolve(&model.api_key_env).unwrap_or_default();
            providers::client_for(model, api_key)
        })
        .collect();

    dispatch_clients(prompt, models, clients, timeout).await
}

/// Fan out over pre-built clients, one per model, index-aligned.
///
/// This is the seam the tests drive with deterministic mock clients;
/// [`dispatch`] delegates here after resolving real adapters.
pub async fn dispatch_clients(
    prompt: &str,
    models: &[ModelConfig],
    clients: Vec<Box<dyn ProviderClient>>,
    timeout: Duration,
) -> Vec<CallOutcome> {
    debug_assert_eq!(models.len(), clients.len());
    info!(
        model_count = models.len(),
        timeout_secs = timeout.as_secs(),
        "Dispatching prompt to models"
    );

    let calls = models.iter().zip(clients).map(|(model, client)| {
        // Each call is isolated: a panic inside an adapter is captured and
        // turned into a failed outcome for that model only.
        AssertUnwindSafe(call_one(model, client, prompt, timeout)).catch_unwind()
    });

    let settled = join_all(calls).await;

    models
        .iter()
        .zip(settled)
        .map(|(model, result)| match result {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload);
                warn!(model = %model.name, error = %message, "Model call panicked");
                CallOutcome::failed(model, prompt, message)
            }
        })
        .collect()
}

/// Drive one adapter call to an outcome. Never returns an error.
async fn call_one(
    model: &ModelConfig,
    client: Box<dyn ProviderClient>,
    prompt: &str,
    timeout: Duration,
) -> CallOutcome {
    // Checked up front so an unconfigured model costs no network I/O.
    if !client.is_configured() {
        warn!(model = %model.name, key = %model.api_key_env, "API key not configured");
        return CallOutcome::failed(model, prompt, SendError::NotConfigured.to_string());
    }

    match client.send(prompt, timeout).await {
        Ok(reply) => {
            info!(model = %model.name, tokens = reply.tokens, "Model responded");
            CallOutcome::ok(model, prompt, reply)
        }
        Err(e) => {
            warn!(model = %model.name, error = %e, "Model call failed");
            CallOutcome::failed(model, prompt, e.to_string())
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "model call panicked".to_string()
    }
}

// =============================================================================
// Synchronous facade
// =============================================================================

/// Blocking wrapper around [`dispatch`] for callers that are not async.
///
/// Builds a private current-thread runtime and drives the fan-out to
/// completion, returning once every model has an outcome. Callers with an
/// interactive thread (a GUI event loop) are expected to invoke this from a
/// worker thread.
pub fn dispatch_blocking(
    prompt: &str,
    models: &[ModelConfig],
    timeout: Duration,
) -> anyhow::Result<Vec<CallOutcome>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(dispatch(prompt, models, timeout)))
}

// =============================================================================
// Tests
// =============================================================================
