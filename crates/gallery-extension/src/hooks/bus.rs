//! Event bus — runs the interceptor chain around a core operation.
//!
//! `trigger` executes, strictly in sequence:
//!
//! 1. The before-chain. Each handler receives the previous handler's input.
//!    A handler returning [`BeforeOutcome::Stop`] ends the before-chain and
//!    the core operation is skipped.
//! 2. The core operation, fed with the final input (unless stopped).
//! 3. The after-chain. Every handler sees the same final input and the
//!    running output; the last output is returned.
//!
//! Any error (handler, core operation, or value conversion) aborts the chain
//! and is returned to the caller unchanged.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use gallery_core::AppResult;

use super::definitions::{AfterData, BeforeOutcome, HookPoint};
use super::registry::{AfterHandler, HookRegistry};

/// Dispatches hook points to the handlers registered in a [`HookRegistry`].
#[derive(Debug, Clone)]
pub struct EventBus {
    registry: Arc<HookRegistry>,
}

impl EventBus {
    /// Creates a new event bus over a hook registry.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Runs `operation` wrapped by the handlers registered for `hook`.
    ///
    /// Handler registrations made while this call is in flight do not affect
    /// it: the chain is captured once, at entry.
    pub async fn trigger<I, O, F, Fut>(&self, hook: &HookPoint, input: I, operation: F) -> AppResult<O>
    where
        I: Serialize + DeserializeOwned + Send,
        O: Serialize + DeserializeOwned + Send,
        F: FnOnce(I) -> Fut + Send,
        Fut: Future<Output = AppResult<O>> + Send,
    {
        let chain = self.registry.snapshot(hook).await;

        if chain.is_empty() {
            return operation(input).await;
        }

        debug!(
            hook = %hook,
            before = chain.before.len(),
            after = chain.after.len(),
            "Triggering hook"
        );

        if chain.before.is_empty() {
            let input_value = serde_json::to_value(&input)?;
            let output = operation(input).await?;
            let output_value = serde_json::to_value(&output)?;
            let result = run_after(hook, &chain.after, input_value, output_value).await?;
            return Ok(serde_json::from_value(result)?);
        }

        let mut current = serde_json::to_value(&input)?;
        let mut stopped = None;

        for (position, handler) in chain.before.iter().enumerate() {
            match handler.before(current.clone()).await? {
                BeforeOutcome::Continue(next) => current = next,
                BeforeOutcome::Stop(output) => {
                    debug!(hook = %hook, position, "Before-handler stopped propagation");
                    stopped = Some(output);
                    break;
                }
            }
        }

        let output_value = match stopped {
            Some(output) => output,
            None => {
                let final_input: I = serde_json::from_value(current.clone())?;
                let output = operation(final_input).await?;
                if chain.after.is_empty() {
                    return Ok(output);
                }
                serde_json::to_value(&output)?
            }
        };

        let result = run_after(hook, &chain.after, current, output_value).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}

async fn run_after(
    hook: &HookPoint,
    handlers: &[Arc<dyn AfterHandler>],
    input: Value,
    mut output: Value,
) -> AppResult<Value> {
    for handler in handlers {
        output = handler
            .after(AfterData {
                input: input.clone(),
                output,
            })
            .await?;
    }
    debug!(hook = %hook, handlers = handlers.len(), "After-chain complete");
    Ok(output)
}
