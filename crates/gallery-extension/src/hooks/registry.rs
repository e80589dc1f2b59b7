//! Hook registry — extensions register before/after handlers per hook point.
//!
//! Handlers of one `(hook, phase)` pair run in registration order. Each
//! registration gets a sequence number that only grows until the registry is
//! cleared, so removing an extension's handlers never reorders the remaining
//! ones.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use gallery_core::AppResult;

use super::definitions::{AfterData, BeforeOutcome, HookPhase, HookPoint};

/// Handler running before the core operation.
#[async_trait]
pub trait BeforeHandler: Send + Sync {
    /// Receives the running input; returns the next input or a final output.
    async fn before(&self, input: Value) -> AppResult<BeforeOutcome>;
}

/// Handler running after the core operation.
#[async_trait]
pub trait AfterHandler: Send + Sync {
    /// Receives the final input and the running output; returns the next output.
    async fn after(&self, data: AfterData) -> AppResult<Value>;
}

type BeforeFn = dyn Fn(Value) -> BoxFuture<'static, AppResult<BeforeOutcome>> + Send + Sync;
type AfterFn = dyn Fn(AfterData) -> BoxFuture<'static, AppResult<Value>> + Send + Sync;

/// A closure-based before-handler.
pub struct ClosureBeforeHandler {
    handler: Box<BeforeFn>,
}

impl ClosureBeforeHandler {
    /// Wraps an async closure.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<BeforeOutcome>> + Send + 'static,
    {
        Self {
            handler: Box::new(move |input| Box::pin(handler(input))),
        }
    }
}

#[async_trait]
impl BeforeHandler for ClosureBeforeHandler {
    async fn before(&self, input: Value) -> AppResult<BeforeOutcome> {
        (self.handler)(input).await
    }
}

/// A closure-based after-handler.
pub struct ClosureAfterHandler {
    handler: Box<AfterFn>,
}

impl ClosureAfterHandler {
    /// Wraps an async closure.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(AfterData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Value>> + Send + 'static,
    {
        Self {
            handler: Box::new(move |data| Box::pin(handler(data))),
        }
    }
}

#[async_trait]
impl AfterHandler for ClosureAfterHandler {
    async fn after(&self, data: AfterData) -> AppResult<Value> {
        (self.handler)(data).await
    }
}

/// One registration in a chain.
struct HookEntry<H: ?Sized> {
    /// Assignment order within the chain.
    sequence: u64,
    /// Unique id of the extension that registered the handler.
    owner: String,
    handler: Arc<H>,
}

/// Ordered handlers of one `(hook, phase)` pair.
struct HookChain<H: ?Sized> {
    next_sequence: u64,
    entries: Vec<HookEntry<H>>,
}

impl<H: ?Sized> Default for HookChain<H> {
    fn default() -> Self {
        Self {
            next_sequence: 0,
            entries: Vec::new(),
        }
    }
}

impl<H: ?Sized> HookChain<H> {
    fn push(&mut self, owner: &str, handler: Arc<H>) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push(HookEntry {
            sequence,
            owner: owner.to_string(),
            handler,
        });
        sequence
    }

    fn handlers(&self) -> Vec<Arc<H>> {
        self.entries.iter().map(|e| e.handler.clone()).collect()
    }

    fn retain_not_owned_by(&mut self, owner: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.owner != owner);
        before - self.entries.len()
    }
}

/// Chains of one hook point. Kept after their last handler is removed so
/// the sequence counters survive until `clear`.
#[derive(Default)]
struct HookChains {
    before: HookChain<dyn BeforeHandler>,
    after: HookChain<dyn AfterHandler>,
}

/// Handlers of one hook point captured at trigger time.
pub struct HookSnapshot {
    /// Before-handlers in execution order.
    pub before: Vec<Arc<dyn BeforeHandler>>,
    /// After-handlers in execution order.
    pub after: Vec<Arc<dyn AfterHandler>>,
}

impl HookSnapshot {
    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// A registration as reported for introspection.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HookRegistration {
    /// Hook point.
    pub hook: HookPoint,
    /// Before or after.
    pub phase: HookPhase,
    /// Assignment order within `(hook, phase)`.
    pub sequence: u64,
    /// Owning extension.
    pub owner: String,
}

/// Registry of hook handlers organized by hook point.
#[derive(Default)]
pub struct HookRegistry {
    /// Hook point → before/after chains.
    chains: RwLock<HashMap<HookPoint, HookChains>>,
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry").finish_non_exhaustive()
    }
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a before-handler; returns its sequence number.
    pub async fn register_before(
        &self,
        hook: HookPoint,
        owner: &str,
        handler: Arc<dyn BeforeHandler>,
    ) -> u64 {
        let mut chains = self.chains.write().await;
        let sequence = chains.entry(hook.clone()).or_default().before.push(owner, handler);

        info!(hook = %hook, owner = %owner, sequence, "Before-hook registered");
        sequence
    }

    /// Registers an after-handler; returns its sequence number.
    pub async fn register_after(
        &self,
        hook: HookPoint,
        owner: &str,
        handler: Arc<dyn AfterHandler>,
    ) -> u64 {
        let mut chains = self.chains.write().await;
        let sequence = chains.entry(hook.clone()).or_default().after.push(owner, handler);

        info!(hook = %hook, owner = %owner, sequence, "After-hook registered");
        sequence
    }

    /// Captures the current handlers of a hook point.
    pub async fn snapshot(&self, hook: &HookPoint) -> HookSnapshot {
        let chains = self.chains.read().await;
        match chains.get(hook) {
            Some(c) => HookSnapshot {
                before: c.before.handlers(),
                after: c.after.handlers(),
            },
            None => HookSnapshot {
                before: Vec::new(),
                after: Vec::new(),
            },
        }
    }

    /// Removes every handler registered by `owner`.
    pub async fn unregister_owner(&self, owner: &str) -> usize {
        let mut chains = self.chains.write().await;
        let mut removed = 0;

        for c in chains.values_mut() {
            removed += c.before.retain_not_owned_by(owner);
            removed += c.after.retain_not_owned_by(owner);
        }

        debug!(owner = %owner, removed, "Hooks unregistered for extension");
        removed
    }

    /// Discards all registrations.
    pub async fn clear(&self) {
        self.chains.write().await.clear();
        info!("Hook registry reset");
    }

    /// Number of handlers registered for `(hook, phase)`.
    pub async fn handler_count(&self, hook: &HookPoint, phase: HookPhase) -> usize {
        let chains = self.chains.read().await;
        chains
            .get(hook)
            .map(|c| match phase {
                HookPhase::Before => c.before.entries.len(),
                HookPhase::After => c.after.entries.len(),
            })
            .unwrap_or(0)
    }

    /// All registrations, ordered by hook, phase, and sequence.
    pub async fn registrations(&self) -> Vec<HookRegistration> {
        let chains = self.chains.read().await;
        let mut out = Vec::new();

        for (hook, c) in chains.iter() {
            out.extend(c.before.entries.iter().map(|e| HookRegistration {
                hook: hook.clone(),
                phase: HookPhase::Before,
                sequence: e.sequence,
                owner: e.owner.clone(),
            }));
            out.extend(c.after.entries.iter().map(|e| HookRegistration {
                hook: hook.clone(),
                phase: HookPhase::After,
                sequence: e.sequence,
                owner: e.owner.clone(),
            }));
        }

        out.sort_by(|a, b| {
            (a.hook.as_str(), a.phase as u8, a.sequence).cmp(&(
                b.hook.as_str(),
                b.phase as u8,
                b.sequence,
            ))
        });
        out
    }
}
