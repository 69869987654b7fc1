//! [`ReactiveLoop`] – the cycle orchestrator.
//!
//! Each [`tick`][ReactiveLoop::tick]:
//!
//! 1. **Ingest** – drain every inbound payload already waiting on the bus
//!    (non-blocking) and load its clauses into the knowledge base. A
//!    message's clauses are therefore fully loaded before the evaluation
//!    that reads them; a malformed message is logged and dropped, never
//!    fatal to the agent.
//! 2. **Evaluate** – scan the live rule table against the working memory,
//!    first match wins (or conflict reporting under
//!    [`ConflictPolicy::Strict`]).
//! 3. **Dispatch** – on a decision, emit the addressed action on the
//!    outbound lane and clear perception facts. On no match the cycle ends
//!    quietly: no send, no clearing.
//!
//! The loop owns the store, the rule table, and the bus handle outright;
//! every read-decide-clear sequence runs to completion inside one `tick`
//! call, so no mutual exclusion beyond ownership is needed.

use std::time::Duration;

use reflex_channel::{IngestionPipeline, Lane, MessageBus};
use reflex_kb::{KnowledgeStore, RuleTable};
use reflex_types::{Decision, Envelope};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::dispatcher;
use crate::evaluator::{ConflictPolicy, Evaluation, Evaluator};

/// Configuration bundle for [`ReactiveLoop`].
pub struct ReactiveLoopConfig {
    /// The agent's outbound-message address prefix. When `None`, identity is
    /// expected to arrive in-band as an `agentname/1` clause.
    pub agent_name: Option<String>,
    /// How overlapping rule matches are resolved.
    pub conflict_policy: ConflictPolicy,
    /// Capacity of each bus lane.
    pub bus_capacity: usize,
}

impl Default for ReactiveLoopConfig {
    fn default() -> Self {
        Self {
            agent_name: None,
            conflict_policy: ConflictPolicy::FirstMatch,
            bus_capacity: 256,
        }
    }
}

/// The reactive-cycle orchestrator.
///
/// Owns all state needed to run ingest–evaluate–dispatch cycles. Call
/// [`tick`][Self::tick] from an async task to advance the agent by one
/// cycle, or [`run`][Self::run] to drive ticks on a fixed interval.
pub struct ReactiveLoop {
    store: KnowledgeStore,
    rules: RuleTable,
    evaluator: Evaluator,
    pipeline: IngestionPipeline,
    bus: MessageBus,
    /// Non-blocking inbound subscriber drained at the start of every tick.
    inbound_rx: broadcast::Receiver<Envelope>,
}

impl ReactiveLoop {
    /// Construct a loop with the standard rule table and cleaner chain.
    pub fn new(config: ReactiveLoopConfig) -> Self {
        let bus = MessageBus::new(config.bus_capacity);
        let inbound_rx = bus.subscribe(Lane::Inbound);

        let mut store = KnowledgeStore::new();
        if let Some(name) = &config.agent_name {
            store.set_agent_name(name);
        }

        Self {
            store,
            rules: RuleTable::standard(),
            evaluator: Evaluator::new(config.conflict_policy),
            pipeline: IngestionPipeline::standard(),
            bus,
            inbound_rx,
        }
    }

    /// A clone of the bus, for publishing inbound payloads and subscribing
    /// to outbound actions.
    pub fn bus(&self) -> MessageBus {
        self.bus.clone()
    }

    /// Read access to the working memory.
    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    /// Read access to the live rule table.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Execute one reactive cycle. Returns the dispatched decision, if any.
    pub async fn tick(&mut self) -> Option<Decision> {
        self.drain_inbound();

        match self.evaluator.evaluate(&self.rules, &self.store) {
            Evaluation::Decision(decision) => {
                if let Err(e) = dispatcher::dispatch(&mut self.store, &decision, &self.bus).await {
                    error!(error = %e, behavior = %decision.behavior, "dispatch failed");
                    return None;
                }
                Some(decision)
            }
            Evaluation::Conflict(names) => {
                warn!(behaviors = ?names, "conflicting rule matches; nothing dispatched");
                None
            }
            Evaluation::NoMatch => {
                debug!("no rule matched; cycle ends without dispatch");
                None
            }
        }
    }

    /// Drive [`tick`][Self::tick] on a fixed interval. Runs until the task
    /// is cancelled; every per-cycle failure is logged and the loop moves on
    /// to the next cycle.
    pub async fn run(&mut self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// Non-blocking drain of inbound payloads waiting on the bus.
    ///
    /// Each payload is ingested independently: a malformed message is fatal
    /// to that message only and the drain continues.
    fn drain_inbound(&mut self) {
        loop {
            match self.inbound_rx.try_recv() {
                Ok(envelope) => {
                    match self
                        .pipeline
                        .ingest(&mut self.store, &mut self.rules, &envelope.body)
                    {
                        Ok(report) => debug!(id = %envelope.id, ?report, "inbound message loaded"),
                        Err(e) => {
                            error!(id = %envelope.id, error = %e, "inbound message rejected")
                        }
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => break,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!(lagged_by = n, "inbound receiver lagged; messages dropped");
                    continue;
                }
                Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
    }
}
