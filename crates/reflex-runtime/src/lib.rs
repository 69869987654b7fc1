//! `reflex-runtime` – The Decision Loop Engine.
//!
//! Drives the agent's reactive cycle: read the working memory, select at
//! most one behavior, dispatch its action, clear perception.
//!
//! # Modules
//!
//! - [`reactive_loop`] – [`ReactiveLoop`][reactive_loop::ReactiveLoop]:
//!   the cycle orchestrator. Each [`tick`][reactive_loop::ReactiveLoop::tick]
//!   drains pending inbound payloads through the
//!   [`IngestionPipeline`][reflex_channel::IngestionPipeline], evaluates the
//!   live rule table, and dispatches the winning action.
//! - [`evaluator`] – [`Evaluator`][evaluator::Evaluator]: first-match-wins
//!   scan over the [`RuleTable`][reflex_kb::RuleTable], with an optional
//!   [`Strict`][evaluator::ConflictPolicy::Strict] policy that reports
//!   overlapping matches instead of silently picking one.
//! - [`dispatcher`] – [`dispatch`][dispatcher::dispatch]: prepends the agent
//!   identity to the action string, emits the envelope on the channel, and
//!   unconditionally clears perception facts afterwards – even when the send
//!   failed.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: initialises
//!   the global `tracing` subscriber (`RUST_LOG` filter,
//!   `REFLEX_LOG_FORMAT=json` for newline-delimited JSON logs).

pub mod dispatcher;
pub mod evaluator;
pub mod reactive_loop;
pub mod telemetry;

pub use dispatcher::dispatch;
pub use evaluator::{ConflictPolicy, Evaluation, Evaluator};
pub use reactive_loop::{ReactiveLoop, ReactiveLoopConfig};
pub use telemetry::init_tracing;
